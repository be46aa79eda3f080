use scalpel_cli::{cli, log_filter, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(matches.get_count("verbose"))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&matches).await {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
