//! Scalpel CLI
//!
//! Offline inspection of the edit pipeline stages over JSON and text files:
//! intent classification, search plan execution, response extraction and
//! dependency collection. Every subcommand prints pretty JSON.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scalpel_core::EditConfig;
use scalpel_model::FileManifest;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command-line definition
#[must_use]
pub fn cli() -> Command {
    let manifest = Arg::new("manifest")
        .long("manifest")
        .short('m')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("File manifest JSON");

    Command::new("scalpel")
        .version(scalpel_core::VERSION)
        .about("Minimal-scope edit resolution and streamed code extraction")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration overriding the built-in constants"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify an edit prompt against a manifest")
                .arg(manifest.clone())
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .short('p')
                        .required(true)
                        .help("Edit request text"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Execute a search plan and select an edit target")
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Search plan JSON as returned by the planning oracle"),
                )
                .arg(manifest.clone())
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .short('p')
                        .help("Original prompt, used to detect removals"),
                ),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract files and blocks from a saved generation response")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .value_parser(value_parser!(PathBuf))
                        .help("Response text; reads stdin when omitted"),
                )
                .arg(
                    Arg::new("chunk-size")
                        .long("chunk-size")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Replay the response in chunks of this many bytes (0 = one chunk)"),
                ),
        )
        .subcommand(
            Command::new("deps")
                .about("List packages imported by manifest files")
                .arg(manifest),
        )
}

/// Log filter for a `-v` count; `RUST_LOG` takes precedence when set
#[must_use]
pub fn log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Configuration from `--config`, or defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EditConfig> {
    match path {
        Some(path) => EditConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EditConfig::default()),
    }
}

pub fn load_manifest(path: &Path) -> anyhow::Result<FileManifest> {
    let json = read_file(path)?;
    FileManifest::from_json(&json)
        .with_context(|| format!("parsing manifest {}", path.display()))
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

/// Run the selected subcommand and render its report as pretty JSON
pub async fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    debug!(command = matches.subcommand_name().unwrap_or_default(), "Running command");

    let json = match matches.subcommand() {
        Some(("classify", args)) => {
            let manifest = load_manifest(path_arg(args, "manifest")?)?;
            let prompt = args
                .get_one::<String>("prompt")
                .context("missing --prompt")?;
            serde_json::to_string_pretty(&commands::classify(prompt, &manifest, &config)?)?
        }
        Some(("search", args)) => {
            let plan = read_file(path_arg(args, "plan")?)?;
            let manifest = load_manifest(path_arg(args, "manifest")?)?;
            let prompt = args.get_one::<String>("prompt").map(String::as_str);
            let report = commands::search(&plan, &manifest, prompt, &config)
                .context("executing search plan")?;
            serde_json::to_string_pretty(&report)?
        }
        Some(("extract", args)) => {
            let response = match args.get_one::<PathBuf>("input") {
                Some(path) => read_file(path)?,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("reading response from stdin")?;
                    text
                }
            };
            let chunk_size = args.get_one::<usize>("chunk-size").copied().unwrap_or(0);
            serde_json::to_string_pretty(&commands::extract(&response, chunk_size, &config).await)?
        }
        Some(("deps", args)) => {
            let manifest = load_manifest(path_arg(args, "manifest")?)?;
            serde_json::to_string_pretty(&commands::deps(&manifest, &config))?
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand {other}"),
        None => anyhow::bail!("no subcommand given"),
    };

    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(4), "trace");
    }

    #[test]
    fn global_options_follow_subcommand() {
        let matches = cli()
            .try_get_matches_from(["scalpel", "deps", "-m", "m.json", "-vv", "--config", "s.toml"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("s.toml"))
        );
    }

    #[test]
    fn classify_requires_prompt() {
        assert!(cli()
            .try_get_matches_from(["scalpel", "classify", "-m", "m.json"])
            .is_err());
    }
}
