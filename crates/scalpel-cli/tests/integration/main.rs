//! End-to-end tests over the edit pipeline and the CLI commands.

mod cli_commands;
mod pipeline_scenarios;
