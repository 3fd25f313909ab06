// CLI module
// Command-line interface, argument parsing and the interactive filter prompt

mod args;
pub mod prompt;

pub use args::{CliArgs, LogLevel};
pub use prompt::prompt_filters;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, or `--help`), clap displays an error
/// message or help text and exits the process.
///
/// # Returns
///
/// Returns a `CliArgs` struct with the parsed command-line arguments.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
