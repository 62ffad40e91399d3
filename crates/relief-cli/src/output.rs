//! Output helpers shared by all commands.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a result value. JSON mode pretty-prints it; text mode leaves
/// rendering to the command.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}: failed to serialize result: {}", "Error".red().bold(), e),
        }
    }
}

/// Print a success line in text mode.
pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        println!("{} {}", "✓".green().bold(), message);
    }
}

/// Print a progress line in text mode.
pub fn info(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        println!("{} {}", "→".blue(), message);
    }
}
