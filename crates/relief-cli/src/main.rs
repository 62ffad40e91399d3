//! relief: turn grayscale images into printable STL reliefs.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_relief=info` - Basic operation logging
//! - `RUST_LOG=mesh_relief=debug` - Stage details
//! - `RUST_LOG=mesh_relief::timing=info` - Performance timing
//!
//! # Example
//!
//! ```bash
//! # 5mm relief over a 1mm base
//! relief convert portrait.png -o portrait.stl
//!
//! # Taller relief, ASCII output, JSON report
//! relief --format json convert logo.png -o logo.stl --max-height 8 --ascii
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{convert, info};

/// relief - Extrude grayscale images into 3D-printable STL reliefs.
///
/// Dark pixels become tall, light pixels stay low, and a flat base is added
/// underneath.
#[derive(Parser)]
#[command(name = "relief")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image into an STL relief
    Convert {
        /// Input image (PNG, JPEG, BMP, GIF, TIFF)
        input: PathBuf,

        /// Output STL file path
        #[arg(short, long)]
        output: PathBuf,

        /// Height of pure black above the base plane (mm)
        #[arg(long)]
        max_height: Option<f64>,

        /// Thickness of the base below the relief (mm)
        #[arg(long)]
        base_thickness: Option<f64>,

        /// Start from lithophane settings (3mm relief, 0.8mm base)
        #[arg(long)]
        lithophane: bool,

        /// Vertex arrangement in the generated mesh
        #[arg(long, default_value = "interleaved")]
        layout: LayoutArg,

        /// Write ASCII STL instead of binary
        #[arg(long)]
        ascii: bool,
    },

    /// Display statistics of an STL file
    Info {
        /// Input STL file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// Top and base vertex of each pixel side by side
    Interleaved,
    /// All top vertices, then all base vertices
    Blocks,
}

impl From<LayoutArg> for mesh_relief::VertexLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Interleaved => mesh_relief::VertexLayout::Interleaved,
            LayoutArg::Blocks => mesh_relief::VertexLayout::Blocks,
        }
    }
}

/// Log directives for a `-v` count: library stages at info, then debug,
/// then everything.
fn verbosity_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "mesh_relief=info",
        2 => "mesh_relief=debug",
        _ => "trace",
    }
}

/// Send library logs to stderr so stdout stays clean for `--format json`.
///
/// `RUST_LOG`, when set, replaces the `-v` mapping entirely.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(verbosity_directives(verbose)),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

/// Print a failed command to stderr.
///
/// The first line carries the whole context chain. Relief errors add their
/// code, what to try next, and the file or parameter at fault.
fn report_error(err: &anyhow::Error) {
    eprintln!("{}: {:#}", "Error".red().bold(), err);

    let Some(relief_err) = err.downcast_ref::<mesh_relief::ReliefError>() else {
        return;
    };
    eprintln!("  {}: {}", "Code".cyan(), relief_err.code());
    eprintln!(
        "  {}: {}",
        "Try".green(),
        relief_err.recovery_suggestion()
    );
    if let Some(location) = relief_err.location() {
        eprintln!("  {}: {}", "At".yellow(), location);
    }
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Convert {
            input,
            output,
            max_height,
            base_thickness,
            lithophane,
            layout,
            ascii,
        } => convert::run(
            input,
            output,
            convert::ConvertOptions {
                max_height: *max_height,
                base_thickness: *base_thickness,
                lithophane: *lithophane,
                layout: (*layout).into(),
                ascii: *ascii,
            },
            &cli,
        ),
        Commands::Info { input } => info::run(input, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            report_error(e);
        }
        std::process::exit(1);
    }

    Ok(())
}
