//! relief info command - display STL statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_relief::summarize_stl;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct StlInfo {
    path: String,
    triangles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let summary =
        summarize_stl(input).with_context(|| format!("Failed to read STL from {:?}", input))?;

    let bounds = summary.min.zip(summary.max).map(|(min, max)| BoundsInfo {
        min,
        max,
        dimensions: [max[0] - min[0], max[1] - min[1], max[2] - min[2]],
    });

    let info = StlInfo {
        path: input.display().to_string(),
        triangles: summary.triangle_count,
        bounds,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "STL Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Triangles".cyan(), info.triangles);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
                        "Bounds".cyan(),
                        b.min[0],
                        b.min[1],
                        b.min[2],
                        b.max[0],
                        b.max[1],
                        b.max[2]
                    );
                    println!(
                        "  {}: {:.3} x {:.3} x {:.3}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                } else {
                    println!("  {}: empty", "Bounds".cyan());
                }
            }
        }
    }

    Ok(())
}
