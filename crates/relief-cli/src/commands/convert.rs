//! relief convert command - extrude an image into an STL relief.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_relief::{ReliefJob, ReliefParams, StlFormat, VertexLayout};
use serde::Serialize;
use tracing::debug;

use crate::{Cli, OutputFormat, output};

/// Flags of the convert subcommand.
pub struct ConvertOptions {
    pub max_height: Option<f64>,
    pub base_thickness: Option<f64>,
    pub lithophane: bool,
    pub layout: VertexLayout,
    pub ascii: bool,
}

impl ConvertOptions {
    fn params(&self) -> ReliefParams {
        let mut params = if self.lithophane {
            ReliefParams::for_lithophane()
        } else {
            ReliefParams::default()
        };
        if let Some(h) = self.max_height {
            params.max_height = h;
        }
        if let Some(t) = self.base_thickness {
            params.base_thickness = t;
        }
        params.layout = self.layout;
        params.format = if self.ascii {
            StlFormat::Ascii
        } else {
            StlFormat::Binary
        };
        params
    }
}

#[derive(Serialize)]
struct ConvertResult {
    input: String,
    output: String,
    params: ReliefParams,
    width: usize,
    height: usize,
    vertices: usize,
    faces: usize,
    bytes: u64,
    elapsed_ms: f64,
    winding_consistent: bool,
}

pub fn run(input: &Path, output_path: &Path, options: ConvertOptions, cli: &Cli) -> Result<()> {
    let params = options.params();
    debug!("Convert parameters: {:?}", params);

    output::info(
        &format!(
            "Extruding {} ({}mm relief, {}mm base)...",
            input.display(),
            params.max_height,
            params.base_thickness
        ),
        cli.format,
        cli.quiet,
    );

    let report = ReliefJob::new(input, output_path, params)
        .run()
        .with_context(|| format!("Failed to convert {:?} to {:?}", input, output_path))?;

    let result = ConvertResult {
        input: input.display().to_string(),
        output: report.output.display().to_string(),
        params,
        width: report.width,
        height: report.height,
        vertices: report.vertex_count,
        faces: report.face_count,
        bytes: report.bytes_written,
        elapsed_ms: report.elapsed_ms,
        winding_consistent: report.winding.is_consistent(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Wrote {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!(
                    "  {}: {} x {} pixels",
                    "Image".cyan(),
                    result.width,
                    result.height
                );
                println!(
                    "  {}: {} vertices, {} faces",
                    "Mesh".cyan(),
                    result.vertices,
                    result.faces
                );
                println!(
                    "  {}: {} bytes ({})",
                    "File".cyan(),
                    result.bytes,
                    if options.ascii { "ASCII" } else { "binary" }
                );
                if result.faces == 0 {
                    println!(
                        "  {}: image is a single row or column, STL has no triangles",
                        "Note".yellow()
                    );
                }
                if !result.winding_consistent {
                    println!("  {}: {}", "Winding".yellow(), report.winding);
                }
                println!("  {}: {:.1} ms", "Time".cyan(), result.elapsed_ms);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ConvertOptions {
        ConvertOptions {
            max_height: None,
            base_thickness: None,
            lithophane: false,
            layout: VertexLayout::Interleaved,
            ascii: false,
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(options().params(), ReliefParams::default());
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let params = ConvertOptions {
            lithophane: true,
            base_thickness: Some(2.0),
            layout: VertexLayout::Blocks,
            ascii: true,
            ..options()
        }
        .params();

        assert_eq!(params.max_height, 3.0);
        assert_eq!(params.base_thickness, 2.0);
        assert_eq!(params.layout, VertexLayout::Blocks);
        assert_eq!(params.format, StlFormat::Ascii);
    }
}
