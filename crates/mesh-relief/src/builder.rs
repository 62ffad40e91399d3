//! Fluent builder API for relief generation.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use mesh_relief::{ReliefBuilder, VertexLayout, load_intensity_grid};
//!
//! let grid = load_intensity_grid(Path::new("portrait.png")).unwrap();
//!
//! let result = ReliefBuilder::new(&grid)
//!     .max_height(4.0)            // 4mm between white and black
//!     .base_thickness(1.5)        // 1.5mm under z = 0
//!     .layout(VertexLayout::Blocks)
//!     .build()
//!     .unwrap();
//!
//! println!("{} faces", result.mesh.face_count());
//! ```

use crate::error::ReliefResult;
use crate::relief::{ReliefMesh, ReliefParams, ReliefStats, VertexLayout, build_relief_mesh};
use crate::sampler::{HeightGrid, IntensityGrid, sample_heights};
use crate::tracing_ext::{OperationTimer, log_relief_stats};

/// Result from [`ReliefBuilder`]: the mesh, the heights it was built from,
/// and a summary.
#[derive(Debug)]
pub struct ReliefBuildResult {
    pub mesh: ReliefMesh,
    pub heights: HeightGrid,
    pub stats: ReliefStats,
}

/// Fluent builder for a relief mesh over an in-memory intensity grid.
///
/// Parameters are validated in [`build`](Self::build) before any sampling
/// takes place.
pub struct ReliefBuilder<'a> {
    grid: &'a IntensityGrid,
    params: ReliefParams,
}

impl<'a> ReliefBuilder<'a> {
    /// Create a builder with default parameters.
    pub fn new(grid: &'a IntensityGrid) -> Self {
        Self {
            grid,
            params: ReliefParams::default(),
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Height of pure black above z = 0.
    pub fn max_height(mut self, max_height: f64) -> Self {
        self.params.max_height = max_height;
        self
    }

    /// Depth of the base plane below z = 0.
    pub fn base_thickness(mut self, base_thickness: f64) -> Self {
        self.params.base_thickness = base_thickness;
        self
    }

    /// Vertex arrangement of the output mesh.
    pub fn layout(mut self, layout: VertexLayout) -> Self {
        self.params.layout = layout;
        self
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Replace every parameter at once.
    pub fn params(mut self, params: ReliefParams) -> Self {
        self.params = params;
        self
    }

    /// Apply [`ReliefParams::for_lithophane`], keeping the layout.
    pub fn lithophane(mut self) -> Self {
        let layout = self.params.layout;
        self.params = ReliefParams {
            layout,
            ..ReliefParams::for_lithophane()
        };
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Validate parameters, sample heights and triangulate.
    ///
    /// # Errors
    ///
    /// - [`ReliefError::Configuration`](crate::ReliefError::Configuration)
    ///   for out-of-range parameters
    /// - [`ReliefError::GridTooLarge`](crate::ReliefError::GridTooLarge)
    ///   when the vertex count cannot be indexed with `u32`
    pub fn build(self) -> ReliefResult<ReliefBuildResult> {
        self.params.validate()?;

        let timer =
            OperationTimer::with_grid("build_relief", self.grid.width(), self.grid.height());
        let _entered = timer.span().enter();

        let heights = sample_heights(self.grid, self.params.max_height);
        let mesh = build_relief_mesh(&heights, self.params.base_thickness, self.params.layout)?;
        let stats = ReliefStats::from_mesh(&mesh, &heights);

        log_relief_stats(&mesh, "after build");

        Ok(ReliefBuildResult {
            mesh,
            heights,
            stats,
        })
    }
}
