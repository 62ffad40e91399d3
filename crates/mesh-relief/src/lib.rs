//! Heightmap relief extrusion: grayscale images to printable STL.
//!
//! Every pixel of the input image becomes a point on a relief surface whose
//! height grows as the pixel gets darker, plus a matching point on a flat
//! base plane underneath. Neighbouring pixels are stitched into triangles on
//! both surfaces and the result is written as STL.
//!
//! # Features
//!
//! - **Image input**: PNG, JPEG, BMP, GIF and TIFF, converted to 8-bit gray
//! - **Sampling**: `height = (255 - intensity) / 255 * max_height`, exact at both ends
//! - **Triangulation**: two triangles per quad on each surface, outward winding
//! - **Export**: binary or ASCII STL, written atomically
//! - **Validation**: index range, finite coordinates and winding checks
//!
//! # Units and Coordinate System
//!
//! **One pixel is one unit**, and heights use the same unit (millimeters for
//! most slicers). Column `x` maps to X, row `y` maps to Y, heights to Z. The
//! relief surface lies in `[0, max_height]` and the base plane at
//! `z = -base_thickness`.
//!
//! Faces are **counter-clockwise when viewed from outside**: top normals point
//! up, base normals point down.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_relief::image_to_stl;
//!
//! // 5mm of relief over a 1mm base
//! let report = image_to_stl("portrait.png", "portrait.stl", 5.0, 1.0).unwrap();
//! println!("{} faces, {} bytes", report.face_count, report.bytes_written);
//! ```
//!
//! # Common Workflows
//!
//! ## Explicit job configuration
//!
//! ```no_run
//! use mesh_relief::{ReliefJob, ReliefParams, StlFormat, VertexLayout};
//!
//! let params = ReliefParams {
//!     layout: VertexLayout::Blocks,
//!     format: StlFormat::Ascii,
//!     ..ReliefParams::for_lithophane()
//! };
//!
//! let report = ReliefJob::new("window.jpg", "window.stl", params).run().unwrap();
//! assert!(report.winding.is_consistent());
//! ```
//!
//! ## In-memory grids (with ReliefBuilder)
//!
//! ```no_run
//! use mesh_relief::{IntensityGrid, ReliefBuilder, StlFormat, save_stl};
//!
//! // A left-to-right ramp from black to white
//! let grid = IntensityGrid::from_fn(256, 64, |x, _| x as u8).unwrap();
//!
//! let result = ReliefBuilder::new(&grid)
//!     .max_height(10.0)
//!     .base_thickness(2.0)
//!     .build()
//!     .unwrap();
//!
//! save_stl(&result.mesh, "ramp.stl".as_ref(), StlFormat::Binary).unwrap();
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`ReliefResult`]. Every [`ReliefError`]
//! carries a machine-readable [`ErrorCode`] and a [`RecoverySuggestion`].
//! Parameter errors are always raised before any file is read.

mod builder;
mod error;
mod pipeline;
pub mod tracing_ext;
mod types;

pub mod io;
pub mod relief;
pub mod sampler;
pub mod validate;

pub use error::{ErrorCode, RecoverySuggestion, ReliefError, ReliefLocation, ReliefResult};

pub use types::{Bounds, Face, Surface, Triangle};

pub use io::{
    StlFormat, StlSummary, load_intensity_grid, load_stl_triangles, save_stl, summarize_stl,
    write_stl,
};

pub use sampler::{HeightGrid, IntensityGrid, MAX_INTENSITY, height_for_intensity, sample_heights};

pub use relief::{
    ReliefMesh, ReliefParams, ReliefStats, VertexLayout, build_relief_mesh, expected_face_count,
};

pub use builder::{ReliefBuildResult, ReliefBuilder};
pub use pipeline::{ReliefJob, ReliefReport, image_to_stl};
pub use validate::{WindingReport, check_winding, validate_relief_mesh};
