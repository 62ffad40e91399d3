// Allow unused_assignments lint for error struct fields that are used in thiserror Display macros
// but appear as "never read" to the compiler.
#![allow(unused_assignments)]

//! Error types for relief generation with rich diagnostics.
//!
//! Every error carries:
//! - A machine-readable code
//! - Context (which file, which parameter, which face)
//! - A recovery suggestion
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `RELIEF-XXXX`:
//! - `RELIEF-1xxx`: I/O errors (image loading and decoding, STL reading and writing)
//! - `RELIEF-2xxx`: Input errors (configuration, grid shape)
//! - `RELIEF-3xxx`: Mesh data errors (indices, coordinates)

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relief operations.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Machine-readable error codes for relief operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// RELIEF-1001: Failed to read the source image
    ImageLoad = 1001,
    /// RELIEF-1002: Source image could not be decoded to 8-bit grayscale
    ImageDecode = 1002,
    /// RELIEF-1003: Failed to write the STL file
    MeshWrite = 1003,
    /// RELIEF-1004: Failed to read an STL file back
    MeshRead = 1004,

    /// RELIEF-2001: Invalid extrusion parameters
    Configuration = 2001,
    /// RELIEF-2002: Grid buffer does not match its dimensions
    InvalidGrid = 2002,
    /// RELIEF-2003: Grid needs more vertices than a u32 index can address
    GridTooLarge = 2003,

    /// RELIEF-3001: Face references a vertex that does not exist
    InvalidVertexIndex = 3001,
    /// RELIEF-3002: Vertex has NaN or infinite coordinate
    InvalidCoordinate = 3002,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `RELIEF-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ImageLoad => "RELIEF-1001",
            ErrorCode::ImageDecode => "RELIEF-1002",
            ErrorCode::MeshWrite => "RELIEF-1003",
            ErrorCode::MeshRead => "RELIEF-1004",
            ErrorCode::Configuration => "RELIEF-2001",
            ErrorCode::InvalidGrid => "RELIEF-2002",
            ErrorCode::GridTooLarge => "RELIEF-2003",
            ErrorCode::InvalidVertexIndex => "RELIEF-3001",
            ErrorCode::InvalidCoordinate => "RELIEF-3002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for relief errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Check the file system around the given path.
    CheckPath { checks: Vec<String> },
    /// Convert the source image to another format first.
    ConvertImage { suggested: Vec<String> },
    /// Adjust the named parameters.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Downscale the source image.
    DownscaleImage { max_pixels: u64 },
    /// Likely a bug in the caller or the library.
    ReportBug,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::CheckPath { checks } => {
                write!(f, "Check: {}", checks.join(", "))
            }
            RecoverySuggestion::ConvertImage { suggested } => {
                write!(
                    f,
                    "Try converting the image to one of: {}",
                    suggested.join(", ")
                )
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::DownscaleImage { max_pixels } => {
                write!(
                    f,
                    "Downscale the image to at most {} pixels before converting",
                    max_pixels
                )
            }
            RecoverySuggestion::ReportBug => {
                write!(f, "This indicates a bug; please report it with the input image")
            }
        }
    }
}

/// Where an error happened.
#[derive(Debug, Clone)]
pub enum ReliefLocation {
    /// A file on disk.
    File { path: PathBuf },
    /// A named configuration parameter.
    Parameter { name: &'static str },
    /// A face of the generated mesh.
    Face { index: usize },
    /// A vertex of the generated mesh.
    Vertex { index: usize },
}

impl std::fmt::Display for ReliefLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReliefLocation::File { path } => write!(f, "{}", path.display()),
            ReliefLocation::Parameter { name } => write!(f, "parameter `{}`", name),
            ReliefLocation::Face { index } => write!(f, "face {}", index),
            ReliefLocation::Vertex { index } => write!(f, "vertex {}", index),
        }
    }
}

/// Errors that can occur while turning an image into a relief mesh.
#[derive(Debug, Error, Diagnostic)]
pub enum ReliefError {
    /// The source image could not be opened or read.
    #[error("failed to read image from {path}")]
    #[diagnostic(
        code(relief::image::load),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source image could not be decoded to 8-bit grayscale.
    #[error("failed to decode image {path}: {details}")]
    #[diagnostic(
        code(relief::image::decode),
        help("Supported image formats: PNG, JPEG, BMP, GIF, TIFF")
    )]
    ImageDecode { path: PathBuf, details: String },

    /// The STL file could not be written.
    #[error("failed to write mesh to {path}")]
    #[diagnostic(
        code(relief::mesh::write),
        help("Check that the directory exists and is writable")
    )]
    MeshWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An STL file could not be read back.
    #[error("failed to read mesh from {path}")]
    #[diagnostic(
        code(relief::mesh::read),
        help("Check that the file exists and is a binary or ASCII STL")
    )]
    MeshRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An extrusion parameter is out of range.
    #[error("invalid {parameter} = {value}: {reason}")]
    #[diagnostic(
        code(relief::config::invalid),
        help("max_height must be a finite value > 0 and base_thickness a finite value >= 0")
    )]
    Configuration {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A grid buffer does not match its declared shape.
    #[error("invalid grid: {details}")]
    #[diagnostic(code(relief::grid::invalid))]
    InvalidGrid { details: String },

    /// The grid is too large to index with u32 vertex indices.
    #[error("grid of {width}x{height} cells needs more than u32::MAX vertices")]
    #[diagnostic(
        code(relief::grid::too_large),
        help("Downscale the source image before converting")
    )]
    GridTooLarge { width: usize, height: usize },

    /// A face references a vertex index outside the vertex list.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(code(relief::mesh::vertex_index))]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(relief::mesh::coordinate),
        help("Check that max_height and base_thickness are finite")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },
}

impl ReliefError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReliefError::ImageLoad { .. } => ErrorCode::ImageLoad,
            ReliefError::ImageDecode { .. } => ErrorCode::ImageDecode,
            ReliefError::MeshWrite { .. } => ErrorCode::MeshWrite,
            ReliefError::MeshRead { .. } => ErrorCode::MeshRead,
            ReliefError::Configuration { .. } => ErrorCode::Configuration,
            ReliefError::InvalidGrid { .. } => ErrorCode::InvalidGrid,
            ReliefError::GridTooLarge { .. } => ErrorCode::GridTooLarge,
            ReliefError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            ReliefError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            ReliefError::ImageLoad { .. } => RecoverySuggestion::CheckPath {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            ReliefError::ImageDecode { .. } => RecoverySuggestion::ConvertImage {
                suggested: vec!["PNG".into(), "JPEG".into(), "BMP".into()],
            },
            ReliefError::MeshWrite { .. } => RecoverySuggestion::CheckPath {
                checks: vec![
                    "directory exists".into(),
                    "write permissions".into(),
                    "free disk space".into(),
                ],
            },
            ReliefError::MeshRead { .. } => RecoverySuggestion::CheckPath {
                checks: vec!["file exists".into(), "file is an STL".into()],
            },
            ReliefError::Configuration { parameter, .. } => {
                let hint = if *parameter == "max_height" {
                    "must be > 0"
                } else {
                    "must be >= 0"
                };
                RecoverySuggestion::AdjustParameters {
                    parameters: vec![((*parameter).into(), hint.into())],
                }
            }
            ReliefError::InvalidGrid { .. } => RecoverySuggestion::ReportBug,
            ReliefError::GridTooLarge { .. } => RecoverySuggestion::DownscaleImage {
                max_pixels: u64::from(u32::MAX) / 2,
            },
            ReliefError::InvalidVertexIndex { .. } => RecoverySuggestion::ReportBug,
            ReliefError::InvalidCoordinate { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![
                    ("max_height".into(), "must be finite".into()),
                    ("base_thickness".into(), "must be finite".into()),
                ],
            },
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<ReliefLocation> {
        match self {
            ReliefError::ImageLoad { path, .. }
            | ReliefError::ImageDecode { path, .. }
            | ReliefError::MeshWrite { path, .. }
            | ReliefError::MeshRead { path, .. } => {
                Some(ReliefLocation::File { path: path.clone() })
            }
            ReliefError::Configuration { parameter, .. } => {
                Some(ReliefLocation::Parameter { name: *parameter })
            }
            ReliefError::InvalidVertexIndex { face_index, .. } => Some(ReliefLocation::Face {
                index: *face_index,
            }),
            ReliefError::InvalidCoordinate { vertex_index, .. } => {
                Some(ReliefLocation::Vertex {
                    index: *vertex_index,
                })
            }
            ReliefError::InvalidGrid { .. } | ReliefError::GridTooLarge { .. } => None,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an ImageLoad error.
    pub fn image_load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReliefError::ImageLoad {
            path: path.into(),
            source,
        }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        ReliefError::ImageDecode {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create a MeshWrite error.
    pub fn mesh_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReliefError::MeshWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a MeshRead error.
    pub fn mesh_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReliefError::MeshRead {
            path: path.into(),
            source,
        }
    }

    /// Create a Configuration error.
    pub fn configuration(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        ReliefError::Configuration {
            parameter,
            value,
            reason,
        }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(details: impl Into<String>) -> Self {
        ReliefError::InvalidGrid {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ReliefError::configuration("max_height", 0.0, "must be greater than zero");
        assert_eq!(err.code(), ErrorCode::Configuration);
        assert_eq!(err.code().as_str(), "RELIEF-2001");

        let err = ReliefError::image_decode("a.png", "bad header");
        assert_eq!(err.code().to_string(), "RELIEF-1002");
    }

    #[test]
    fn test_configuration_message() {
        let err = ReliefError::configuration("base_thickness", -1.0, "must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid base_thickness = -1: must not be negative"
        );
        match err.recovery_suggestion() {
            RecoverySuggestion::AdjustParameters { parameters } => {
                assert_eq!(parameters[0].0, "base_thickness");
                assert_eq!(parameters[0].1, "must be >= 0");
            }
            other => panic!("unexpected suggestion: {:?}", other),
        }
    }

    #[test]
    fn test_location() {
        let err = ReliefError::mesh_write(
            "/nope/out.stl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let location = err.location().expect("write errors carry a path");
        assert_eq!(location.to_string(), "/nope/out.stl");

        let err = ReliefError::InvalidVertexIndex {
            face_index: 7,
            vertex_index: 99,
            vertex_count: 8,
        };
        assert_eq!(err.location().unwrap().to_string(), "face 7");
        assert!(ReliefError::invalid_grid("x").location().is_none());
    }

    #[test]
    fn test_suggestion_display() {
        let s = RecoverySuggestion::CheckPath {
            checks: vec!["file exists".into(), "file permissions".into()],
        };
        assert_eq!(s.to_string(), "Check: file exists, file permissions");
    }
}
