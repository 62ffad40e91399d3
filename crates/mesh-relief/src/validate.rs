//! Relief mesh validation.
//!
//! Checks that every face index is in range, every coordinate is finite,
//! and every face is wound toward the outside of its surface.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ReliefError, ReliefResult};
use crate::relief::ReliefMesh;
use crate::types::Surface;

/// Orientation check results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindingReport {
    /// Faces on the top surface.
    pub top_faces: usize,
    /// Faces on the base surface.
    pub base_faces: usize,
    /// Top faces whose normal points down (z < 0).
    pub inverted_top: usize,
    /// Base faces whose normal points up (z > 0).
    pub inverted_base: usize,
}

impl WindingReport {
    /// True if every face faces away from the solid.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.inverted_top == 0 && self.inverted_base == 0
    }
}

impl std::fmt::Display for WindingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "top: {} faces ({} inverted), base: {} faces ({} inverted)",
            self.top_faces, self.inverted_top, self.base_faces, self.inverted_base
        )
    }
}

/// Count faces on each surface and how many point the wrong way.
///
/// Assumes indices are in range; see [`validate_relief_mesh`].
pub fn check_winding(mesh: &ReliefMesh) -> WindingReport {
    let mut report = WindingReport::default();
    for face in &mesh.faces {
        let nz = mesh.triangle(face).normal_unnormalized().z;
        match face.surface {
            Surface::Top => {
                report.top_faces += 1;
                if nz < 0.0 {
                    report.inverted_top += 1;
                }
            }
            Surface::Base => {
                report.base_faces += 1;
                if nz > 0.0 {
                    report.inverted_base += 1;
                }
            }
        }
    }
    report
}

/// Validate index ranges and coordinates, then check winding.
///
/// Fails on the first out-of-range index or non-finite coordinate. Winding
/// problems are reported, not treated as errors.
pub fn validate_relief_mesh(mesh: &ReliefMesh) -> ReliefResult<WindingReport> {
    let vertex_count = mesh.vertex_count();

    for (vertex_index, v) in mesh.vertices.iter().enumerate() {
        for (coordinate, value) in [("x", v.x), ("y", v.y), ("z", v.z)] {
            if !value.is_finite() {
                return Err(ReliefError::InvalidCoordinate {
                    vertex_index,
                    coordinate,
                    value,
                });
            }
        }
    }

    for (face_index, face) in mesh.faces.iter().enumerate() {
        if let Some(&bad) = face
            .indices
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(ReliefError::InvalidVertexIndex {
                face_index,
                vertex_index: bad,
                vertex_count,
            });
        }
    }

    let report = check_winding(mesh);
    if report.is_consistent() {
        debug!("Winding check passed: {}", report);
    } else {
        warn!("Inconsistent winding: {}", report);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relief::{VertexLayout, build_relief_mesh};
    use crate::sampler::{IntensityGrid, sample_heights};
    use crate::types::Face;

    fn mesh(layout: VertexLayout) -> ReliefMesh {
        let grid = IntensityGrid::from_fn(4, 4, |x, y| (x * 60 + y * 5) as u8).unwrap();
        build_relief_mesh(&sample_heights(&grid, 5.0), 1.0, layout).unwrap()
    }

    #[test]
    fn test_valid_mesh_passes() {
        for layout in [VertexLayout::Interleaved, VertexLayout::Blocks] {
            let report = validate_relief_mesh(&mesh(layout)).unwrap();
            assert!(report.is_consistent());
            assert_eq!(report.top_faces, 18);
            assert_eq!(report.base_faces, 18);
        }
    }

    #[test]
    fn test_out_of_range_index() {
        let mut m = mesh(VertexLayout::Interleaved);
        let past_end = m.vertex_count() as u32;
        m.faces.push(Face::base(1, past_end, past_end + 1));

        let err = validate_relief_mesh(&m).unwrap_err();
        match err {
            ReliefError::InvalidVertexIndex {
                face_index,
                vertex_index,
                vertex_count,
            } => {
                assert_eq!(face_index, 36);
                assert_eq!(vertex_index, 32);
                assert_eq!(vertex_count, 32);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_coordinate() {
        let mut m = mesh(VertexLayout::Blocks);
        m.vertices[3].z = f64::NAN;
        let err = validate_relief_mesh(&m).unwrap_err();
        assert!(matches!(
            err,
            ReliefError::InvalidCoordinate {
                vertex_index: 3,
                coordinate: "z",
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_face_is_reported() {
        let mut m = mesh(VertexLayout::Interleaved);
        m.faces[0].indices.swap(1, 2);
        let report = validate_relief_mesh(&m).unwrap();
        assert!(!report.is_consistent());
        assert_eq!(report.inverted_top, 1);
        assert_eq!(report.inverted_base, 0);
    }
}
