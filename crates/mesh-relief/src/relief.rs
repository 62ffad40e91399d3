//! Heightmap triangulation: top relief surface plus flat base.
//!
//! Every grid cell contributes two vertices, one on the relief surface and
//! one on the base plane. Every interior quad of 2×2 neighbouring cells
//! contributes four triangles, two per surface:
//!
//! ```text
//!   TL ---- TR        top:  (TL, TR, BR), (TL, BR, BL)   CCW from +Z
//!   |    /  |
//!   |  /    |        base:  (TL, BL, BR), (TL, BR, TR)   CCW from -Z
//!   BL ---- BR
//! ```
//!
//! The two surfaces are not connected; the perimeter is left open. Where the
//! top and base vertices of a cell live in the vertex list is decided by the
//! [`VertexLayout`], and both vertex placement and face addressing go through
//! the same layout functions so they can never disagree.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReliefError, ReliefResult};
use crate::io::StlFormat;
use crate::sampler::HeightGrid;
use crate::types::{Bounds, Face, Surface, Triangle};

/// How top and base vertices are arranged in the vertex list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexLayout {
    /// Top and base vertex of each cell are adjacent: cell `c` owns vertices
    /// `2c` (top) and `2c + 1` (base).
    #[default]
    Interleaved,
    /// All top vertices first, then all base vertices: cell `c` owns vertices
    /// `c` (top) and `cell_count + c` (base).
    Blocks,
}

impl VertexLayout {
    /// Vertex index of the top vertex of `cell`.
    #[inline]
    pub fn top_index(self, cell: usize, cell_count: usize) -> usize {
        match self {
            VertexLayout::Interleaved => 2 * cell,
            VertexLayout::Blocks => {
                debug_assert!(cell < cell_count);
                cell
            }
        }
    }

    /// Vertex index of the base vertex of `cell`.
    #[inline]
    pub fn base_index(self, cell: usize, cell_count: usize) -> usize {
        match self {
            VertexLayout::Interleaved => 2 * cell + 1,
            VertexLayout::Blocks => cell_count + cell,
        }
    }
}

/// Extrusion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefParams {
    /// Height of the darkest pixels above z = 0. Must be > 0.
    pub max_height: f64,

    /// Depth of the base plane below z = 0. Must be >= 0.
    pub base_thickness: f64,

    /// Vertex arrangement used by the mesh builder.
    pub layout: VertexLayout,

    /// Encoding of the output file.
    pub format: StlFormat,
}

impl Default for ReliefParams {
    fn default() -> Self {
        Self {
            max_height: 5.0,
            base_thickness: 1.0,
            layout: VertexLayout::default(),
            format: StlFormat::default(),
        }
    }
}

impl ReliefParams {
    /// Thin backlit panel: 3mm of relief over a 0.8mm base.
    pub fn for_lithophane() -> Self {
        Self {
            max_height: 3.0,
            base_thickness: 0.8,
            ..Self::default()
        }
    }

    /// Set the maximum relief height.
    pub fn with_max_height(mut self, max_height: f64) -> Self {
        self.max_height = max_height;
        self
    }

    /// Set the base thickness.
    pub fn with_base_thickness(mut self, base_thickness: f64) -> Self {
        self.base_thickness = base_thickness;
        self
    }

    /// Check parameter ranges.
    ///
    /// Run before any image is read or any geometry is built.
    pub fn validate(&self) -> ReliefResult<()> {
        if !self.max_height.is_finite() {
            return Err(ReliefError::configuration(
                "max_height",
                self.max_height,
                "must be finite",
            ));
        }
        if self.max_height <= 0.0 {
            return Err(ReliefError::configuration(
                "max_height",
                self.max_height,
                "must be greater than zero",
            ));
        }
        if !self.base_thickness.is_finite() {
            return Err(ReliefError::configuration(
                "base_thickness",
                self.base_thickness,
                "must be finite",
            ));
        }
        if self.base_thickness < 0.0 {
            return Err(ReliefError::configuration(
                "base_thickness",
                self.base_thickness,
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Triangulated relief: vertices, indexed faces, and the grid they came from.
#[derive(Debug, Clone)]
pub struct ReliefMesh {
    width: usize,
    height: usize,
    layout: VertexLayout,

    /// Vertex positions, arranged according to `layout`.
    pub vertices: Vec<Point3<f64>>,

    /// Faces in emission order: per quad, two top faces then two base faces.
    pub faces: Vec<Face>,
}

impl ReliefMesh {
    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when the grid has no interior quads (a single row or column).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Top vertex of the cell at column `x`, row `y`.
    pub fn top_vertex(&self, x: usize, y: usize) -> Point3<f64> {
        let cells = self.width * self.height;
        self.vertices[self.layout.top_index(y * self.width + x, cells)]
    }

    /// Base vertex of the cell at column `x`, row `y`.
    pub fn base_vertex(&self, x: usize, y: usize) -> Point3<f64> {
        let cells = self.width * self.height;
        self.vertices[self.layout.base_index(y * self.width + x, cells)]
    }

    /// Resolve a face to its vertex positions.
    #[inline]
    pub fn triangle(&self, face: &Face) -> Triangle {
        let [a, b, c] = face.indices;
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// All faces resolved to triangles, in emission order.
    ///
    /// Lazy, so a writer can stream without a second copy of the geometry.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        self.faces.iter().map(|face| self.triangle(face))
    }

    /// Faces belonging to one surface.
    pub fn faces_on(&self, surface: Surface) -> impl Iterator<Item = &Face> + '_ {
        self.faces.iter().filter(move |f| f.surface == surface)
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }
}

/// Summary of a built relief.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReliefStats {
    pub width: usize,
    pub height: usize,
    pub vertex_count: usize,
    pub face_count: usize,
    pub top_faces: usize,
    pub base_faces: usize,
    pub min_height: f64,
    pub max_height: f64,
}

impl ReliefStats {
    pub fn from_mesh(mesh: &ReliefMesh, heights: &HeightGrid) -> Self {
        let (min_height, max_height) = heights.range();
        let top_faces = mesh.faces_on(Surface::Top).count();
        Self {
            width: mesh.width(),
            height: mesh.height(),
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            top_faces,
            base_faces: mesh.face_count() - top_faces,
            min_height,
            max_height,
        }
    }
}

/// Number of faces a `width × height` grid produces.
#[inline]
pub fn expected_face_count(width: usize, height: usize) -> usize {
    4 * width.saturating_sub(1) * height.saturating_sub(1)
}

/// Triangulate a height grid into a top surface and a base plane.
///
/// Produces `2 * W * H` vertices and `4 * (W-1) * (H-1)` faces. A grid with a
/// single row or column yields no faces; that is a valid, empty relief.
pub fn build_relief_mesh(
    heights: &HeightGrid,
    base_thickness: f64,
    layout: VertexLayout,
) -> ReliefResult<ReliefMesh> {
    let width = heights.width();
    let height = heights.height();
    let cells = heights.cell_count();

    let vertex_count = cells
        .checked_mul(2)
        .filter(|&n| u32::try_from(n - 1).is_ok())
        .ok_or(ReliefError::GridTooLarge { width, height })?;

    // `0.0 - t` keeps a zero thickness at +0.0 instead of -0.0
    let base_z = 0.0 - base_thickness;

    let mut vertices = vec![Point3::origin(); vertex_count];
    for y in 0..height {
        for x in 0..width {
            let cell = y * width + x;
            let (px, py) = (x as f64, y as f64);
            vertices[layout.top_index(cell, cells)] = Point3::new(px, py, heights.get(x, y));
            vertices[layout.base_index(cell, cells)] = Point3::new(px, py, base_z);
        }
    }

    let top = |cell: usize| layout.top_index(cell, cells) as u32;
    let base = |cell: usize| layout.base_index(cell, cells) as u32;

    let mut faces = Vec::with_capacity(expected_face_count(width, height));
    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            let tl = y * width + x;
            let tr = tl + 1;
            let bl = tl + width;
            let br = bl + 1;

            faces.push(Face::top(top(tl), top(tr), top(br)));
            faces.push(Face::top(top(tl), top(br), top(bl)));

            faces.push(Face::base(base(tl), base(bl), base(br)));
            faces.push(Face::base(base(tl), base(br), base(tr)));
        }
    }

    if faces.is_empty() {
        info!(width, height, "Grid has no interior quads; relief mesh is empty");
    }
    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        ?layout,
        "Built relief mesh"
    );

    Ok(ReliefMesh {
        width,
        height,
        layout,
        vertices,
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{IntensityGrid, sample_heights};

    fn heights(width: usize, height: usize, f: impl FnMut(usize, usize) -> u8) -> HeightGrid {
        let grid = IntensityGrid::from_fn(width, height, f).unwrap();
        sample_heights(&grid, 5.0)
    }

    #[test]
    fn test_layout_indices() {
        assert_eq!(VertexLayout::Interleaved.top_index(3, 10), 6);
        assert_eq!(VertexLayout::Interleaved.base_index(3, 10), 7);
        assert_eq!(VertexLayout::Blocks.top_index(3, 10), 3);
        assert_eq!(VertexLayout::Blocks.base_index(3, 10), 13);
    }

    #[test]
    fn test_counts() {
        for (w, h) in [(2, 2), (3, 2), (5, 4), (1, 5), (5, 1), (1, 1)] {
            let mesh = build_relief_mesh(&heights(w, h, |_, _| 0), 1.0, VertexLayout::Interleaved)
                .unwrap();
            assert_eq!(mesh.vertex_count(), 2 * w * h);
            assert_eq!(mesh.face_count(), expected_face_count(w, h));
        }
        assert_eq!(expected_face_count(5, 4), 48);
        assert_eq!(expected_face_count(1, 5), 0);
    }

    #[test]
    fn test_interleaved_emission_order() {
        let mesh =
            build_relief_mesh(&heights(2, 1, |x, _| x as u8 * 255), 2.0, VertexLayout::Interleaved)
                .unwrap();
        assert_eq!(
            mesh.vertices,
            vec![
                Point3::new(0.0, 0.0, 5.0),
                Point3::new(0.0, 0.0, -2.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, -2.0),
            ]
        );
    }

    #[test]
    fn test_blocks_emission_order() {
        let mesh =
            build_relief_mesh(&heights(2, 1, |x, _| x as u8 * 255), 2.0, VertexLayout::Blocks)
                .unwrap();
        assert_eq!(
            mesh.vertices,
            vec![
                Point3::new(0.0, 0.0, 5.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, -2.0),
                Point3::new(1.0, 0.0, -2.0),
            ]
        );
    }

    #[test]
    fn test_single_quad_faces_interleaved() {
        let mesh = build_relief_mesh(&heights(2, 2, |_, _| 0), 1.0, VertexLayout::Interleaved)
            .unwrap();
        // cells: TL=0 TR=1 BL=2 BR=3 -> top 0,2,4,6 / base 1,3,5,7
        let indices: Vec<[u32; 3]> = mesh.faces.iter().map(|f| f.indices).collect();
        assert_eq!(
            indices,
            vec![[0, 2, 6], [0, 6, 4], [1, 5, 7], [1, 7, 3]]
        );
        let surfaces: Vec<Surface> = mesh.faces.iter().map(|f| f.surface).collect();
        assert_eq!(
            surfaces,
            vec![Surface::Top, Surface::Top, Surface::Base, Surface::Base]
        );
    }

    #[test]
    fn test_single_quad_faces_blocks() {
        let mesh =
            build_relief_mesh(&heights(2, 2, |_, _| 0), 1.0, VertexLayout::Blocks).unwrap();
        let indices: Vec<[u32; 3]> = mesh.faces.iter().map(|f| f.indices).collect();
        assert_eq!(
            indices,
            vec![[0, 1, 3], [0, 3, 2], [4, 6, 7], [4, 7, 5]]
        );
    }

    #[test]
    fn test_winding_per_surface() {
        for layout in [VertexLayout::Interleaved, VertexLayout::Blocks] {
            let mesh = build_relief_mesh(
                &heights(4, 3, |x, y| ((x * 70 + y * 30) % 256) as u8),
                1.5,
                layout,
            )
            .unwrap();
            for face in &mesh.faces {
                let n = mesh.triangle(face).normal_unnormalized();
                match face.surface {
                    Surface::Top => assert!(n.z >= 0.0, "{:?}: top normal {:?}", layout, n),
                    Surface::Base => assert!(n.z <= 0.0, "{:?}: base normal {:?}", layout, n),
                }
            }
        }
    }

    #[test]
    fn test_layouts_produce_same_triangles() {
        let h = heights(3, 3, |x, y| (x * 50 + y * 20) as u8);
        let a = build_relief_mesh(&h, 1.0, VertexLayout::Interleaved).unwrap();
        let b = build_relief_mesh(&h, 1.0, VertexLayout::Blocks).unwrap();
        let ta: Vec<Triangle> = a.triangles().collect();
        let tb: Vec<Triangle> = b.triangles().collect();
        assert_eq!(ta, tb);
    }

    #[test]
    fn test_vertex_accessors() {
        let mesh = build_relief_mesh(&heights(3, 2, |_, _| 0), 2.0, VertexLayout::Blocks).unwrap();
        assert_eq!(mesh.top_vertex(2, 1), Point3::new(2.0, 1.0, 5.0));
        assert_eq!(mesh.base_vertex(2, 1), Point3::new(2.0, 1.0, -2.0));
    }

    #[test]
    fn test_zero_base_thickness_is_positive_zero() {
        let mesh = build_relief_mesh(&heights(2, 2, |_, _| 0), 0.0, VertexLayout::Interleaved)
            .unwrap();
        assert!(mesh.base_vertex(0, 0).z.is_sign_positive());
    }

    #[test]
    fn test_params_validation() {
        assert!(ReliefParams::default().validate().is_ok());
        assert!(ReliefParams::for_lithophane().validate().is_ok());
        assert!(
            ReliefParams::default()
                .with_base_thickness(0.0)
                .validate()
                .is_ok()
        );

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ReliefParams::default()
                .with_max_height(bad)
                .validate()
                .unwrap_err();
            assert!(matches!(
                err,
                ReliefError::Configuration {
                    parameter: "max_height",
                    ..
                }
            ));
        }
        for bad in [-0.5, f64::NAN] {
            let err = ReliefParams::default()
                .with_base_thickness(bad)
                .validate()
                .unwrap_err();
            assert!(matches!(
                err,
                ReliefError::Configuration {
                    parameter: "base_thickness",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_stats() {
        let h = heights(3, 3, |x, _| if x == 0 { 0 } else { 255 });
        let mesh = build_relief_mesh(&h, 1.0, VertexLayout::Interleaved).unwrap();
        let stats = ReliefStats::from_mesh(&mesh, &h);
        assert_eq!(stats.face_count, 16);
        assert_eq!(stats.top_faces, 8);
        assert_eq!(stats.base_faces, 8);
        assert_eq!(stats.min_height, 0.0);
        assert_eq!(stats.max_height, 5.0);
    }
}
