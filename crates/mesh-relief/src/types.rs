//! Core mesh data types.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Which of the two relief surfaces a face belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// The relief surface, lifted by the heightmap. Outward normal is +Z.
    Top,
    /// The flat underside at `z = -base_thickness`. Outward normal is -Z.
    Base,
}

/// A triangle as three indices into a vertex list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Vertex indices, wound counter-clockwise seen from outside the surface.
    pub indices: [u32; 3],

    /// Surface the face was emitted for.
    pub surface: Surface,
}

impl Face {
    #[inline]
    pub fn new(indices: [u32; 3], surface: Surface) -> Self {
        Self { indices, surface }
    }

    #[inline]
    pub fn top(a: u32, b: u32, c: u32) -> Self {
        Self::new([a, b, c], Surface::Top)
    }

    #[inline]
    pub fn base(a: u32, b: u32, c: u32) -> Self {
        Self::new([a, b, c], Surface::Base)
    }
}

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front (normal points
/// toward the viewer). This is the by-value form handed to the STL writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Unit normal, or the zero vector for degenerate triangles.
    ///
    /// STL readers accept a zero normal and recompute it from the winding.
    #[inline]
    pub fn normal_or_zero(&self) -> Vector3<f64> {
        self.normal().unwrap_or_else(Vector3::zeros)
    }

    /// The three corners in winding order.
    #[inline]
    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }
}

/// Axis-aligned bounding box accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    /// Bounds of a point set, or None if it is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Edge lengths of the box.
    #[inline]
    pub fn dimensions(&self) -> Vector3<f64> {
        self.max - self.min
    }
}
