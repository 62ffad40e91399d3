//! Intensity and height grids, and the sampler that maps one to the other.
//!
//! Both grids are dense, row-major, and addressed as `(x, y)` with `x` the
//! image column and `y` the image row. The sampler inverts brightness so that
//! dark pixels become tall: `height = (255 - intensity) / 255 * max_height`.

use tracing::debug;

use crate::error::{ReliefError, ReliefResult};

/// Largest representable grayscale intensity.
pub const MAX_INTENSITY: u8 = u8::MAX;

/// A grid of 8-bit grayscale intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl IntensityGrid {
    /// Wrap a row-major buffer of `width * height` intensities.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> ReliefResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReliefError::invalid_grid(format!(
                "grid dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            ReliefError::invalid_grid(format!("{}x{} overflows usize", width, height))
        })?;
        if data.len() != expected {
            return Err(ReliefError::invalid_grid(format!(
                "{}x{} grid needs {} cells, buffer has {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A grid where every cell has the same intensity.
    pub fn filled(width: usize, height: usize, value: u8) -> ReliefResult<Self> {
        let len = width.checked_mul(height).unwrap_or(0);
        Self::new(width, height, vec![value; len])
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> u8,
    ) -> ReliefResult<Self> {
        let mut data = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Intensity at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Row-major cell data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// A grid of surface heights, one per intensity cell.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl HeightGrid {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Height at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Row-major cell data.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Smallest and largest height.
    pub fn range(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }
}

/// Height for a single intensity.
///
/// `height_for_intensity(0, m) == m` and `height_for_intensity(255, m) == 0.0`
/// hold exactly. Non-increasing in `intensity` for any `max_height >= 0`.
#[inline]
pub fn height_for_intensity(intensity: u8, max_height: f64) -> f64 {
    f64::from(MAX_INTENSITY - intensity) / f64::from(MAX_INTENSITY) * max_height
}

/// Map every intensity to a height.
///
/// Pure and deterministic. `max_height == 0` flattens the whole relief onto
/// the z = 0 plane; range checks on parameters belong to [`crate::ReliefParams`].
pub fn sample_heights(grid: &IntensityGrid, max_height: f64) -> HeightGrid {
    let data: Vec<f64> = grid
        .as_slice()
        .iter()
        .map(|&i| height_for_intensity(i, max_height))
        .collect();

    debug!(
        width = grid.width(),
        height = grid.height(),
        max_height,
        "Sampled height grid"
    );

    HeightGrid {
        width: grid.width,
        height: grid.height,
        data,
    }
}
