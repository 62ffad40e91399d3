//! End-to-end conversion: image file in, STL file out.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::builder::ReliefBuilder;
use crate::error::ReliefResult;
use crate::io::{load_intensity_grid, save_stl};
use crate::relief::ReliefParams;
use crate::validate::{WindingReport, validate_relief_mesh};

/// One image-to-STL conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliefJob {
    pub image_path: PathBuf,
    pub stl_path: PathBuf,
    pub params: ReliefParams,
}

/// What a finished job produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReliefReport {
    pub width: usize,
    pub height: usize,
    pub vertex_count: usize,
    pub face_count: usize,
    pub output: PathBuf,
    pub bytes_written: u64,
    pub elapsed_ms: f64,
    pub winding: WindingReport,
}

impl ReliefJob {
    pub fn new(
        image_path: impl Into<PathBuf>,
        stl_path: impl Into<PathBuf>,
        params: ReliefParams,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            stl_path: stl_path.into(),
            params,
        }
    }

    /// Load, sample, triangulate, validate and export.
    ///
    /// Parameters are checked before the image is opened, so a bad
    /// configuration never touches the filesystem. The destination is only
    /// replaced once the whole file has been written.
    pub fn run(&self) -> ReliefResult<ReliefReport> {
        let start = Instant::now();
        self.params.validate()?;

        let grid = load_intensity_grid(&self.image_path)?;

        let result = ReliefBuilder::new(&grid).params(self.params).build()?;
        let winding = validate_relief_mesh(&result.mesh)?;

        let bytes_written = save_stl(&result.mesh, &self.stl_path, self.params.format)?;

        let report = ReliefReport {
            width: result.stats.width,
            height: result.stats.height,
            vertex_count: result.stats.vertex_count,
            face_count: result.stats.face_count,
            output: self.stl_path.clone(),
            bytes_written,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            winding,
        };

        info!(
            width = report.width,
            height = report.height,
            faces = report.face_count,
            bytes = report.bytes_written,
            "Relief written"
        );

        Ok(report)
    }
}

/// Convert `image_path` to a binary STL at `stl_path`.
///
/// Shorthand for a [`ReliefJob`] with the given heights and default layout.
pub fn image_to_stl(
    image_path: impl AsRef<Path>,
    stl_path: impl AsRef<Path>,
    max_height: f64,
    base_thickness: f64,
) -> ReliefResult<ReliefReport> {
    let params = ReliefParams::default()
        .with_max_height(max_height)
        .with_base_thickness(base_thickness);
    ReliefJob::new(image_path.as_ref(), stl_path.as_ref(), params).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReliefError;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, w: u32, h: u32, value: u8) -> PathBuf {
        let path = dir.path().join(name);
        image::GrayImage::from_pixel(w, h, image::Luma([value]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_job_report() {
        let dir = TempDir::new().unwrap();
        let image = write_png(&dir, "in.png", 3, 2, 0);
        let out = dir.path().join("out.stl");

        let report = ReliefJob::new(&image, &out, ReliefParams::default())
            .run()
            .unwrap();

        assert_eq!((report.width, report.height), (3, 2));
        assert_eq!(report.vertex_count, 12);
        assert_eq!(report.face_count, 8);
        assert_eq!(report.bytes_written, 84 + 50 * 8);
        assert!(report.winding.is_consistent());
        assert_eq!(std::fs::metadata(&out).unwrap().len(), report.bytes_written);
    }

    #[test]
    fn test_config_checked_before_io() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist.png");
        let out = dir.path().join("out.stl");

        let err = image_to_stl(&missing, &out, -1.0, 1.0).unwrap_err();
        assert!(matches!(err, ReliefError::Configuration { .. }));
        assert!(!out.exists());
    }
}
