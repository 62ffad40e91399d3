//! Image loading and STL reading/writing.
//!
//! Images are decoded with the `image` crate and reduced to 8-bit luma.
//! STL output is binary (via `stl_io`) or ASCII. Writes go to a temporary
//! file beside the destination and are renamed into place only once the
//! whole mesh has been written, so a failed export never leaves a truncated
//! file behind.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::{ImageError, ImageReader};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ReliefError, ReliefResult};
use crate::relief::ReliefMesh;
use crate::sampler::IntensityGrid;
use crate::tracing_ext::OperationTimer;
use crate::types::{Bounds, Triangle};

/// Solid name written into ASCII STL files.
const ASCII_SOLID_NAME: &str = "relief";

/// STL encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    /// 80-byte header, u32 count, 50 bytes per triangle.
    #[default]
    Binary,
    /// Human-readable `solid ... endsolid` text.
    Ascii,
}

/// Load an image file as an 8-bit grayscale grid.
///
/// The format is detected from the file contents, falling back to the
/// extension. Any color type is reduced to luma; alpha is dropped.
pub fn load_intensity_grid(path: &Path) -> ReliefResult<IntensityGrid> {
    let _timer = OperationTimer::new("load_image");
    info!("Loading image from {:?}", path);

    let reader = ImageReader::open(path)
        .map_err(|e| ReliefError::image_load(path, e))?
        .with_guessed_format()
        .map_err(|e| ReliefError::image_load(path, e))?;

    debug!("Detected image format: {:?}", reader.format());

    let image = reader.decode().map_err(|e| match e {
        ImageError::IoError(source) => ReliefError::image_load(path, source),
        other => ReliefError::image_decode(path, other.to_string()),
    })?;

    debug!("Decoded {:?} image", image.color());

    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();
    if width == 0 || height == 0 {
        return Err(ReliefError::image_decode(path, "image has no pixels"));
    }

    info!("Loaded {}x{} grayscale image", width, height);

    IntensityGrid::new(width as usize, height as usize, luma.into_raw())
}

/// Write a relief mesh to an STL file.
///
/// Returns the number of bytes written. An existing destination keeps its
/// permission bits; a new file gets `0o644` on Unix.
pub fn save_stl(mesh: &ReliefMesh, path: &Path, format: StlFormat) -> ReliefResult<u64> {
    let _timer = OperationTimer::new("save_stl");
    info!("Saving mesh to {:?} ({:?} STL)", path, format);

    let is_stl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("stl"));
    if !is_stl {
        warn!("Output path {:?} does not have an .stl extension", path);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ReliefError::mesh_write(path, e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_stl(&mut writer, mesh.triangles(), format)
            .map_err(|e| ReliefError::mesh_write(path, e))?;
        writer.flush().map_err(|e| ReliefError::mesh_write(path, e))?;
    }

    let bytes = tmp
        .as_file()
        .metadata()
        .map_err(|e| ReliefError::mesh_write(path, e))?
        .len();

    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(output_permissions(path))
        .map_err(|e| ReliefError::mesh_write(path, e))?;

    tmp.persist(path)
        .map_err(|e| ReliefError::mesh_write(path, e.error))?;

    info!(
        "Saved {} triangles ({} bytes) to {:?}",
        mesh.face_count(),
        bytes,
        path
    );

    Ok(bytes)
}

/// Permissions for the file about to replace `path`.
///
/// Temp files are created owner-only, so the mode is set explicitly before
/// the rename.
#[cfg(unix)]
fn output_permissions(path: &Path) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.permissions(),
        _ => std::fs::Permissions::from_mode(0o644),
    }
}

/// Serialize triangles as STL to any writer.
pub fn write_stl<W, I>(writer: &mut W, triangles: I, format: StlFormat) -> std::io::Result<()>
where
    W: Write,
    I: ExactSizeIterator<Item = Triangle>,
{
    match format {
        StlFormat::Binary => stl_io::write_stl(writer, triangles.map(|t| to_stl_triangle(&t))),
        StlFormat::Ascii => write_ascii_stl(writer, triangles),
    }
}

fn to_stl_triangle(tri: &Triangle) -> stl_io::Triangle {
    let n = tri.normal_or_zero();
    let [v0, v1, v2] = tri.vertices();
    stl_io::Triangle {
        normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
        vertices: [
            stl_io::Vertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
            stl_io::Vertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
            stl_io::Vertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
        ],
    }
}

fn write_ascii_stl<W: Write>(
    writer: &mut W,
    triangles: impl Iterator<Item = Triangle>,
) -> std::io::Result<()> {
    writeln!(writer, "solid {}", ASCII_SOLID_NAME)?;
    for tri in triangles {
        let n = tri.normal_or_zero();
        writeln!(
            writer,
            "  facet normal {} {} {}",
            n.x as f32, n.y as f32, n.z as f32
        )?;
        writeln!(writer, "    outer loop")?;
        for v in tri.vertices() {
            writeln!(
                writer,
                "      vertex {} {} {}",
                v.x as f32, v.y as f32, v.z as f32
            )?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {}", ASCII_SOLID_NAME)?;
    Ok(())
}

/// Read every triangle of a binary or ASCII STL file.
pub fn load_stl_triangles(path: &Path) -> ReliefResult<Vec<Triangle>> {
    let file = File::open(path).map_err(|e| ReliefError::mesh_read(path, e))?;
    let mut reader = BufReader::new(file);

    let triangles = stl_io::create_stl_reader(&mut reader)
        .map_err(|e| ReliefError::mesh_read(path, e))?
        .map(|t| t.map(|t| from_stl_triangle(&t)))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| ReliefError::mesh_read(path, e))?;

    debug!("Read {} triangles from {:?}", triangles.len(), path);

    Ok(triangles)
}

fn from_stl_triangle(tri: &stl_io::Triangle) -> Triangle {
    let p = |v: &stl_io::Vertex| {
        nalgebra::Point3::new(f64::from(v.0[0]), f64::from(v.0[1]), f64::from(v.0[2]))
    };
    Triangle::new(
        p(&tri.vertices[0]),
        p(&tri.vertices[1]),
        p(&tri.vertices[2]),
    )
}

/// Triangle count and extent of an STL file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StlSummary {
    pub triangle_count: usize,
    pub min: Option<[f64; 3]>,
    pub max: Option<[f64; 3]>,
}

/// Read an STL file and summarize it.
pub fn summarize_stl(path: &Path) -> ReliefResult<StlSummary> {
    let triangles = load_stl_triangles(path)?;
    let points: Vec<_> = triangles.iter().flat_map(|t| t.vertices()).collect();
    let bounds = Bounds::from_points(&points);

    Ok(StlSummary {
        triangle_count: triangles.len(),
        min: bounds.map(|b| [b.min.x, b.min.y, b.min.z]),
        max: bounds.map(|b| [b.max.x, b.max.y, b.max.z]),
    })
}
