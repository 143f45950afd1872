use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bead::BeadSink;
use crate::error::{ExportError, Result};
use crate::tessellation::{TessellateSolid, TriangleMesh};
use crate::topology::{MeshStore, SolidId};

/// STL encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    /// 80-byte header, triangle count, 50 bytes per facet.
    #[default]
    Binary,
    /// Human-readable `solid ... endsolid`.
    Ascii,
}

/// Writes a triangle mesh as STL.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_stl<W: Write>(
    out: &mut W,
    mesh: &TriangleMesh,
    name: &str,
    format: StlFormat,
) -> io::Result<()> {
    match format {
        StlFormat::Binary => write_binary(out, mesh, name),
        StlFormat::Ascii => write_ascii(out, mesh, name),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_binary<W: Write>(out: &mut W, mesh: &TriangleMesh, name: &str) -> io::Result<()> {
    let mut header = [0u8; 80];
    let label = name.as_bytes();
    let len = label.len().min(header.len());
    header[..len].copy_from_slice(&label[..len]);
    out.write_all(&header)?;
    out.write_all(&(mesh.indices.len() as u32).to_le_bytes())?;

    for &tri in &mesh.indices {
        let normal = mesh.facet_normal(tri);
        for c in normal.iter() {
            out.write_all(&(*c as f32).to_le_bytes())?;
        }
        for &i in &tri {
            let p = mesh.vertices[i as usize];
            for c in [p.x, p.y, p.z] {
                out.write_all(&(c as f32).to_le_bytes())?;
            }
        }
        out.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

fn write_ascii<W: Write>(out: &mut W, mesh: &TriangleMesh, name: &str) -> io::Result<()> {
    writeln!(out, "solid {name}")?;
    for &tri in &mesh.indices {
        let n = mesh.facet_normal(tri);
        writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(out, "    outer loop")?;
        for &i in &tri {
            let p = mesh.vertices[i as usize];
            writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid {name}")
}

/// Writes finished halves as STL files into one directory.
#[derive(Debug, Clone)]
pub struct StlSink {
    dir: PathBuf,
    format: StlFormat,
}

impl StlSink {
    /// Creates a sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: StlFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BeadSink for StlSink {
    fn export(&mut self, store: &MeshStore, solid: SolidId, file_name: &str) -> Result<()> {
        let mesh = TessellateSolid::new(solid).execute(store)?;
        let name = &store.solid(solid)?.name;
        let path = self.dir.join(file_name);
        let write_err = |source| ExportError::Write {
            path: path.display().to_string(),
            source,
        };

        let file = File::create(&path).map_err(write_err)?;
        let mut out = BufWriter::new(file);
        write_stl(&mut out, &mesh, name, self.format).map_err(write_err)?;
        out.flush().map_err(write_err)?;
        tracing::debug!(path = %path.display(), triangles = mesh.indices.len(), "wrote STL");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::creation::MakeBox;
    use crate::topology::SolidData;

    fn cube_triangles() -> TriangleMesh {
        let mut store = MeshStore::new();
        let mesh = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        let id = store.add_solid(SolidData::base("cube", mesh));
        TessellateSolid::new(id).execute(&store).unwrap()
    }

    #[test]
    fn binary_layout() {
        let mesh = cube_triangles();
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &mesh, "cube", StlFormat::Binary).unwrap();
        assert_eq!(bytes.len(), 84 + 50 * 12);
        assert_eq!(&bytes[..4], b"cube");
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 12);
    }

    #[test]
    fn ascii_layout() {
        let mesh = cube_triangles();
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &mesh, "cube", StlFormat::Ascii).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("solid cube\n"));
        assert!(text.ends_with("endsolid cube\n"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert_eq!(text.matches("vertex").count(), 36);
    }

    #[test]
    fn sink_writes_into_directory() {
        let dir = std::env::temp_dir().join(format!("lockbead_stl_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut store = MeshStore::new();
        let mesh = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        let id = store.add_solid(SolidData::base("cube", mesh));

        let mut sink = StlSink::new(&dir, StlFormat::Binary);
        sink.export(&store, id, "cube.stl").unwrap();
        let written = std::fs::metadata(dir.join("cube.stl")).unwrap().len();
        assert_eq!(written, 84 + 50 * 12);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_export_error() {
        let mut store = MeshStore::new();
        let mesh = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        let id = store.add_solid(SolidData::base("cube", mesh));
        let mut sink = StlSink::new("/nonexistent/lockbead", StlFormat::Ascii);
        let err = sink.export(&store, id, "cube.stl").unwrap_err();
        assert!(err.to_string().contains("cube.stl"));
    }
}
