//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format.
//! Each non-empty layer becomes its own object with its own material; vertex
//! colours ride along as the extended `v x y z r g b` form.

use super::{ATLAS_TEXTURE_FILE, GLASS_OPACITY};
use crate::error::{MesherError, Result};
use crate::mesh_output::ParcelMesh;
use crate::types::Layer;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Material name for a layer.
fn material_name(layer: Layer) -> &'static str {
    match layer {
        Layer::Solid => "atlas",
        Layer::Transparent => "glass",
    }
}

/// Export a mesh to OBJ format.
/// Returns (obj_content, mtl_content) as strings.
pub fn export_obj(mesh: &ParcelMesh, name: &str) -> Result<(String, String)> {
    let mut obj = String::with_capacity(256 + mesh.total_vertices() * 180);
    let mut mtl = String::with_capacity(512);

    write_obj(&mut obj, mesh, name)
        .and_then(|_| write_mtl(&mut mtl))
        .map_err(|e| MesherError::Export(format!("Failed to format OBJ: {e}")))?;

    Ok((obj, mtl))
}

fn write_obj(obj: &mut String, mesh: &ParcelMesh, name: &str) -> std::fmt::Result {
    writeln!(obj, "# Parcel Mesher OBJ Export")?;
    writeln!(obj, "# Vertices: {}", mesh.total_vertices())?;
    writeln!(obj, "# Triangles: {}", mesh.total_triangles())?;
    writeln!(obj)?;
    writeln!(obj, "mtllib {}.mtl", name)?;

    // OBJ indices are global and 1-based
    let mut vertex_offset: usize = 1;

    for (layer, layer_mesh) in mesh.layers() {
        writeln!(obj)?;
        writeln!(obj, "o {}-{}", name, layer.object_name())?;

        for (p, c) in layer_mesh.positions.iter().zip(&layer_mesh.colors) {
            writeln!(obj, "v {} {} {} {} {} {}", p[0], p[1], p[2], c[0], c[1], c[2])?;
        }
        for uv in &layer_mesh.uvs {
            writeln!(obj, "vt {} {}", uv[0], uv[1])?;
        }
        for n in &layer_mesh.normals {
            writeln!(obj, "vn {} {} {}", n[0], n[1], n[2])?;
        }

        writeln!(obj, "usemtl {}", material_name(layer))?;
        for tri in layer_mesh.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0], tri[1], tri[2]].map(|i| i as usize + vertex_offset);
            writeln!(
                obj,
                "f {}/{}/{} {}/{}/{} {}/{}/{}",
                i0, i0, i0, i1, i1, i1, i2, i2, i2
            )?;
        }

        vertex_offset += layer_mesh.vertex_count();
    }

    Ok(())
}

fn write_mtl(mtl: &mut String) -> std::fmt::Result {
    writeln!(mtl, "# Parcel Mesher Materials")?;
    writeln!(mtl)?;

    writeln!(mtl, "newmtl {}", material_name(Layer::Solid))?;
    writeln!(mtl, "Ka 1.0 1.0 1.0")?;
    writeln!(mtl, "Kd 1.0 1.0 1.0")?;
    writeln!(mtl, "Ks 0.0 0.0 0.0")?;
    writeln!(mtl, "Ns 10.0")?;
    writeln!(mtl, "d 1.0")?;
    writeln!(mtl, "illum 1")?;
    writeln!(mtl, "map_Kd {}", ATLAS_TEXTURE_FILE)?;
    writeln!(mtl)?;

    writeln!(mtl, "newmtl {}", material_name(Layer::Transparent))?;
    writeln!(mtl, "Ka 1.0 1.0 1.0")?;
    writeln!(mtl, "Kd 1.0 1.0 1.0")?;
    writeln!(mtl, "Ks 0.5 0.5 0.5")?;
    writeln!(mtl, "Ns 50.0")?;
    writeln!(mtl, "d {}", GLASS_OPACITY)?;
    writeln!(mtl, "illum 2")?;

    Ok(())
}

/// OBJ and MTL text ready to be written side by side.
pub struct ObjExport {
    pub name: String,
    pub obj: String,
    pub mtl: String,
}

impl ObjExport {
    pub fn from_mesh(mesh: &ParcelMesh, name: &str) -> Result<Self> {
        let (obj, mtl) = export_obj(mesh, name)?;
        Ok(Self {
            name: name.to_string(),
            obj,
            mtl,
        })
    }

    /// Write `<name>.obj` and `<name>.mtl` into `dir`. Returns the OBJ path.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let obj_path = dir.join(format!("{}.obj", self.name));
        std::fs::write(&obj_path, &self.obj)?;
        std::fs::write(dir.join(format!("{}.mtl", self.name)), &self.mtl)?;
        Ok(obj_path)
    }
}
