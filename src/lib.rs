//! # Parcel Mesher
//!
//! A Rust library for turning voxel parcels into renderable surface meshes.
//!
//! ## Overview
//!
//! A parcel carries an integer bounding box and a voxel payload: base64 text
//! wrapping a zlib stream of little-endian `u16` voxel codes at half-voxel
//! resolution. This library decodes the payload into a [`VoxelGrid`] and emits
//! one quad per exposed face, split into a solid layer and a glass layer, with
//! per-face atlas UVs and palette colours. Meshes export to GLB, OBJ or raw JSON.
//!
//! ## Quick Start
//!
//! ```ignore
//! use parcel_mesher::{load_parcels, Mesher, export_glb, GlbOptions};
//!
//! let parcels = load_parcels("parcels.json")?;
//! let mesher = Mesher::new();
//!
//! for parcel in &parcels {
//!     let mesh = mesher.mesh_parcel(parcel)?;
//!     if mesh.is_empty() {
//!         continue;
//!     }
//!     let glb_bytes = export_glb(&mesh, &GlbOptions::default())?;
//! }
//! ```
//!
//! ## Working with grids directly
//!
//! ```ignore
//! use parcel_mesher::{decode, Layer, Mesher, SizePolicy, VoxelGrid};
//!
//! let voxels = decode(payload, 8 * 8 * 8, SizePolicy::Truncate)?;
//! let grid = VoxelGrid::from_voxels([8, 8, 8], voxels)?;
//! let solid = Mesher::new().mesh(&grid, Layer::Solid);
//! ```

pub mod atlas;
pub mod decoder;
pub mod error;
pub mod export;
pub mod grid;
pub mod mesh_output;
pub mod mesher;
pub mod palette;
pub mod parcel;
pub mod types;

// Re-export main types for convenience
pub use atlas::{AtlasLayout, AtlasRegion};
pub use decoder::{decode, encode_voxels, SizePolicy};
pub use error::{DecodeError, MesherError, Result};
pub use export::gltf::{export_glb, export_scene_glb, GlbOptions};
pub use export::obj::{export_obj, ObjExport};
pub use export::raw::{export_raw, RawMeshData};
pub use grid::VoxelGrid;
pub use mesh_output::{MeshLayer, ParcelMesh};
pub use mesher::{count_faces, Mesher, MesherConfig};
pub use palette::Palette;
pub use parcel::{parse_parcels, ParcelDescription};
pub use types::{Axis, BoundingBox, Direction, Layer, ParcelBounds, Placement, VoxelCode};

/// Load parcel descriptions from a JSON file.
///
/// Accepts either a single parcel object or a `{"parcels": [...]}` container.
pub fn load_parcels<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<ParcelDescription>> {
    let json = std::fs::read_to_string(path)?;
    parse_parcels(&json)
}

/// Load a palette from a JSON array of `#rrggbb` strings.
pub fn load_palette<P: AsRef<std::path::Path>>(path: P) -> Result<Palette> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(feature = "wasm")]
pub mod wasm;
