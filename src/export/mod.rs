//! Mesh export formats.
//!
//! This module provides exporters for various 3D formats. Every exporter keeps
//! the solid and glass layers apart and leaves out empty layers.

pub mod gltf;
pub mod obj;
pub mod raw;

pub use gltf::{export_glb, export_scene_glb, GlbOptions};
pub use obj::{export_obj, ObjExport};
pub use raw::{export_raw, RawLayerData, RawMeshData};

/// Opacity of the glass material.
pub const GLASS_OPACITY: f32 = 0.5;

/// Texture file the solid material samples.
pub const ATLAS_TEXTURE_FILE: &str = "atlas.png";
