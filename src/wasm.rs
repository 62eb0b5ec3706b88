//! WASM bindings for parcel-mesher.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::decoder::SizePolicy;
use crate::export::gltf::{export_scene_glb, GlbOptions};
use crate::{parse_parcels, Mesher, MesherConfig, Palette};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Mesher configuration options.
#[wasm_bindgen]
#[derive(Default)]
pub struct MesherOptions {
    strict_size: bool,
    world_placement: bool,
    palette: Option<Palette>,
}

#[wasm_bindgen]
impl MesherOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MesherOptions {
        MesherOptions::default()
    }

    /// Reject payloads whose size does not match the parcel.
    #[wasm_bindgen(setter)]
    pub fn set_strict_size(&mut self, value: bool) {
        self.strict_size = value;
    }

    /// Write each parcel's world placement into the GLB.
    #[wasm_bindgen(setter)]
    pub fn set_world_placement(&mut self, value: bool) {
        self.world_placement = value;
    }

    /// Replace the palette with a JSON array of `#rrggbb` strings.
    pub fn set_palette_json(&mut self, json: &str) -> Result<(), JsError> {
        let palette: Palette = serde_json::from_str(json)
            .map_err(|e| JsError::new(&format!("Invalid palette: {}", e)))?;
        self.palette = Some(palette);
        Ok(())
    }
}

/// Mesh result containing GLB data.
#[wasm_bindgen]
pub struct MeshResult {
    glb_data: Vec<u8>,
    parcel_count: usize,
    vertex_count: usize,
    triangle_count: usize,
    has_transparency: bool,
}

#[wasm_bindgen]
impl MeshResult {
    /// Get the GLB binary data.
    #[wasm_bindgen(getter)]
    pub fn glb_data(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.glb_data.as_slice())
    }

    /// Number of parcels with geometry.
    #[wasm_bindgen(getter)]
    pub fn parcel_count(&self) -> usize {
        self.parcel_count
    }

    /// Get the total vertex count.
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Get the total triangle count.
    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Check if any parcel has glass geometry.
    #[wasm_bindgen(getter)]
    pub fn has_transparency(&self) -> bool {
        self.has_transparency
    }
}

/// Mesh parcels from a JSON string and return GLB data.
///
/// Accepts a single parcel object or a `{"parcels": [...]}` container.
/// Parcels with no geometry are left out of the scene.
#[wasm_bindgen]
pub fn mesh_parcels_json(json: &str, options: Option<MesherOptions>) -> Result<MeshResult, JsError> {
    let parcels =
        parse_parcels(json).map_err(|e| JsError::new(&format!("Invalid JSON: {}", e)))?;

    let options = options.unwrap_or_default();
    let mut config = MesherConfig::default();
    if options.strict_size {
        config = config.with_size_policy(SizePolicy::Strict);
    }
    if let Some(palette) = options.palette {
        config = config.with_palette(palette);
    }

    let mesher = Mesher::with_config(config);
    let meshes = mesher
        .mesh_parcels(&parcels)
        .into_iter()
        .collect::<crate::Result<Vec<_>>>()
        .map_err(|e| JsError::new(&e.to_string()))?;
    let meshes: Vec<_> = meshes.into_iter().filter(|m| !m.is_empty()).collect();

    let glb_options = GlbOptions {
        world_placement: options.world_placement,
        ..Default::default()
    };
    let glb_data =
        export_scene_glb(&meshes, &glb_options).map_err(|e| JsError::new(&e.to_string()))?;

    Ok(MeshResult {
        glb_data,
        parcel_count: meshes.len(),
        vertex_count: meshes.iter().map(|m| m.total_vertices()).sum(),
        triangle_count: meshes.iter().map(|m| m.total_triangles()).sum(),
        has_transparency: meshes.iter().any(|m| m.has_glass()),
    })
}
