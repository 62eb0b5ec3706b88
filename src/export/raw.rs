//! Raw mesh data export for custom rendering.

use crate::error::Result;
use crate::mesh_output::{MeshLayer, ParcelMesh};
use crate::types::Placement;
use serde::Serialize;

/// Flat attribute arrays for one layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawLayerData {
    /// Vertex positions (3 floats per vertex).
    pub positions: Vec<f32>,
    /// Vertex normals (3 floats per vertex).
    pub normals: Vec<f32>,
    /// Texture coordinates (2 floats per vertex).
    pub uvs: Vec<f32>,
    /// Vertex colors (4 floats per vertex, RGBA).
    pub colors: Vec<f32>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl RawLayerData {
    fn from_layer(layer: &MeshLayer) -> Self {
        Self {
            positions: layer.positions.iter().flatten().copied().collect(),
            normals: layer.normals.iter().flatten().copied().collect(),
            uvs: layer.uvs.iter().flatten().copied().collect(),
            colors: layer.colors.iter().flatten().copied().collect(),
            indices: layer.indices.clone(),
        }
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Raw mesh data for custom use.
#[derive(Debug, Clone, Serialize)]
pub struct RawMeshData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<i64>,
    /// Parcel extents `[width, height, depth]`.
    pub extents: [usize; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    pub solid: RawLayerData,
    pub glass: RawLayerData,
}

/// Export mesh as raw data.
/// Layers stay separate; an empty layer has empty arrays.
pub fn export_raw(mesh: &ParcelMesh) -> RawMeshData {
    RawMeshData {
        parcel_id: mesh.parcel_id,
        extents: mesh.extents,
        placement: mesh.placement,
        solid: RawLayerData::from_layer(&mesh.solid),
        glass: RawLayerData::from_layer(&mesh.glass),
    }
}

impl RawMeshData {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get the number of vertices across both layers.
    pub fn vertex_count(&self) -> usize {
        self.solid.vertex_count() + self.glass.vertex_count()
    }

    /// Get the number of triangles across both layers.
    pub fn triangle_count(&self) -> usize {
        self.solid.triangle_count() + self.glass.triangle_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::VoxelGrid;
    use crate::mesher::Mesher;

    #[test]
    fn test_export_raw() {
        let mut grid = VoxelGrid::new([2, 1, 1]).unwrap();
        grid.set(0, 0, 0, 10);
        grid.set(1, 0, 0, 2);
        let mesh = Mesher::new().mesh_grid(&grid);

        let raw = export_raw(&mesh);

        assert_eq!(raw.solid.vertex_count(), mesh.solid.vertex_count());
        assert_eq!(raw.glass.triangle_count(), mesh.glass.triangle_count());
        assert_eq!(raw.solid.positions.len(), raw.solid.normals.len());
        assert_eq!(raw.solid.uvs.len(), raw.solid.vertex_count() * 2);
        assert_eq!(raw.solid.colors.len(), raw.solid.vertex_count() * 4);
        assert_eq!(raw.vertex_count(), mesh.total_vertices());
    }

    #[test]
    fn test_raw_json_shape() {
        let mut grid = VoxelGrid::new([1, 1, 1]).unwrap();
        grid.set(0, 0, 0, 10);
        let raw = export_raw(&Mesher::new().mesh_grid(&grid));

        let value: serde_json::Value = serde_json::from_str(&raw.to_json().unwrap()).unwrap();
        assert!(value.get("parcel_id").is_none());
        assert_eq!(value["extents"], serde_json::json!([1, 1, 1]));
        assert_eq!(value["solid"]["indices"].as_array().unwrap().len(), 36);
        assert!(value["glass"]["positions"].as_array().unwrap().is_empty());
    }
}
