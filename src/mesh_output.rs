//! Canonical mesh output types.
//!
//! [`MeshLayer`] holds the geometry for one classification pass in
//! structure-of-arrays layout with zero-copy byte accessors for GPU upload.
//! [`ParcelMesh`] pairs the solid and glass layers of one parcel.

use crate::types::{BoundingBox, Layer, Placement};
use glam::Vec3;
use std::mem;

/// Vertices emitted per quad.
pub const VERTICES_PER_QUAD: usize = 4;

/// Indices emitted per quad (two triangles).
pub const INDICES_PER_QUAD: usize = 6;

/// A single mesh layer with vertex attributes and indices.
///
/// Every quad owns four fresh vertices; nothing is welded, so
/// `positions`, `normals`, `uvs` and `colors` always have equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshLayer {
    /// Vertex positions in half-voxel units.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (unit length), derived from triangle winding.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates into the atlas.
    pub uvs: Vec<[f32; 2]>,
    /// Flat per-face palette colours, RGBA.
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices (three per triangle).
    pub indices: Vec<u32>,
}

impl MeshLayer {
    /// Create a new empty mesh layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty layer with room for `quads` faces.
    pub fn with_quad_capacity(quads: usize) -> Self {
        let vertices = quads * VERTICES_PER_QUAD;
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(quads * INDICES_PER_QUAD),
        }
    }

    /// Returns `true` if this layer contains no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of vertices in this layer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in this layer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads in this layer.
    pub fn quad_count(&self) -> usize {
        self.indices.len() / INDICES_PER_QUAD
    }

    /// Append one quad.
    ///
    /// Corners come in the order `0 1 / 2 3`. Forward winding emits triangles
    /// `(0,1,2) (1,3,2)`; reversed emits `(2,1,0) (2,3,1)`.
    pub fn push_quad(
        &mut self,
        corners: [[f32; 3]; 4],
        uvs: [[f32; 2]; 4],
        color: [f32; 4],
        forward: bool,
    ) {
        let v = self.positions.len() as u32;

        self.positions.extend_from_slice(&corners);
        self.uvs.extend_from_slice(&uvs);
        self.colors.extend_from_slice(&[color; VERTICES_PER_QUAD]);
        self.normals.extend_from_slice(&[[0.0; 3]; VERTICES_PER_QUAD]);

        if forward {
            self.indices
                .extend_from_slice(&[v, v + 1, v + 2, v + 1, v + 3, v + 2]);
        } else {
            self.indices
                .extend_from_slice(&[v + 2, v + 1, v, v + 2, v + 3, v + 1]);
        }
    }

    /// Recompute vertex normals by averaging the face normals of every
    /// triangle that references each vertex.
    pub fn recalculate_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            let face = (pb - pa).cross(pc - pa);
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }

        self.normals = sums
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }

    /// Bounding box of all vertex positions, `None` when empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().copied())
    }

    /// Copy of this layer with positions mapped into world space.
    pub fn placed(&self, placement: &Placement) -> MeshLayer {
        let mut out = self.clone();
        for p in &mut out.positions {
            *p = placement.to_world(*p);
        }
        out
    }

    /// Raw bytes of the positions array. Zero-allocation view.
    pub fn positions_bytes(&self) -> &[u8] {
        cast_slice(&self.positions)
    }

    /// Raw bytes of the normals array. Zero-allocation view.
    pub fn normals_bytes(&self) -> &[u8] {
        cast_slice(&self.normals)
    }

    /// Raw bytes of the UVs array. Zero-allocation view.
    pub fn uvs_bytes(&self) -> &[u8] {
        cast_slice(&self.uvs)
    }

    /// Raw bytes of the colors array. Zero-allocation view.
    pub fn colors_bytes(&self) -> &[u8] {
        cast_slice(&self.colors)
    }

    /// Raw bytes of the indices array. Zero-allocation view.
    pub fn indices_bytes(&self) -> &[u8] {
        cast_slice(&self.indices)
    }

    /// Merge another layer into this one, offsetting indices appropriately.
    pub fn merge(&mut self, other: &MeshLayer) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.colors.extend_from_slice(&other.colors);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }
}

/// Cast a slice of `T` to a byte slice without allocation.
pub(crate) fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    // SAFETY: [f32; N], [u32] are all Pod-like types with no padding.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// Both meshes generated for one parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelMesh {
    /// Parcel id, when meshed from a parcel description.
    pub parcel_id: Option<i64>,
    /// Opaque geometry (atlas material).
    pub solid: MeshLayer,
    /// Glass geometry (transparent material).
    pub glass: MeshLayer,
    /// Parcel extents `[width, height, depth]` in world voxels.
    pub extents: [usize; 3],
    /// World placement, when known.
    pub placement: Option<Placement>,
}

impl ParcelMesh {
    /// The mesh for one layer.
    pub fn layer(&self, layer: Layer) -> &MeshLayer {
        match layer {
            Layer::Solid => &self.solid,
            Layer::Transparent => &self.glass,
        }
    }

    /// Non-empty layers, in render order.
    pub fn layers(&self) -> impl Iterator<Item = (Layer, &MeshLayer)> {
        Layer::ALL
            .into_iter()
            .map(move |layer| (layer, self.layer(layer)))
            .filter(|(_, mesh)| !mesh.is_empty())
    }

    pub fn has_solid(&self) -> bool {
        !self.solid.is_empty()
    }

    pub fn has_glass(&self) -> bool {
        !self.glass.is_empty()
    }

    /// Returns `true` if both layers are empty.
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.glass.is_empty()
    }

    /// Total vertex count across both layers.
    pub fn total_vertices(&self) -> usize {
        self.solid.vertex_count() + self.glass.vertex_count()
    }

    /// Total triangle count across both layers.
    pub fn total_triangles(&self) -> usize {
        self.solid.triangle_count() + self.glass.triangle_count()
    }

    /// Bounding box of both layers in mesh-local coordinates.
    pub fn bounds(&self) -> Option<BoundingBox> {
        match (self.solid.bounds(), self.glass.bounds()) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        }
    }

    /// Copy with both layers moved into world space. Unchanged when no placement is known.
    pub fn to_world(&self) -> ParcelMesh {
        match &self.placement {
            Some(placement) => ParcelMesh {
                solid: self.solid.placed(placement),
                glass: self.glass.placed(placement),
                placement: None,
                ..self.clone()
            },
            None => self.clone(),
        }
    }

    /// Merge both layers into a single [`MeshLayer`]. Loses the material split.
    pub fn flatten(&self) -> MeshLayer {
        let mut combined = self.solid.clone();
        combined.merge(&self.glass);
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> [[f32; 3]; 4] {
        [
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_push_quad_winding() {
        let mut layer = MeshLayer::new();
        let uvs = [[0.0, 0.0]; 4];
        layer.push_quad(unit_quad(), uvs, [1.0; 4], true);
        layer.push_quad(unit_quad(), uvs, [1.0; 4], false);

        assert_eq!(layer.vertex_count(), 8);
        assert_eq!(layer.quad_count(), 2);
        assert_eq!(layer.indices, vec![0, 1, 2, 1, 3, 2, 6, 5, 4, 6, 7, 5]);
    }

    #[test]
    fn test_recalculate_normals_follows_winding() {
        let mut layer = MeshLayer::new();
        layer.push_quad(unit_quad(), [[0.0, 0.0]; 4], [1.0; 4], true);
        layer.push_quad(unit_quad(), [[0.0, 0.0]; 4], [1.0; 4], false);
        layer.recalculate_normals();

        for n in &layer.normals[..4] {
            assert_eq!(*n, [1.0, 0.0, 0.0]);
        }
        for n in &layer.normals[4..] {
            assert_eq!(*n, [-1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_mesh_layer_merge() {
        let mut a = MeshLayer {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            colors: vec![[1.0, 1.0, 1.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        };
        let b = a.clone();
        a.merge(&b);

        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.triangle_count(), 2);
        // Second triangle's indices should be offset by 3
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_mesh_layer_bytes_zero_alloc() {
        let layer = MeshLayer {
            positions: vec![[1.0, 2.0, 3.0]],
            normals: vec![[0.0, 1.0, 0.0]],
            uvs: vec![[0.5, 0.5]],
            colors: vec![[1.0, 0.0, 0.0, 1.0]],
            indices: vec![0],
        };

        assert_eq!(layer.positions_bytes().len(), 12); // 3 * 4 bytes
        assert_eq!(layer.normals_bytes().len(), 12);
        assert_eq!(layer.uvs_bytes().len(), 8); // 2 * 4 bytes
        assert_eq!(layer.colors_bytes().len(), 16); // 4 * 4 bytes
        assert_eq!(layer.indices_bytes().len(), 4); // 1 * 4 bytes
    }

    #[test]
    fn test_parcel_mesh_bounds_and_layers() {
        let mut solid = MeshLayer::new();
        solid.push_quad(unit_quad(), [[0.0, 0.0]; 4], [1.0; 4], true);
        let mut glass = MeshLayer::new();
        glass.push_quad(
            unit_quad().map(|[x, y, z]| [x + 2.0, y, z]),
            [[0.0, 0.0]; 4],
            [1.0; 4],
            true,
        );

        let mesh = ParcelMesh {
            parcel_id: None,
            solid,
            glass: MeshLayer::new(),
            extents: [1, 1, 1],
            placement: None,
        };
        assert!(mesh.has_solid());
        assert!(!mesh.has_glass());
        assert_eq!(mesh.layers().count(), 1);
        assert_eq!(mesh.bounds().unwrap().max, [1.0, 1.0, 1.0]);

        let mesh = ParcelMesh { glass, ..mesh };
        assert_eq!(mesh.layers().count(), 2);
        assert_eq!(mesh.bounds().unwrap().max, [3.0, 1.0, 1.0]);
        assert_eq!(mesh.flatten().vertex_count(), 8);
        assert_eq!(mesh.total_triangles(), 4);
    }

    #[test]
    fn test_to_world_applies_placement() {
        let mut solid = MeshLayer::new();
        solid.push_quad(unit_quad(), [[0.0, 0.0]; 4], [1.0; 4], true);
        let placement = Placement {
            origin: [10.0, -1.0, 0.0],
            offset: [0.5, 0.0, 0.0],
            scale: 0.5,
        };
        let mesh = ParcelMesh {
            parcel_id: Some(3),
            solid,
            glass: MeshLayer::new(),
            extents: [1, 1, 1],
            placement: Some(placement),
        };

        let world = mesh.to_world();
        assert!(world.placement.is_none());
        assert_eq!(world.solid.positions[0], [11.0, -0.5, 0.0]);
        assert_eq!(world.solid.normals, mesh.solid.normals);
        assert_eq!(world.to_world(), world);
    }

    #[test]
    fn test_empty_parcel_mesh() {
        let mesh = ParcelMesh {
            parcel_id: Some(1),
            solid: MeshLayer::new(),
            glass: MeshLayer::new(),
            extents: [0, 0, 0],
            placement: None,
        };
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert_eq!(mesh.layers().count(), 0);
    }
}
