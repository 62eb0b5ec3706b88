//! Fixed-grid atlas layout.

use crate::types::{is_transparent, Layer, VoxelCode};
use serde::{Deserialize, Serialize};

/// Number of tiles in the atlas; codes wrap modulo this.
pub const ATLAS_TILES: u32 = 16;

/// Tiles per atlas row.
pub const ATLAS_COLUMNS: u32 = 4;

/// Half-size of the region sampled around each tile centre, in UV units.
pub const TILE_HALF_EXTENT: f32 = 1.0 / 16.0;

/// UVs for faces that map the whole texture, in emission order.
pub const FULL_QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// A region within the texture atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    /// U coordinate of the left edge (0-1).
    pub u_min: f32,
    /// V coordinate of the bottom edge (0-1).
    pub v_min: f32,
    /// U coordinate of the right edge (0-1).
    pub u_max: f32,
    /// V coordinate of the top edge (0-1).
    pub v_max: f32,
}

impl AtlasRegion {
    /// Get the width of this region in UV space.
    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    /// Get the height of this region in UV space.
    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }

    /// Quad UVs in emission order: (min,min), (max,min), (min,max), (max,max).
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.u_min, self.v_min],
            [self.u_max, self.v_min],
            [self.u_min, self.v_max],
            [self.u_max, self.v_max],
        ]
    }
}

/// How voxel codes map onto atlas tiles.
///
/// Tile `code % tiles` sits at column `index % columns`, row `index / columns`,
/// with row 0 at the top of the texture (V is flipped).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtlasLayout {
    pub tiles: u32,
    pub columns: u32,
    pub half_extent: f32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            tiles: ATLAS_TILES,
            columns: ATLAS_COLUMNS,
            half_extent: TILE_HALF_EXTENT,
        }
    }
}

impl AtlasLayout {
    /// Rows in the atlas grid.
    pub fn rows(&self) -> u32 {
        self.tiles.div_ceil(self.columns.max(1)).max(1)
    }

    /// Tile index for a code.
    pub fn tile_index(&self, code: VoxelCode) -> u32 {
        code as u32 % self.tiles.max(1)
    }

    /// Atlas region sampled for a code.
    pub fn region(&self, code: VoxelCode) -> AtlasRegion {
        let columns = self.columns.max(1);
        let index = self.tile_index(code);
        let column = index % columns;
        let row = index / columns;

        let cx = (column as f32 + 0.5) / columns as f32;
        let cy = 1.0 - (row as f32 + 0.5) / self.rows() as f32;
        let s = self.half_extent;

        AtlasRegion {
            u_min: cx - s,
            v_min: cy - s,
            u_max: cx + s,
            v_max: cy + s,
        }
    }

    /// Tile UVs for a code, in quad corner order.
    pub fn uvs(&self, code: VoxelCode) -> [[f32; 2]; 4] {
        self.region(code).corners()
    }

    /// UVs for a face owned by `code` in `layer`.
    ///
    /// Every transparent-layer face, and any face owned by a transparent code,
    /// maps the full texture instead of an atlas tile.
    pub fn face_uvs(&self, layer: Layer, code: VoxelCode) -> [[f32; 2]; 4] {
        if layer == Layer::Transparent || is_transparent(code) {
            FULL_QUAD_UVS
        } else {
            self.uvs(code)
        }
    }
}
