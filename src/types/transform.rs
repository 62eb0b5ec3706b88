//! Placement of a parcel's voxel meshes in world space.

use super::ParcelBounds;
use serde::{Deserialize, Serialize};

/// Vertical origin of every parcel, just below ground level.
pub const PARCEL_GROUND_Y: f32 = -0.999;

/// Mesh vertices are in half-voxel units.
pub const VOXEL_SCALE: f32 = 0.5;

/// Fixed nudge applied to the mesh origin within its parcel.
pub const MESH_NUDGE: [f32; 3] = [0.5, 0.0, 0.125];

/// Where a parcel's meshes sit in the world.
///
/// World position of a mesh vertex `v` is `origin + offset + v * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Parcel centre on the x/z plane, at ground height.
    pub origin: [f32; 3],
    /// Mesh offset relative to the parcel origin.
    pub offset: [f32; 3],
    /// Uniform mesh scale.
    pub scale: f32,
}

impl Placement {
    /// Derive the placement from a parcel bounding box.
    pub fn for_parcel(bounds: &ParcelBounds) -> Self {
        let [cx, cz] = bounds.center();
        let width = bounds.width() as f32;
        let depth = bounds.depth() as f32;
        Self {
            origin: [cx, PARCEL_GROUND_Y, cz],
            offset: [
                -width / 2.0 + MESH_NUDGE[0],
                MESH_NUDGE[1],
                -depth / 2.0 + MESH_NUDGE[2],
            ],
            scale: VOXEL_SCALE,
        }
    }

    /// Combined translation (origin + offset).
    pub fn translation(&self) -> [f32; 3] {
        [
            self.origin[0] + self.offset[0],
            self.origin[1] + self.offset[1],
            self.origin[2] + self.offset[2],
        ]
    }

    /// Map a mesh-local position into world space.
    pub fn to_world(&self, local: [f32; 3]) -> [f32; 3] {
        let t = self.translation();
        [
            t[0] + local[0] * self.scale,
            t[1] + local[1] * self.scale,
            t[2] + local[2] * self.scale,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_centres_parcel() {
        let bounds = ParcelBounds::new([10, 0, -4], [18, 6, 4]).unwrap();
        let placement = Placement::for_parcel(&bounds);

        assert_eq!(placement.origin, [14.0, PARCEL_GROUND_Y, 0.0]);
        assert_eq!(placement.offset, [-3.5, 0.0, -3.875]);
        assert_eq!(placement.scale, 0.5);
    }

    #[test]
    fn test_to_world_scales_half_voxels() {
        let bounds = ParcelBounds::new([0, 0, 0], [2, 2, 2]).unwrap();
        let placement = Placement::for_parcel(&bounds);

        // Far corner of the grid (4 half-voxels) lands one full parcel width away.
        let near = placement.to_world([0.0, 0.0, 0.0]);
        let far = placement.to_world([4.0, 4.0, 4.0]);
        assert_eq!(far[0] - near[0], 2.0);
        assert_eq!(far[1] - near[1], 2.0);
        assert_eq!(far[2] - near[2], 2.0);
    }
}
