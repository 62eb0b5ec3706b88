//! Shared types used throughout the library.

mod direction;
mod transform;

pub use direction::{Axis, Direction};
pub use transform::{Placement, MESH_NUDGE, PARCEL_GROUND_Y, VOXEL_SCALE};

use crate::error::{MesherError, Result};
use serde::{Deserialize, Serialize};

/// A packed 16-bit voxel value (material class plus palette/atlas selection).
pub type VoxelCode = u16;

/// Empty space.
pub const AIR: VoxelCode = 0;

/// The one code that is geometry for the transparent layer.
pub const GLASS: VoxelCode = 2;

/// Codes up to and including this value are transparent materials.
pub const MAX_TRANSPARENT_CODE: VoxelCode = 2;

/// Whether a code belongs to the transparent material class (`0..=2`).
pub fn is_transparent(code: VoxelCode) -> bool {
    code <= MAX_TRANSPARENT_CODE
}

/// Which classification pass a mesh is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Opaque voxels, textured from the atlas.
    Solid,
    /// Glass voxels, full-quad UVs.
    Transparent,
}

impl Layer {
    /// Both layers, in meshing order.
    pub const ALL: [Layer; 2] = [Layer::Solid, Layer::Transparent];

    /// Whether `code` counts as geometry for this layer.
    pub fn is_geometry(&self, code: VoxelCode) -> bool {
        match self {
            Layer::Solid => code > MAX_TRANSPARENT_CODE,
            Layer::Transparent => code == GLASS,
        }
    }

    /// Object name used by exporters.
    pub fn object_name(&self) -> &'static str {
        match self {
            Layer::Solid => "solid-voxels",
            Layer::Transparent => "glass-voxels",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Solid => write!(f, "solid"),
            Layer::Transparent => write!(f, "transparent"),
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Integer bounding box of a parcel, in world voxel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParcelBounds {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl ParcelBounds {
    /// Create parcel bounds, rejecting any axis with `max < min` or whose
    /// half-voxel extent does not fit in an `i32`.
    pub fn new(min: [i32; 3], max: [i32; 3]) -> Result<Self> {
        for (axis, (lo, hi)) in ["x", "y", "z"].iter().zip(min.iter().zip(max.iter())) {
            if hi < lo {
                return Err(MesherError::InvalidBounds(format!(
                    "{axis}2 ({hi}) is less than {axis}1 ({lo})"
                )));
            }
            if hi.checked_sub(*lo).and_then(|e| e.checked_mul(2)).is_none() {
                return Err(MesherError::InvalidBounds(format!(
                    "{axis} extent from {lo} to {hi} is too large"
                )));
            }
        }
        Ok(Self { min, max })
    }

    fn extent(&self, axis: usize) -> usize {
        (i64::from(self.max[axis]) - i64::from(self.min[axis])).max(0) as usize
    }

    pub fn width(&self) -> usize {
        self.extent(0)
    }

    pub fn height(&self) -> usize {
        self.extent(1)
    }

    pub fn depth(&self) -> usize {
        self.extent(2)
    }

    /// Voxel grid dimensions at half-voxel resolution.
    pub fn grid_dims(&self) -> [usize; 3] {
        [self.width(), self.height(), self.depth()].map(|e| e.saturating_mul(2))
    }

    /// Parcel centre on the x/z plane.
    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] as f32 + self.max[0] as f32) / 2.0,
            (self.min[2] as f32 + self.max[2] as f32) / 2.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_geometry_classification() {
        assert!(!Layer::Solid.is_geometry(0));
        assert!(!Layer::Solid.is_geometry(1));
        assert!(!Layer::Solid.is_geometry(2));
        assert!(Layer::Solid.is_geometry(3));
        assert!(Layer::Solid.is_geometry(32768 + 96));

        assert!(!Layer::Transparent.is_geometry(0));
        assert!(!Layer::Transparent.is_geometry(1));
        assert!(Layer::Transparent.is_geometry(2));
        assert!(!Layer::Transparent.is_geometry(3));
    }

    #[test]
    fn test_transparent_codes() {
        assert!(is_transparent(AIR));
        assert!(is_transparent(1));
        assert!(is_transparent(GLASS));
        assert!(!is_transparent(3));
    }

    #[test]
    fn test_parcel_bounds_dims() {
        let bounds = ParcelBounds::new([-3, 0, 5], [5, 4, 7]).unwrap();
        assert_eq!(bounds.width(), 8);
        assert_eq!(bounds.height(), 4);
        assert_eq!(bounds.depth(), 2);
        assert_eq!(bounds.grid_dims(), [16, 8, 4]);
        assert_eq!(bounds.center(), [1.0, 6.0]);
    }

    #[test]
    fn test_parcel_bounds_rejects_inverted_axis() {
        let err = ParcelBounds::new([0, 4, 0], [1, 2, 1]).unwrap_err();
        assert!(err.to_string().contains("y2"));
    }

    #[test]
    fn test_parcel_bounds_rejects_overflowing_extent() {
        let err = ParcelBounds::new([i32::MIN, 0, 0], [i32::MAX, 1, 1]).unwrap_err();
        assert!(matches!(err, MesherError::InvalidBounds(_)));
        assert!(err.to_string().contains("x extent"));
        assert!(ParcelBounds::new([0, 0, 0], [1, 1 << 30, 1]).is_err());

        let widest = ParcelBounds::new([0, 0, 0], [1, (1 << 30) - 1, 1]).unwrap();
        assert_eq!(widest.grid_dims()[1], (1usize << 31) - 2);

        let unchecked = ParcelBounds {
            min: [i32::MIN, 5, 0],
            max: [i32::MAX, 0, 0],
        };
        assert_eq!(unchecked.width(), u32::MAX as usize);
        assert_eq!(unchecked.height(), 0);
        assert_eq!(unchecked.center()[0], 0.0);
    }

    #[test]
    fn test_bounding_box_from_points() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());

        let bb = BoundingBox::from_points(
            [[1.0, 2.0, 3.0], [-1.0, 5.0, 0.0]].into_iter(),
        )
        .unwrap();
        assert_eq!(bb.min, [-1.0, 2.0, 0.0]);
        assert_eq!(bb.max, [1.0, 5.0, 3.0]);
        assert_eq!(bb.dimensions(), [2.0, 3.0, 3.0]);
    }
}
