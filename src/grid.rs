//! Dense voxel grid with an air boundary.

use crate::decoder::{self, SizePolicy};
use crate::error::{MesherError, Result};
use crate::parcel::ParcelDescription;
use crate::types::{VoxelCode, AIR};

/// Largest grid accepted, in cells, and the largest extent along any one axis.
pub const MAX_GRID_CELLS: usize = 1 << 27;

const _: () = assert!(MAX_GRID_CELLS <= i32::MAX as usize);

/// Number of cells in a grid of `dims`, rejecting grids past [`MAX_GRID_CELLS`].
pub fn cell_count(dims: [usize; 3]) -> Result<usize> {
    let too_large = || MesherError::GridTooLarge { dims };
    if dims.iter().any(|&d| d > MAX_GRID_CELLS) {
        return Err(too_large());
    }
    dims[0]
        .checked_mul(dims[1])
        .and_then(|n| n.checked_mul(dims[2]))
        .filter(|&n| n <= MAX_GRID_CELLS)
        .ok_or_else(too_large)
}

/// A dense 3D grid of voxel codes.
///
/// Stored flat, x-major with z varying fastest: `index = (x * dy + y) * dz + z`.
/// This is the layout of the decoded payload, so decoding is a straight copy.
/// Every axis is at most [`MAX_GRID_CELLS`], so coordinates always fit in `i32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    dims: [usize; 3],
    voxels: Vec<VoxelCode>,
}

impl VoxelGrid {
    /// An all-air grid.
    pub fn new(dims: [usize; 3]) -> Result<Self> {
        let cells = cell_count(dims)?;
        Ok(Self {
            dims,
            voxels: vec![AIR; cells],
        })
    }

    /// Wrap an existing buffer, which must hold exactly `dx * dy * dz` codes.
    pub fn from_voxels(dims: [usize; 3], voxels: Vec<VoxelCode>) -> Result<Self> {
        let expected = cell_count(dims)?;
        if voxels.len() != expected {
            return Err(MesherError::GridSize {
                expected,
                actual: voxels.len(),
            });
        }
        Ok(Self { dims, voxels })
    }

    /// Decode a parcel's payload into a grid at half-voxel resolution.
    pub fn from_parcel(parcel: &ParcelDescription, policy: SizePolicy) -> Result<Self> {
        let dims = parcel.bounds()?.grid_dims();
        let capacity = cell_count(dims)?;
        let voxels = decoder::decode(&parcel.voxels, capacity, policy)?;
        Ok(Self { dims, voxels })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Whether the grid has zero extent on any axis.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Raw codes in storage order.
    pub fn voxels(&self) -> &[VoxelCode] {
        &self.voxels
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        let [dx, dy, dz] = self.dims;
        if x >= dx || y >= dy || z >= dz {
            return None;
        }
        Some((x * dy + y) * dz + z)
    }

    /// The code at `(x, y, z)`, or air for any coordinate outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> VoxelCode {
        match self.index(x, y, z) {
            Some(i) => self.voxels[i],
            None => AIR,
        }
    }

    /// Set the code at `(x, y, z)`. Returns `false` (and does nothing) when out of range.
    pub fn set(&mut self, x: i32, y: i32, z: i32, code: VoxelCode) -> bool {
        match self.index(x, y, z) {
            Some(i) => {
                self.voxels[i] = code;
                true
            }
            None => false,
        }
    }

    /// Count of cells holding each distinct code, sorted by code.
    pub fn histogram(&self) -> Vec<(VoxelCode, usize)> {
        let mut sorted = self.voxels.clone();
        sorted.sort_unstable();
        let mut out: Vec<(VoxelCode, usize)> = Vec::new();
        for code in sorted {
            match out.last_mut() {
                Some((last, count)) if *last == code => *count += 1,
                _ => out.push((code, 1)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_air() {
        let mut grid = VoxelGrid::new([2, 3, 4]).unwrap();
        for x in 0..2 {
            for y in 0..3 {
                for z in 0..4 {
                    grid.set(x, y, z, 7);
                }
            }
        }
        assert_eq!(grid.get(0, 0, 0), 7);
        assert_eq!(grid.get(1, 2, 3), 7);
        assert_eq!(grid.get(-1, 0, 0), AIR);
        assert_eq!(grid.get(0, -1, 0), AIR);
        assert_eq!(grid.get(0, 0, -1), AIR);
        assert_eq!(grid.get(2, 0, 0), AIR);
        assert_eq!(grid.get(0, 3, 0), AIR);
        assert_eq!(grid.get(0, 0, 4), AIR);
        assert!(!grid.set(0, 0, 4, 9));
    }

    #[test]
    fn test_storage_order_is_z_fastest() {
        let voxels: Vec<VoxelCode> = (0..24).collect();
        let grid = VoxelGrid::from_voxels([2, 3, 4], voxels).unwrap();
        assert_eq!(grid.get(0, 0, 1), 1);
        assert_eq!(grid.get(0, 1, 0), 4);
        assert_eq!(grid.get(1, 0, 0), 12);
        assert_eq!(grid.get(1, 2, 3), 23);
    }

    #[test]
    fn test_from_voxels_rejects_wrong_length() {
        let err = VoxelGrid::from_voxels([2, 2, 2], vec![0; 7]).unwrap_err();
        assert!(matches!(err, MesherError::GridSize { expected: 8, actual: 7 }));
    }

    #[test]
    fn test_zero_extent_grid() {
        let grid = VoxelGrid::new([0, 4, 4]).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.get(0, 0, 0), AIR);
    }

    #[test]
    fn test_from_parcel_decodes_half_voxel_grid() {
        let voxels: Vec<VoxelCode> = (0..8).map(|i| i as VoxelCode * 10).collect();
        let parcel = ParcelDescription {
            id: 1,
            x1: 3,
            x2: 4,
            y1: 0,
            y2: 1,
            z1: -1,
            z2: 0,
            name: None,
            voxels: decoder::encode_voxels(&voxels).unwrap(),
            tileset: None,
        };
        let grid = VoxelGrid::from_parcel(&parcel, SizePolicy::Strict).unwrap();
        assert_eq!(grid.dims(), [2, 2, 2]);
        assert_eq!(grid.voxels(), voxels.as_slice());
        assert_eq!(grid.get(1, 1, 1), 70);
    }

    #[test]
    fn test_oversized_grids_are_rejected() {
        for dims in [
            [MAX_GRID_CELLS + 1, 1, 1],
            [1 << 20, 1 << 20, 1],
            [0, usize::MAX, 3],
            [usize::MAX, usize::MAX, usize::MAX],
        ] {
            let err = VoxelGrid::new(dims).unwrap_err();
            assert!(matches!(err, MesherError::GridTooLarge { .. }), "{dims:?}");
            assert!(VoxelGrid::from_voxels(dims, Vec::new()).is_err());
        }
        assert_eq!(cell_count([MAX_GRID_CELLS, 1, 1]).unwrap(), MAX_GRID_CELLS);
        assert_eq!(cell_count([0, MAX_GRID_CELLS, 0]).unwrap(), 0);
    }

    #[test]
    fn test_huge_parcel_is_an_error() {
        let mut parcel = ParcelDescription {
            id: 9,
            x1: 0,
            x2: 1 << 21,
            y1: 0,
            y2: 1 << 21,
            z1: 0,
            z2: 1 << 21,
            name: None,
            voxels: decoder::encode_voxels(&[1, 2, 3]).unwrap(),
            tileset: None,
        };
        let err = VoxelGrid::from_parcel(&parcel, SizePolicy::Truncate).unwrap_err();
        assert!(matches!(err, MesherError::GridTooLarge { .. }));

        parcel.x1 = i32::MIN;
        parcel.x2 = i32::MAX;
        let err = VoxelGrid::from_parcel(&parcel, SizePolicy::Truncate).unwrap_err();
        assert!(matches!(err, MesherError::InvalidBounds(_)));
    }

    #[test]
    fn test_histogram() {
        let grid = VoxelGrid::from_voxels([1, 1, 5], vec![3, 0, 3, 2, 0]).unwrap();
        assert_eq!(grid.histogram(), vec![(0, 2), (2, 1), (3, 2)]);
    }
}
