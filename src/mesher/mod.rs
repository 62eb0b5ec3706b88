//! Mesh generation from voxel grids.
//!
//! This module turns a decoded [`VoxelGrid`] into one [`MeshLayer`] per layer.

pub mod boundary;

pub use boundary::{count_faces, mesh_layer, scan_boundaries, Boundary};

use crate::atlas::AtlasLayout;
use crate::decoder::SizePolicy;
use crate::error::Result;
use crate::grid::VoxelGrid;
use crate::mesh_output::{MeshLayer, ParcelMesh};
use crate::palette::Palette;
use crate::parcel::ParcelDescription;
use crate::types::{Layer, Placement};

/// Main mesher configuration.
#[derive(Debug, Clone, Default)]
pub struct MesherConfig {
    /// How to handle payloads that do not match the declared parcel size.
    pub size_policy: SizePolicy,
    /// Colour table indexed by voxel code.
    pub palette: Palette,
    /// Atlas tile addressing.
    pub atlas: AtlasLayout,
    /// Mesh the solid and glass layers concurrently (requires the `parallel` feature).
    pub parallel_layers: bool,
}

impl MesherConfig {
    /// Use a specific size policy for payload decoding.
    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.size_policy = policy;
        self
    }

    /// Use a custom palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Use a custom atlas layout.
    pub fn with_atlas(mut self, atlas: AtlasLayout) -> Self {
        self.atlas = atlas;
        self
    }

    /// Mesh both layers in parallel.
    pub fn with_parallel_layers(mut self, parallel: bool) -> Self {
        self.parallel_layers = parallel;
        self
    }
}

/// The main mesher struct.
#[derive(Debug, Clone, Default)]
pub struct Mesher {
    config: MesherConfig,
}

impl Mesher {
    /// Create a new mesher with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mesher with custom configuration.
    pub fn with_config(config: MesherConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Mesh one layer of a grid.
    pub fn mesh(&self, grid: &VoxelGrid, layer: Layer) -> MeshLayer {
        mesh_layer(grid, layer, &self.config.palette, &self.config.atlas)
    }

    /// Mesh both layers of a grid.
    ///
    /// Extents are the grid dimensions halved; no placement is attached.
    pub fn mesh_grid(&self, grid: &VoxelGrid) -> ParcelMesh {
        let (solid, glass) = self.mesh_layers(grid);
        ParcelMesh {
            parcel_id: None,
            solid,
            glass,
            extents: grid.dims().map(|d| d.div_ceil(2)),
            placement: None,
        }
    }

    /// Decode a parcel and mesh both of its layers.
    pub fn mesh_parcel(&self, parcel: &ParcelDescription) -> Result<ParcelMesh> {
        let bounds = parcel.bounds()?;
        let grid = VoxelGrid::from_parcel(parcel, self.config.size_policy)?;
        let (solid, glass) = self.mesh_layers(&grid);

        log::debug!(
            "parcel {}: grid {:?}, {} solid quads, {} glass quads",
            parcel.id,
            grid.dims(),
            solid.quad_count(),
            glass.quad_count()
        );

        Ok(ParcelMesh {
            parcel_id: Some(parcel.id),
            solid,
            glass,
            extents: [bounds.width(), bounds.height(), bounds.depth()],
            placement: Some(Placement::for_parcel(&bounds)),
        })
    }

    /// Mesh a batch of parcels, one result per parcel in input order.
    pub fn mesh_parcels(&self, parcels: &[ParcelDescription]) -> Vec<Result<ParcelMesh>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            parcels.par_iter().map(|p| self.mesh_parcel(p)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            parcels.iter().map(|p| self.mesh_parcel(p)).collect()
        }
    }

    fn mesh_layers(&self, grid: &VoxelGrid) -> (MeshLayer, MeshLayer) {
        #[cfg(feature = "parallel")]
        if self.config.parallel_layers {
            return rayon::join(
                || self.mesh(grid, Layer::Solid),
                || self.mesh(grid, Layer::Transparent),
            );
        }

        (
            self.mesh(grid, Layer::Solid),
            self.mesh(grid, Layer::Transparent),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::encode_voxels;
    use crate::error::{DecodeError, MesherError};

    fn parcel(extent: [i32; 3], voxels: &[u16]) -> ParcelDescription {
        ParcelDescription {
            id: 7,
            x1: 0,
            x2: extent[0],
            y1: 0,
            y2: extent[1],
            z1: 0,
            z2: extent[2],
            name: None,
            voxels: encode_voxels(voxels).unwrap(),
            tileset: None,
        }
    }

    #[test]
    fn test_mesh_parcel_both_layers() {
        // 1x1x1 parcel = 2x2x2 grid: one solid and one glass cell.
        let mut voxels = vec![0u16; 8];
        voxels[0] = 10;
        voxels[7] = 2;
        let mesh = Mesher::new().mesh_parcel(&parcel([1, 1, 1], &voxels)).unwrap();

        assert_eq!(mesh.parcel_id, Some(7));
        assert_eq!(mesh.extents, [1, 1, 1]);
        assert_eq!(mesh.solid.quad_count(), 6);
        assert_eq!(mesh.glass.quad_count(), 6);
        assert!(mesh.placement.is_some());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut grid = VoxelGrid::new([3, 3, 3]).unwrap();
        grid.set(0, 0, 0, 10);
        grid.set(1, 0, 0, 2);
        grid.set(2, 2, 2, 300);

        let sequential = Mesher::new().mesh_grid(&grid);
        let parallel =
            Mesher::with_config(MesherConfig::default().with_parallel_layers(true)).mesh_grid(&grid);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.extents, [2, 2, 2]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_rayon_paths_match_sequential() {
        let mut voxels = vec![0u16; 64];
        for (i, v) in voxels.iter_mut().enumerate() {
            *v = [0, 2, 10, 96, 300][i * 7 % 5];
        }
        let parcels: Vec<_> = (1..=6)
            .map(|n| parcel([1, 2, 2], &voxels[..(n * 10).min(64)]))
            .collect();

        let sequential = Mesher::new();
        let parallel = Mesher::with_config(MesherConfig::default().with_parallel_layers(true));

        let grid = VoxelGrid::from_parcel(&parcels[5], SizePolicy::Truncate).unwrap();
        let joined = parallel.mesh_layers(&grid);
        assert_eq!(joined.0, sequential.mesh(&grid, Layer::Solid));
        assert_eq!(joined.1, sequential.mesh(&grid, Layer::Transparent));
        assert!(joined.0.quad_count() > 0 && joined.1.quad_count() > 0);

        let batch = parallel.mesh_parcels(&parcels);
        assert_eq!(batch.len(), parcels.len());
        for (p, result) in parcels.iter().zip(batch) {
            assert_eq!(result.unwrap(), sequential.mesh_parcel(p).unwrap());
        }
    }

    #[test]
    fn test_oversized_parcel_is_an_error() {
        let huge = parcel([1 << 21, 1 << 21, 1 << 21], &[10; 8]);
        assert!(matches!(
            Mesher::new().mesh_parcel(&huge).unwrap_err(),
            MesherError::GridTooLarge { .. }
        ));

        let mut wide = parcel([1, 1, 1], &[10; 8]);
        wide.x1 = i32::MIN;
        wide.x2 = i32::MAX;
        assert!(matches!(
            Mesher::new().mesh_parcel(&wide).unwrap_err(),
            MesherError::InvalidBounds(_)
        ));
    }

    #[test]
    fn test_size_policy_is_honoured() {
        let short = parcel([1, 1, 1], &[10, 10]);

        let mesh = Mesher::new().mesh_parcel(&short).unwrap();
        assert_eq!(mesh.solid.quad_count(), 10);

        let strict = Mesher::with_config(MesherConfig::default().with_size_policy(SizePolicy::Strict));
        let err = strict.mesh_parcel(&short).unwrap_err();
        assert!(matches!(
            err,
            MesherError::Decode(DecodeError::SizeMismatch { expected: 16, actual: 4 })
        ));
    }

    #[test]
    fn test_custom_palette() {
        let palette = Palette::from_hex(&["#000000", "#ff0000"]).unwrap();
        let mesher = Mesher::with_config(MesherConfig::default().with_palette(palette));
        let mut grid = VoxelGrid::new([1, 1, 1]).unwrap();
        grid.set(0, 0, 0, 40);
        let solid = mesher.mesh(&grid, Layer::Solid);
        assert!(solid.colors.iter().all(|c| *c == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_batch_keeps_order_and_errors() {
        let good = parcel([1, 1, 1], &[0; 8]);
        let mut bad = good.clone();
        bad.voxels = "@@@".to_string();

        let results = Mesher::new().mesh_parcels(&[good, bad]);
        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap().is_empty());
        assert!(results[1].is_err());
    }
}
