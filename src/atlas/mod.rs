//! Texture atlas addressing.
//!
//! The atlas texture itself is an external asset; this module only maps voxel
//! codes onto its fixed grid of tiles.

mod layout;

pub use layout::{AtlasLayout, AtlasRegion, FULL_QUAD_UVS};
