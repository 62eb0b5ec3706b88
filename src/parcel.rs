//! Parcel metadata as delivered by the parcel API.
//!
//! Only the fields the mesher needs are modelled; anything else in the JSON
//! (features, owner, etc.) is ignored.

use crate::error::Result;
use crate::types::ParcelBounds;
use serde::{Deserialize, Serialize};

/// One parcel: its integer bounding box and encoded voxel payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelDescription {
    pub id: i64,
    pub x1: i32,
    pub x2: i32,
    pub y1: i32,
    pub y2: i32,
    pub z1: i32,
    pub z2: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Base64 of a zlib stream of little-endian `u16` voxel codes.
    pub voxels: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileset: Option<String>,
}

impl ParcelDescription {
    /// Validated bounding box.
    pub fn bounds(&self) -> Result<ParcelBounds> {
        ParcelBounds::new([self.x1, self.y1, self.z1], [self.x2, self.y2, self.z2])
    }

    /// Display name, falling back to the numeric id.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.id.to_string(),
        }
    }
}

/// A batch of parcels, as returned by the grid endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelsContainer {
    pub parcels: Vec<ParcelDescription>,
}

/// Parse JSON holding either a single parcel or a `{"parcels": [...]}` container.
pub fn parse_parcels(json: &str) -> Result<Vec<ParcelDescription>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Input {
        Container(ParcelsContainer),
        Single(ParcelDescription),
    }

    let parcels = match serde_json::from_str::<Input>(json)? {
        Input::Container(container) => container.parcels,
        Input::Single(parcel) => vec![parcel],
    };
    Ok(parcels)
}
