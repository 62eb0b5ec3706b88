//! Palette colours for voxel faces.
//!
//! Each code selects a palette slot in steps of [`PALETTE_STRIDE`]; the high
//! flag bit is ignored for colour purposes.

use crate::error::{MesherError, Result};
use crate::types::VoxelCode;
use serde::{Deserialize, Serialize};

/// Codes per palette slot.
pub const PALETTE_STRIDE: u32 = 32;

/// Flag bit stripped before palette lookup.
pub const HIGH_FLAG: VoxelCode = 0x8000;

/// Colour for faces whose code resolves outside the palette.
pub const UNKNOWN_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// Colour for plain (unpalettised) codes.
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// The stock 8-entry palette.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#ffffff", "#888888", "#000000", "#ff71ce", "#01cdfe", "#05ffa1", "#b967ff", "#fffb96",
];

/// Result of resolving a code against the palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaletteColor {
    /// Code carries no palette selection.
    Plain,
    /// A palette entry.
    Entry(usize, [f32; 4]),
    /// The selected slot is past the end of the palette.
    OutOfRange(usize),
}

impl PaletteColor {
    pub fn rgba(&self) -> [f32; 4] {
        match self {
            PaletteColor::Plain => WHITE,
            PaletteColor::Entry(_, color) => *color,
            PaletteColor::OutOfRange(_) => UNKNOWN_COLOR,
        }
    }
}

/// A table of RGBA colours indexed by `code / 32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: Vec<[f32; 4]>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .map(|hex| parse_hex(hex).unwrap_or(UNKNOWN_COLOR))
                .collect(),
        }
    }
}

impl Palette {
    /// Build a palette from `#rrggbb` strings.
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let colors = entries
            .iter()
            .map(|hex| parse_hex(hex.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Resolve a code to a palette slot.
    pub fn lookup(&self, code: VoxelCode) -> PaletteColor {
        let value = (code & !HIGH_FLAG) as u32;
        if value <= PALETTE_STRIDE {
            return PaletteColor::Plain;
        }
        let index = (value / PALETTE_STRIDE) as usize;
        match self.colors.get(index) {
            Some(color) => PaletteColor::Entry(index, *color),
            None => PaletteColor::OutOfRange(index),
        }
    }

    /// Face colour for a code.
    pub fn color(&self, code: VoxelCode) -> [f32; 4] {
        self.lookup(code).rgba()
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = MesherError;

    fn try_from(entries: Vec<String>) -> Result<Self> {
        Palette::from_hex(&entries)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.colors.iter().map(|c| to_hex(*c)).collect()
    }
}

fn parse_hex(hex: &str) -> Result<[f32; 4]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MesherError::InvalidPalette(format!(
            "expected #rrggbb, got '{hex}'"
        )));
    }
    let value = u32::from_str_radix(digits, 16)
        .map_err(|e| MesherError::InvalidPalette(format!("'{hex}': {e}")))?;
    let channel = |shift: u32| ((value >> shift) & 0xff) as f32 / 255.0;
    Ok([channel(16), channel(8), channel(0), 1.0])
}

fn to_hex(color: [f32; 4]) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color[0]),
        channel(color[1]),
        channel(color[2])
    )
}
