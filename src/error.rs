//! Error types for parcel decoding and meshing.

use thiserror::Error;

/// Result type alias using MesherError.
pub type Result<T> = std::result::Result<T, MesherError>;

/// Failure while turning an encoded voxel payload into voxel codes.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The zlib stream is corrupt or has a bad header.
    #[error("corrupt zlib stream: {0}")]
    Inflate(#[from] flate2::DecompressError),

    /// The zlib stream ended before its end marker.
    #[error("truncated zlib stream after {produced} bytes of output")]
    TruncatedStream { produced: usize },

    /// Decompressed payload cannot be split into 16-bit voxel codes.
    #[error("decompressed payload has odd length {len}")]
    OddLength { len: usize },

    /// The requested capacity cannot be expressed in bytes.
    #[error("capacity of {capacity} voxel codes is too large")]
    CapacityTooLarge { capacity: usize },

    /// Decompressed payload size does not match the declared parcel size (strict policy).
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Main error type for parcel meshing operations.
#[derive(Error, Debug)]
pub enum MesherError {
    /// The voxel payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parcel bounding box has an axis with max < min.
    #[error("Invalid parcel bounds: {0}")]
    InvalidBounds(String),

    /// Explicit voxel buffer does not match the grid dimensions.
    #[error("Grid size mismatch: expected {expected} voxels, got {actual}")]
    GridSize { expected: usize, actual: usize },

    /// Grid dimensions exceed the supported cell count.
    #[error("Grid {dims:?} is too large")]
    GridTooLarge { dims: [usize; 3] },

    /// A palette entry could not be parsed.
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),
}
