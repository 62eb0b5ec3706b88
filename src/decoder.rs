//! Voxel payload decoding.
//!
//! A parcel payload is base64 text wrapping a zlib (RFC 1950) stream whose
//! contents are little-endian `u16` voxel codes, x-major with z varying fastest.

use crate::error::{DecodeError, Result};
use crate::types::{VoxelCode, AIR};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Size of the scratch buffer each inflate call writes into.
pub const SCRATCH_SIZE: usize = 1024;

/// Bytes per voxel code in the payload.
pub const CODE_WIDTH: usize = std::mem::size_of::<VoxelCode>();

/// What to do when the decompressed payload is not exactly the declared size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePolicy {
    /// Copy `min(payload, capacity)` codes; missing codes stay air, extra codes are dropped.
    #[default]
    Truncate,
    /// Reject any mismatch with [`DecodeError::SizeMismatch`].
    Strict,
}

/// Decode a base64 zlib payload into exactly `capacity` voxel codes.
///
/// A decompressed length that is not a whole number of codes is always an error.
pub fn decode(
    encoded: &str,
    capacity: usize,
    policy: SizePolicy,
) -> std::result::Result<Vec<VoxelCode>, DecodeError> {
    let compressed = STANDARD.decode(encoded.trim())?;
    let bytes = inflate(&compressed)?;

    if bytes.len() % CODE_WIDTH != 0 {
        return Err(DecodeError::OddLength { len: bytes.len() });
    }

    let expected = capacity
        .checked_mul(CODE_WIDTH)
        .ok_or(DecodeError::CapacityTooLarge { capacity })?;
    if bytes.len() != expected {
        if policy == SizePolicy::Strict {
            return Err(DecodeError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        log::warn!(
            "voxel payload is {} bytes but the parcel holds {} bytes, truncating",
            bytes.len(),
            expected
        );
    }

    let mut voxels = vec![AIR; capacity];
    copy_codes(&bytes, &mut voxels);
    log::debug!(
        "decoded {} compressed bytes into {} voxel codes",
        compressed.len(),
        capacity
    );
    Ok(voxels)
}

/// Copy `min(src.len(), dst.len() * 2)` bytes of little-endian codes into `dst`.
fn copy_codes(src: &[u8], dst: &mut [VoxelCode]) {
    let len = src.len().min(dst.len() * CODE_WIDTH);
    for (slot, pair) in dst.iter_mut().zip(src[..len].chunks_exact(CODE_WIDTH)) {
        *slot = VoxelCode::from_le_bytes([pair[0], pair[1]]);
    }
}

/// Inflate a zlib stream with header validation.
///
/// Runs two passes over a fixed scratch buffer: a `None` flush pass that pumps
/// all input through, then a `Finish` pass that drains whatever the stream still
/// holds. The stream must reach its end marker.
pub fn inflate(compressed: &[u8]) -> std::result::Result<Vec<u8>, DecodeError> {
    let mut inflater = Decompress::new(true);
    let mut scratch = [0u8; SCRATCH_SIZE];
    let mut output = Vec::with_capacity(compressed.len().saturating_mul(4));
    let mut ended = false;

    for flush in [FlushDecompress::None, FlushDecompress::Finish] {
        loop {
            let in_before = inflater.total_in();
            let out_before = inflater.total_out();
            let status = inflater.decompress(&compressed[in_before as usize..], &mut scratch, flush)?;
            let consumed = (inflater.total_in() - in_before) as usize;
            let produced = (inflater.total_out() - out_before) as usize;
            output.extend_from_slice(&scratch[..produced]);

            if status == Status::StreamEnd {
                ended = true;
                break;
            }
            if consumed == 0 && produced == 0 {
                break;
            }

            let input_left = compressed.len() - inflater.total_in() as usize;
            let more = match flush {
                FlushDecompress::Finish => produced != 0,
                _ => input_left != 0 || produced == SCRATCH_SIZE,
            };
            if !more {
                break;
            }
        }
        if ended {
            break;
        }
    }

    if !ended {
        return Err(DecodeError::TruncatedStream {
            produced: output.len(),
        });
    }
    Ok(output)
}

/// Encode voxel codes into the payload format (the inverse of [`decode`]).
pub fn encode_voxels(voxels: &[VoxelCode]) -> Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for code in voxels {
        encoder.write_all(&code.to_le_bytes())?;
    }
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}
