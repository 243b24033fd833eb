//! Container byte layout
//!
//! ```text
//! [12 nonce][16 tag]                          filename prefix (ciphertext travels as the identifier token)
//! [12 nonce][40 ciphertext][16 tag]           header: 0xFF x 8 marker || content key
//! [12 nonce][len ciphertext][16 tag] ...      one record per plaintext chunk
//! ```
//!
//! All integers are big-endian.

use crate::error::{SealError, SealResult};

/// Size of every symmetric key (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag (128-bit)
pub const TAG_SIZE: usize = 16;

/// Per-record framing overhead: nonce + tag
pub const RECORD_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Header marker, checked after the header authenticates
pub const HEADER_MARKER: [u8; 8] = [0xFF; 8];

/// Header plaintext: marker || content key
pub const HEADER_PLAINTEXT_SIZE: usize = HEADER_MARKER.len() + KEY_SIZE;

pub const FILENAME_PREFIX_SIZE: usize = NONCE_SIZE + TAG_SIZE;

pub const HEADER_SIZE: usize = NONCE_SIZE + HEADER_PLAINTEXT_SIZE + TAG_SIZE;

/// Size of the chunk-index suffix appended to AAD
pub const INDEX_SIZE: usize = 4;

/// Number of chunk records for a plaintext of `filesize` bytes: `ceil(filesize / chunk_size)`.
///
/// Fails when the count does not fit the 32-bit index carried in the AAD.
pub fn chunk_count(filesize: u64, chunk_size: usize) -> SealResult<u32> {
    if chunk_size == 0 {
        return Err(SealError::Internal("chunk size must be non-zero".into()));
    }
    let count = filesize.div_ceil(chunk_size as u64);
    u32::try_from(count).map_err(|_| {
        SealError::Internal(format!(
            "{filesize} bytes at chunk size {chunk_size} needs {count} chunks (max {})",
            u32::MAX
        ))
    })
}

/// Exact encrypted length of a container holding `filesize` plaintext bytes.
pub fn container_size(filesize: u64, chunk_size: usize) -> u64 {
    let chunks = if chunk_size == 0 {
        0
    } else {
        filesize.div_ceil(chunk_size as u64)
    };
    (FILENAME_PREFIX_SIZE + HEADER_SIZE) as u64 + filesize + chunks * RECORD_OVERHEAD as u64
}

/// Length of chunk `index` (0-based) for a plaintext of `filesize` bytes.
pub fn chunk_len(filesize: u64, chunk_size: usize, index: u32) -> usize {
    let start = u64::from(index) * chunk_size as u64;
    filesize.saturating_sub(start).min(chunk_size as u64) as usize
}
