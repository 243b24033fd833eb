//! Per-chunk AES-256-GCM sealing/opening
//!
//! Sealed chunk record (binary):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! AAD = filename_ciphertext || chunk_index (4 bytes, big-endian)
//! ```
//!
//! The AAD binds each chunk to its position and to its file, preventing
//! reordering, duplication, and cross-file substitution.

use rand::{CryptoRng, RngCore};

use sealstream_core::layout::{NONCE_SIZE, RECORD_OVERHEAD, TAG_SIZE};
use sealstream_core::{SealError, SealResult, Segment};

use crate::aad::ChunkAad;
use crate::aead;
use crate::keys::ContentKey;

/// Seal chunk `index` of the file identified by `anchor`.
///
/// Returns: `[12-byte nonce][ciphertext][16-byte tag]`
pub fn seal_chunk<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    content_key: &ContentKey,
    anchor: &[u8],
    index: u32,
    rng: &mut R,
) -> SealResult<Vec<u8>> {
    let aad = ChunkAad::for_index(anchor, index);
    seal_record(plaintext, content_key, aad.as_bytes(), rng)
}

/// Verify and open chunk `index` of the file identified by `anchor`.
pub fn open_chunk(
    record: &[u8],
    content_key: &ContentKey,
    anchor: &[u8],
    index: u32,
) -> SealResult<Vec<u8>> {
    let aad = ChunkAad::for_index(anchor, index);
    open_record(record, content_key, aad.as_bytes(), index)
}

/// Sequential codec for one file: seals or opens chunks in stream order,
/// advancing the index AAD after every chunk.
#[derive(Debug)]
pub struct ChunkCodec<'k> {
    content_key: &'k ContentKey,
    aad: ChunkAad,
}

impl<'k> ChunkCodec<'k> {
    pub fn new(content_key: &'k ContentKey, anchor: &[u8]) -> Self {
        Self {
            content_key,
            aad: ChunkAad::new(anchor),
        }
    }

    /// Index of the next chunk to be sealed or opened.
    pub fn index(&self) -> u32 {
        self.aad.index()
    }

    pub fn seal_next<R: RngCore + CryptoRng>(
        &mut self,
        plaintext: &[u8],
        rng: &mut R,
    ) -> SealResult<Vec<u8>> {
        let record = seal_record(plaintext, self.content_key, self.aad.as_bytes(), rng)?;
        self.aad.advance()?;
        Ok(record)
    }

    /// Open the next record. The index only advances on success.
    pub fn open_next(&mut self, record: &[u8]) -> SealResult<Vec<u8>> {
        let plaintext = open_record(record, self.content_key, self.aad.as_bytes(), self.index())?;
        self.aad.advance()?;
        Ok(plaintext)
    }
}

fn seal_record<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    content_key: &ContentKey,
    aad: &[u8],
    rng: &mut R,
) -> SealResult<Vec<u8>> {
    let nonce = aead::generate_nonce(rng);
    let (ciphertext, tag) = aead::seal(plaintext, content_key.as_bytes(), &nonce, aad)?;

    let mut record = Vec::with_capacity(RECORD_OVERHEAD + ciphertext.len());
    record.extend_from_slice(&nonce);
    record.extend_from_slice(&ciphertext);
    record.extend_from_slice(&tag);
    Ok(record)
}

fn open_record(
    record: &[u8],
    content_key: &ContentKey,
    aad: &[u8],
    index: u32,
) -> SealResult<Vec<u8>> {
    if record.len() < RECORD_OVERHEAD {
        return Err(SealError::InvalidContainerFormat(format!(
            "chunk {index} too short: {} bytes (minimum {RECORD_OVERHEAD})",
            record.len()
        )));
    }

    let (nonce, rest) = record.split_at(NONCE_SIZE);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    nonce_bytes.copy_from_slice(nonce);
    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag);

    aead::open(ciphertext, &tag_bytes, content_key.as_bytes(), &nonce_bytes, aad).map_err(|_| {
        SealError::Authentication {
            segment: Segment::Chunk(index),
        }
    })
}
