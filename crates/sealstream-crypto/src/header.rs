//! Content-key wrapping
//!
//! Header plaintext is `0xFF x 8 || content_key`, sealed under the master key
//! with `AAD = filename_ciphertext || chunk_count_be32`. Binding the count
//! means a container cannot lose or gain whole chunks without detection.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use sealstream_core::layout::{
    HEADER_MARKER, HEADER_PLAINTEXT_SIZE, HEADER_SIZE, KEY_SIZE, NONCE_SIZE, TAG_SIZE,
};
use sealstream_core::{SealError, SealResult, Segment};

use crate::aad::build_aad;
use crate::aead;
use crate::keys::{ContentKey, MasterKey};

/// `nonce || ciphertext || tag`, always [`HEADER_SIZE`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedHeader {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: [u8; HEADER_PLAINTEXT_SIZE],
    pub tag: [u8; TAG_SIZE],
}

impl SealedHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..NONCE_SIZE].copy_from_slice(&self.nonce);
        out[NONCE_SIZE..NONCE_SIZE + HEADER_PLAINTEXT_SIZE].copy_from_slice(&self.ciphertext);
        out[NONCE_SIZE + HEADER_PLAINTEXT_SIZE..].copy_from_slice(&self.tag);
        out
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut nonce = [0u8; NONCE_SIZE];
        let mut ciphertext = [0u8; HEADER_PLAINTEXT_SIZE];
        let mut tag = [0u8; TAG_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        ciphertext.copy_from_slice(&bytes[NONCE_SIZE..NONCE_SIZE + HEADER_PLAINTEXT_SIZE]);
        tag.copy_from_slice(&bytes[NONCE_SIZE + HEADER_PLAINTEXT_SIZE..]);
        Self {
            nonce,
            ciphertext,
            tag,
        }
    }
}

/// Recovered header contents.
#[derive(Debug)]
pub struct UnsealedHeader {
    pub content_key: ContentKey,
    pub chunk_count: u32,
}

/// Wrap `content_key` under `master_key`, bound to `anchor` and `chunk_count`.
pub fn seal_header<R: RngCore + CryptoRng>(
    content_key: &ContentKey,
    master_key: &MasterKey,
    chunk_count: u32,
    anchor: &[u8],
    rng: &mut R,
) -> SealResult<SealedHeader> {
    let mut plaintext = Zeroizing::new([0u8; HEADER_PLAINTEXT_SIZE]);
    plaintext[..HEADER_MARKER.len()].copy_from_slice(&HEADER_MARKER);
    plaintext[HEADER_MARKER.len()..].copy_from_slice(content_key.as_bytes());

    let nonce = aead::generate_nonce(rng);
    let aad = build_aad(anchor, chunk_count);
    let (ciphertext, tag) = aead::seal(&plaintext[..], master_key.as_bytes(), &nonce, &aad)?;

    let ciphertext: [u8; HEADER_PLAINTEXT_SIZE] = ciphertext
        .try_into()
        .map_err(|_| SealError::Internal("sealed header has wrong length".into()))?;

    Ok(SealedHeader {
        nonce,
        ciphertext,
        tag,
    })
}

/// Unwrap the content key. `chunk_count` is the count the caller expects the
/// container to hold; any other value fails authentication.
pub fn open_header(
    sealed: &SealedHeader,
    master_key: &MasterKey,
    chunk_count: u32,
    anchor: &[u8],
) -> SealResult<UnsealedHeader> {
    let aad = build_aad(anchor, chunk_count);
    let plaintext = Zeroizing::new(
        aead::open(
            &sealed.ciphertext,
            &sealed.tag,
            master_key.as_bytes(),
            &sealed.nonce,
            &aad,
        )
        .map_err(|_| SealError::Authentication {
            segment: Segment::Header,
        })?,
    );

    if plaintext.len() != HEADER_PLAINTEXT_SIZE || plaintext[..HEADER_MARKER.len()] != HEADER_MARKER
    {
        tracing::warn!("header authenticated but carries an unknown marker");
        return Err(SealError::InvalidContainerFormat(
            "header marker mismatch".into(),
        ));
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&plaintext[HEADER_MARKER.len()..]);
    let content_key = ContentKey::from_bytes(key);
    zeroize::Zeroize::zeroize(&mut key);

    Ok(UnsealedHeader {
        content_key,
        chunk_count,
    })
}
