//! Filename sealing and the identifier token
//!
//! The filename is encrypted under a fresh per-file name key with the context
//! id as AAD. Only `nonce || tag` is written to the container; the ciphertext
//! is handed out as a base64url token that doubles as the storage key and as
//! the AAD anchor for the header and every chunk.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{CryptoRng, RngCore};

use sealstream_core::layout::{FILENAME_PREFIX_SIZE, NONCE_SIZE, TAG_SIZE};
use sealstream_core::{SealError, SealResult, Segment};

use crate::aead;
use crate::keys::NameKey;

/// base64url (unpadded) filename ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierToken(String);

impl IdentifierToken {
    pub fn from_ciphertext(ciphertext: &[u8]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(ciphertext))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw filename ciphertext, used as the AAD anchor.
    pub fn decode(&self) -> SealResult<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|e| SealError::InvalidContainerFormat(format!("identifier token: {e}")))
    }
}

impl From<String> for IdentifierToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdentifierToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for IdentifierToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of [`seal_filename`].
#[derive(Debug, Clone)]
pub struct SealedFilename {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl SealedFilename {
    /// The bytes written at the start of the container: `nonce || tag`.
    pub fn prefix(&self) -> [u8; FILENAME_PREFIX_SIZE] {
        let mut prefix = [0u8; FILENAME_PREFIX_SIZE];
        prefix[..NONCE_SIZE].copy_from_slice(&self.nonce);
        prefix[NONCE_SIZE..].copy_from_slice(&self.tag);
        prefix
    }

    pub fn identifier(&self) -> IdentifierToken {
        IdentifierToken::from_ciphertext(&self.ciphertext)
    }
}

/// Encrypt `filename` under `name_key`, bound to `context_id`.
pub fn seal_filename<R: RngCore + CryptoRng>(
    filename: &str,
    name_key: &NameKey,
    context_id: &[u8],
    rng: &mut R,
) -> SealResult<SealedFilename> {
    let nonce = aead::generate_nonce(rng);
    let (ciphertext, tag) = aead::seal(filename.as_bytes(), name_key.as_bytes(), &nonce, context_id)?;
    Ok(SealedFilename {
        nonce,
        ciphertext,
        tag,
    })
}

/// Split a container prefix into `(nonce, tag)`.
pub fn split_prefix(prefix: &[u8; FILENAME_PREFIX_SIZE]) -> ([u8; NONCE_SIZE], [u8; TAG_SIZE]) {
    let mut nonce = [0u8; NONCE_SIZE];
    let mut tag = [0u8; TAG_SIZE];
    nonce.copy_from_slice(&prefix[..NONCE_SIZE]);
    tag.copy_from_slice(&prefix[NONCE_SIZE..]);
    (nonce, tag)
}

/// Verify and decrypt a filename. Fails if the ciphertext, nonce, tag, key,
/// or context id differ from what was sealed.
pub fn open_filename(
    ciphertext: &[u8],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    name_key: &NameKey,
    context_id: &[u8],
) -> SealResult<String> {
    let plaintext = aead::open(ciphertext, tag, name_key.as_bytes(), nonce, context_id).map_err(
        |_| SealError::Authentication {
            segment: Segment::Filename,
        },
    )?;

    String::from_utf8(plaintext)
        .map_err(|e| SealError::InvalidContainerFormat(format!("filename is not UTF-8: {e}")))
}
