//! Single-shot AES-256-GCM with detached tags
//!
//! Ciphertext length always equals plaintext length; the 16-byte tag travels
//! separately so each container layer can lay out `nonce || ciphertext || tag`
//! itself.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use rand::{CryptoRng, RngCore};
use sealstream_core::layout::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use sealstream_core::{SealError, SealResult};

/// Tag verification failed. No plaintext is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unable to authenticate data")]
pub struct AuthenticationFailure;

/// Draw a fresh 96-bit nonce.
pub fn generate_nonce<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` and return `(ciphertext, tag)`.
pub fn seal(
    plaintext: &[u8],
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
) -> SealResult<(Vec<u8>, [u8; TAG_SIZE])> {
    let cipher = Aes256Gcm::new(key.into());
    let mut buffer = plaintext.to_vec();

    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce), aad, &mut buffer)
        .map_err(|e| SealError::Internal(format!("AES-GCM encryption failed: {e}")))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);
    Ok((buffer, tag_bytes))
}

/// Verify `tag` over `ciphertext` and `aad`, then decrypt.
///
/// The tag is checked before any keystream is applied, so a failure never
/// yields partial plaintext.
pub fn open(
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
) -> Result<Vec<u8>, AuthenticationFailure> {
    let cipher = Aes256Gcm::new(key.into());
    let mut buffer = ciphertext.to_vec();

    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            aad,
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| AuthenticationFailure)?;

    Ok(buffer)
}
