#![allow(dead_code)]

use rand::{CryptoRng, RngCore};
use sealstream_core::layout::{FILENAME_PREFIX_SIZE, HEADER_SIZE, RECORD_OVERHEAD};
use sealstream_pipeline::{
    decrypt, encrypt, DecryptedFile, EncryptedFile, IdentifierToken, MasterKey, NameKey,
    SealResult, StreamConfig,
};

pub const CHUNK_SIZE: usize = 64;
pub const CONTEXT: &[u8] = b"account-42";

/// Fills every request of `n` bytes with the byte `n`.
pub struct FilledRng;

impl RngCore for FilledRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_le_bytes([4; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_le_bytes([8; 8])
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let n = dest.len() as u8;
        dest.fill(n);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for FilledRng {}

pub fn master_key() -> MasterKey {
    MasterKey::from_bytes([42u8; 32])
}

pub fn config() -> StreamConfig {
    StreamConfig::with_chunk_size(CHUNK_SIZE)
}

pub fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

pub struct Sealed {
    pub container: Vec<u8>,
    pub file: EncryptedFile,
    pub filesize: u64,
}

pub async fn seal(data: &[u8], filename: &str) -> Sealed {
    let mut container = Vec::new();
    let file = encrypt(
        data,
        &mut container,
        filename,
        data.len() as u64,
        &master_key(),
        CONTEXT,
        &config(),
        None,
    )
    .await
    .expect("encrypt should succeed");

    Sealed {
        container,
        file,
        filesize: data.len() as u64,
    }
}

pub async fn open_with(
    container: &[u8],
    identifier: &IdentifierToken,
    filesize: u64,
    context: &[u8],
    name_key: &NameKey,
    out: &mut Vec<u8>,
) -> SealResult<DecryptedFile> {
    decrypt(
        container,
        out,
        identifier,
        filesize,
        &master_key(),
        context,
        name_key,
        &config(),
        None,
    )
    .await
}

pub async fn open(sealed: &Sealed, container: &[u8], out: &mut Vec<u8>) -> SealResult<DecryptedFile> {
    open_with(
        container,
        &sealed.file.identifier,
        sealed.filesize,
        CONTEXT,
        &sealed.file.name_key,
        out,
    )
    .await
}

/// Byte offset of chunk record `index` (all records before it are full-size).
pub fn record_offset(index: usize) -> usize {
    FILENAME_PREFIX_SIZE + HEADER_SIZE + index * (CHUNK_SIZE + RECORD_OVERHEAD)
}

/// Byte range of chunk record `index` inside a container.
pub fn record_range(container: &[u8], index: usize) -> std::ops::Range<usize> {
    let start = record_offset(index);
    let end = (start + CHUNK_SIZE + RECORD_OVERHEAD).min(container.len());
    start..end
}
