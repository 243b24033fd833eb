//! Decrypt driver
//!
//! Verifies the filename prefix, unwraps the content key from the header, then
//! opens chunk records strictly in order. The first failure aborts the call;
//! plaintext already written to the sink is not retracted.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use sealstream_core::layout::{self, FILENAME_PREFIX_SIZE, HEADER_SIZE, RECORD_OVERHEAD};
use sealstream_core::{SealError, SealResult, StreamConfig};
use sealstream_crypto::{
    open_filename, open_header, split_prefix, ChunkCodec, IdentifierToken, MasterKey, NameKey,
    SealedHeader,
};

use crate::io::read_full;
use crate::progress::{ProgressFn, ProgressTracker};

/// Result of a successful decrypt call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedFile {
    pub filename: String,
    pub chunks: u32,
    pub bytes: u64,
}

/// Decrypt a container from `source`, writing plaintext to `sink`.
///
/// `filesize` is the plaintext size given to encrypt. The chunk count it
/// implies is bound into the header, so a wrong size fails header
/// authentication, and a container holding more or fewer chunks than the
/// header declares fails with [`SealError::TruncationOrExtension`].
///
/// Each record is read at exactly the length its index implies, so bytes
/// appended after the last record never merge into it.
///
/// Progress counts verified chunks: `0.0` first, exactly `100.0` at the end.
#[allow(clippy::too_many_arguments)]
pub async fn decrypt<R, W>(
    source: R,
    sink: W,
    identifier: &IdentifierToken,
    filesize: u64,
    master_key: &MasterKey,
    context_id: &[u8],
    name_key: &NameKey,
    config: &StreamConfig,
    progress: Option<&ProgressFn>,
) -> SealResult<DecryptedFile>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    open_container(
        source,
        sink,
        identifier,
        filesize,
        master_key,
        context_id,
        name_key,
        config,
        progress,
    )
    .await
    .inspect_err(|e| log_failure(identifier, e))
}

#[allow(clippy::too_many_arguments)]
async fn open_container<R, W>(
    mut source: R,
    mut sink: W,
    identifier: &IdentifierToken,
    filesize: u64,
    master_key: &MasterKey,
    context_id: &[u8],
    name_key: &NameKey,
    config: &StreamConfig,
    progress: Option<&ProgressFn>,
) -> SealResult<DecryptedFile>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    config.validate()?;
    let anchor = identifier.decode()?;
    let expected_chunks = layout::chunk_count(filesize, config.chunk_size)?;

    let mut tracker = ProgressTracker::new(progress, u64::from(expected_chunks));
    tracker.start();
    debug!(identifier = %identifier, expected_chunks, "decrypt: starting");

    let mut prefix = [0u8; FILENAME_PREFIX_SIZE];
    read_segment(&mut source, &mut prefix, "filename prefix").await?;
    let (nonce, tag) = split_prefix(&prefix);
    let filename = open_filename(&anchor, &nonce, &tag, name_key, context_id)?;

    let mut header = [0u8; HEADER_SIZE];
    read_segment(&mut source, &mut header, "header").await?;
    let unsealed = open_header(
        &SealedHeader::from_bytes(&header),
        master_key,
        expected_chunks,
        &anchor,
    )?;
    let declared = unsealed.chunk_count;

    let mut codec = ChunkCodec::new(&unsealed.content_key, &anchor);
    let longest = config.chunk_size.min(usize::try_from(filesize).unwrap_or(usize::MAX));
    let mut record = vec![0u8; longest + RECORD_OVERHEAD];
    let mut bytes = 0u64;

    while codec.index() < declared {
        let index = codec.index();
        let want = layout::chunk_len(filesize, config.chunk_size, index) + RECORD_OVERHEAD;
        let n = read_full(&mut source, &mut record[..want]).await?;
        if n == 0 {
            return Err(SealError::TruncationOrExtension {
                declared,
                actual: index,
            });
        }
        if n < want {
            return Err(SealError::InvalidContainerFormat(format!(
                "chunk record {index} is {n} of {want} bytes"
            )));
        }

        let plaintext = codec.open_next(&record[..want])?;
        sink.write_all(&plaintext).await?;
        bytes += plaintext.len() as u64;
        tracker.advance(1);
    }

    let mut trailing = [0u8; 1];
    if source.read(&mut trailing).await? != 0 {
        return Err(SealError::TruncationOrExtension {
            declared,
            actual: declared.saturating_add(1),
        });
    }

    sink.shutdown().await?;
    tracker.finish();

    info!(identifier = %identifier, chunks = declared, bytes, "decrypted");

    Ok(DecryptedFile {
        filename,
        chunks: declared,
        bytes,
    })
}

fn log_failure(identifier: &IdentifierToken, err: &SealError) {
    if err.is_integrity_failure() {
        warn!(identifier = %identifier, error = %err, "container rejected");
    } else {
        debug!(identifier = %identifier, error = %err, "decrypt failed");
    }
}

async fn read_segment<R: AsyncRead + Unpin>(
    source: &mut R,
    buf: &mut [u8],
    what: &str,
) -> SealResult<()> {
    let n = read_full(source, buf).await?;
    if n < buf.len() {
        return Err(SealError::InvalidContainerFormat(format!(
            "container too short for {what}: {n} of {} bytes",
            buf.len()
        )));
    }
    Ok(())
}
