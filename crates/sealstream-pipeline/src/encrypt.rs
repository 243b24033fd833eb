//! Encrypt driver
//!
//! Writes `filename prefix || header || chunk records` to the sink, awaiting
//! each write before the next chunk is read.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use zeroize::Zeroizing;

use sealstream_core::layout;
use sealstream_core::{SealResult, StreamConfig};
use sealstream_crypto::{
    seal_filename, seal_header, ChunkCodec, ContentKey, IdentifierToken, MasterKey, NameKey,
};

use crate::io::read_full;
use crate::progress::{ProgressFn, ProgressTracker};

/// Result of a successful encrypt call.
///
/// `name_key` is the only way to recover the filename later; its custody
/// passes to the caller. The content key never leaves the call.
#[derive(Debug)]
pub struct EncryptedFile {
    pub identifier: IdentifierToken,
    pub name_key: NameKey,
    pub chunks: u32,
    pub bytes_written: u64,
}

/// Encrypt `filesize` bytes from `source` into `sink` using OS randomness.
#[allow(clippy::too_many_arguments)]
pub async fn encrypt<R, W>(
    source: R,
    sink: W,
    filename: &str,
    filesize: u64,
    master_key: &MasterKey,
    context_id: &[u8],
    config: &StreamConfig,
    progress: Option<&ProgressFn>,
) -> SealResult<EncryptedFile>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    encrypt_with_rng(
        source,
        sink,
        filename,
        filesize,
        master_key,
        context_id,
        config,
        progress,
        &mut OsRng,
    )
    .await
}

/// Encrypt with an explicit source of randomness for keys and nonces.
///
/// Exactly `filesize` bytes are read from the source. Running short is an
/// `UnexpectedEof` I/O error that leaves the sink unfinalized; bytes past
/// `filesize` are never read, so a source that stays open after delivering
/// them does not stall the call.
///
/// Progress reaches `100.0` only once the sink has been shut down.
#[allow(clippy::too_many_arguments)]
pub async fn encrypt_with_rng<R, W, G>(
    mut source: R,
    mut sink: W,
    filename: &str,
    filesize: u64,
    master_key: &MasterKey,
    context_id: &[u8],
    config: &StreamConfig,
    progress: Option<&ProgressFn>,
    rng: &mut G,
) -> SealResult<EncryptedFile>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    G: RngCore + CryptoRng,
{
    config.validate()?;
    let chunk_size = config.chunk_size;
    let chunk_count = layout::chunk_count(filesize, chunk_size)?;
    let total = layout::container_size(filesize, chunk_size);

    let mut tracker = ProgressTracker::new(progress, total);
    tracker.start();
    debug!(filesize, chunk_size, chunk_count, total, "encrypt: starting");

    let name_key = NameKey::generate(rng);
    let content_key = ContentKey::generate(rng);

    let sealed_name = seal_filename(filename, &name_key, context_id, rng)?;
    write_segment(&mut sink, &sealed_name.prefix(), &mut tracker).await?;
    let anchor = sealed_name.ciphertext.as_slice();

    let header = seal_header(&content_key, master_key, chunk_count, anchor, rng)?;
    write_segment(&mut sink, &header.to_bytes(), &mut tracker).await?;

    let mut codec = ChunkCodec::new(&content_key, anchor);
    let longest = chunk_size.min(usize::try_from(filesize).unwrap_or(usize::MAX));
    let mut buffer = Zeroizing::new(vec![0u8; longest]);
    let mut position = 0u64;

    while position < filesize {
        let want = layout::chunk_len(filesize, chunk_size, codec.index());
        let got = read_full(&mut source, &mut buffer[..want]).await?;
        if got < want {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "source ended after {} of {filesize} declared bytes",
                    position + got as u64
                ),
            )
            .into());
        }

        let record = codec.seal_next(&buffer[..want], rng)?;
        write_segment(&mut sink, &record, &mut tracker).await?;
        position += want as u64;
    }

    drop(source);

    sink.shutdown().await?;
    tracker.finish();

    let identifier = sealed_name.identifier();
    info!(
        identifier = %identifier,
        chunks = chunk_count,
        bytes = filesize,
        written = tracker.done(),
        "encrypted"
    );

    Ok(EncryptedFile {
        identifier,
        name_key,
        chunks: chunk_count,
        bytes_written: tracker.done(),
    })
}

async fn write_segment<W: AsyncWrite + Unpin>(
    sink: &mut W,
    bytes: &[u8],
    tracker: &mut ProgressTracker<'_>,
) -> SealResult<()> {
    sink.write_all(bytes).await?;
    tracker.advance(bytes.len() as u64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealstream_core::layout::KEY_SIZE;
    use sealstream_core::SealError;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    fn master() -> MasterKey {
        MasterKey::from_bytes([42u8; KEY_SIZE])
    }

    #[tokio::test]
    async fn test_output_length_matches_layout() {
        let config = StreamConfig::with_chunk_size(64);
        let data = vec![7u8; 200];
        let mut out = Vec::new();

        let result = encrypt(&data[..], &mut out, "a.bin", 200, &master(), b"ctx", &config, None)
            .await
            .unwrap();

        assert_eq!(out.len() as u64, layout::container_size(200, 64));
        assert_eq!(result.bytes_written, out.len() as u64);
        assert_eq!(result.chunks, 4);
    }

    #[tokio::test]
    async fn test_empty_source_has_no_chunks() {
        let config = StreamConfig::with_chunk_size(64);
        let mut out = Vec::new();

        let result = encrypt(&b""[..], &mut out, "empty", 0, &master(), b"ctx", &config, None)
            .await
            .unwrap();

        assert_eq!(result.chunks, 0);
        assert_eq!(out.len(), layout::FILENAME_PREFIX_SIZE + layout::HEADER_SIZE);
    }

    #[tokio::test]
    async fn test_short_source_is_unexpected_eof() {
        let config = StreamConfig::with_chunk_size(64);
        let data = vec![1u8; 100];
        let mut out = Vec::new();

        let err = encrypt(&data[..], &mut out, "f", 150, &master(), b"ctx", &config, None)
            .await
            .unwrap_err();

        match err {
            SealError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reads_no_further_than_filesize() {
        let config = StreamConfig::with_chunk_size(64);
        let data = vec![1u8; 100];
        let mut out = Vec::new();

        let result = encrypt(&data[..], &mut out, "f", 99, &master(), b"ctx", &config, None)
            .await
            .unwrap();
        assert_eq!(result.chunks, 2);
        assert_eq!(out.len() as u64, layout::container_size(99, 64));
    }

    #[tokio::test]
    async fn test_open_source_does_not_stall() {
        let config = StreamConfig::with_chunk_size(64);
        let (mut writer, reader) = tokio::io::duplex(256);
        writer.write_all(&[3u8; 69]).await.unwrap();
        let mut out = Vec::new();

        // `writer` stays alive, so the source never reports EOF.
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            encrypt(reader, &mut out, "f", 69, &master(), b"ctx", &config, None),
        )
        .await
        .expect("encrypt must finish once filesize bytes are read")
        .unwrap();

        assert_eq!(result.chunks, 2);
        assert_eq!(out.len() as u64, layout::container_size(69, 64));
        drop(writer);
    }

    /// Accepts writes, fails on shutdown.
    struct UnclosableSink(Vec<u8>);

    impl AsyncWrite for UnclosableSink {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            self.0.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }
    }

    #[tokio::test]
    async fn test_failed_finalize_never_reports_hundred() {
        let config = StreamConfig::with_chunk_size(64);
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&log);
        let cb: ProgressFn = Box::new(move |p| recorder.lock().unwrap().push(p));
        let data = vec![5u8; 100];

        let err = encrypt(
            &data[..],
            UnclosableSink(Vec::new()),
            "f",
            100,
            &master(),
            b"ctx",
            &config,
            Some(&cb),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SealError::Io(_)));
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 4, "start plus three writes: {log:?}");
        assert!(log.iter().all(|p| *p < 100.0), "got {log:?}");
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = StreamConfig::with_chunk_size(0);
        let mut out = Vec::new();

        let err = encrypt(&b"x"[..], &mut out, "f", 1, &master(), b"ctx", &config, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SealError::Config(_)));
        assert!(out.is_empty());
    }
}
