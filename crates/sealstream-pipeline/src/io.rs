use tokio::io::{AsyncRead, AsyncReadExt};

/// Read until `buf` is full or the source is exhausted, accumulating short
/// reads. Returns the number of bytes read; less than `buf.len()` means EOF.
pub(crate) async fn read_full<R: AsyncRead + Unpin>(
    source: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
