//! Additional authenticated data: `anchor || index (4 bytes, big-endian)`
//!
//! The anchor is the raw filename ciphertext. The header uses the total chunk
//! count as its index, each chunk uses its own position.

use sealstream_core::layout::INDEX_SIZE;
use sealstream_core::{SealError, SealResult};

/// Build `anchor || index_be32`.
pub fn build_aad(anchor: &[u8], index: u32) -> Vec<u8> {
    let mut aad = Vec::with_capacity(anchor.len() + INDEX_SIZE);
    aad.extend_from_slice(anchor);
    aad.extend_from_slice(&index.to_be_bytes());
    aad
}

/// Big-endian increment of `buffer[start..]` with carry propagation.
///
/// Bytes before `start` are left untouched. Returns `None` when the counter
/// region overflows.
pub fn increment_counter_suffix(mut buffer: Vec<u8>, start: usize) -> Option<Vec<u8>> {
    for pos in (start..buffer.len()).rev() {
        let (next, carry) = buffer[pos].overflowing_add(1);
        buffer[pos] = next;
        if !carry {
            return Some(buffer);
        }
    }
    None
}

/// Running chunk AAD, advanced in place as chunks are processed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAad {
    bytes: Vec<u8>,
    counter_start: usize,
    index: u32,
}

impl ChunkAad {
    /// AAD for chunk 0.
    pub fn new(anchor: &[u8]) -> Self {
        Self::for_index(anchor, 0)
    }

    pub fn for_index(anchor: &[u8], index: u32) -> Self {
        Self {
            bytes: build_aad(anchor, index),
            counter_start: anchor.len(),
            index,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Move to the next chunk index.
    pub fn advance(&mut self) -> SealResult<()> {
        let bytes = std::mem::take(&mut self.bytes);
        self.bytes = increment_counter_suffix(bytes, self.counter_start)
            .ok_or_else(|| SealError::Internal("chunk index overflow".into()))?;
        self.index += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_aad_layout() {
        assert_eq!(build_aad(b"ab", 0x01020304), b"ab\x01\x02\x03\x04");
        assert_eq!(build_aad(b"", 0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_increment_carry_vectors() {
        let vectors: [([u8; 5], [u8; 5]); 5] = [
            ([42, 0, 0, 0, 7], [42, 0, 0, 0, 8]),
            ([42, 0, 0, 19, 255], [42, 0, 0, 20, 0]),
            ([42, 0, 4, 255, 255], [42, 0, 5, 0, 0]),
            ([42, 70, 255, 255, 255], [42, 71, 0, 0, 0]),
            ([42, 254, 255, 255, 255], [42, 255, 0, 0, 0]),
        ];

        for (start, target) in vectors {
            let actual = increment_counter_suffix(start.to_vec(), 1).unwrap();
            assert_eq!(actual, target, "from {start:?}");
        }
    }

    #[test]
    fn test_increment_overflow_leaves_prefix_alone() {
        assert_eq!(increment_counter_suffix(vec![42, 255, 255, 255, 255], 1), None);
        assert_eq!(increment_counter_suffix(vec![255, 0], 1), Some(vec![255, 1]));
    }

    #[test]
    fn test_advance_matches_direct_across_carries() {
        let anchor = b"token-bytes";
        let mut aad = ChunkAad::for_index(anchor, 254);

        for expected in 255..=(256 + 256 + 2) {
            aad.advance().unwrap();
            assert_eq!(aad.index(), expected);
            assert_eq!(aad.as_bytes(), build_aad(anchor, expected).as_slice());
        }
    }

    #[test]
    fn test_advance_overflow_is_error() {
        let mut aad = ChunkAad::for_index(b"x", u32::MAX);
        assert!(matches!(aad.advance(), Err(SealError::Internal(_))));
    }

    proptest! {
        #[test]
        fn prop_increment_equals_direct(anchor in proptest::collection::vec(any::<u8>(), 0..40), index in 0u32..u32::MAX) {
            let incremented = increment_counter_suffix(build_aad(&anchor, index), anchor.len()).unwrap();
            prop_assert_eq!(incremented, build_aad(&anchor, index + 1));
        }
    }
}
