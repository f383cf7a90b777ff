//! Chunk size constant and index math.

/// Chunk size used when none is configured (bytes).
pub const DEFAULT_CHUNK_SIZE: u64 = 4096;

/// Fixed chunk geometry. Chunks are contiguous, non-overlapping and
/// zero-indexed over the file's byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    pub chunk_size: u64,
}

impl Default for ChunkLayout {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkLayout {
    /// `chunk_size` must be non-zero.
    pub fn new(chunk_size: u64) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self { chunk_size }
    }

    /// Chunk holding the given file offset.
    pub fn chunk_index_of(&self, offset: u64) -> u64 {
        offset / self.chunk_size
    }

    /// Last byte offset covered by the given chunk (inclusive).
    pub fn last_offset_of_chunk(&self, chunk_index: u64) -> u64 {
        (chunk_index + 1) * self.chunk_size - 1
    }
}
