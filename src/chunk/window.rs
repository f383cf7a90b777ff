//! Splitting a file range into chunk-aligned sub-ranges.

use super::layout::ChunkLayout;

/// One chunk-aligned sub-range of a file request. `offset` is the absolute
/// file offset; a span never crosses a chunk boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub chunk_index: u64,
    pub offset: u64,
    pub len: usize,
}

/// Split `[offset, offset+len)` into ordered, exhaustive, non-overlapping
/// chunk-aligned spans, left to right. A zero-length range yields no spans.
pub fn split_file_range_into_chunks(
    layout: ChunkLayout,
    offset: u64,
    len: usize,
) -> Vec<ChunkSpan> {
    let mut out = Vec::new();
    if len == 0 {
        return out;
    }
    let mut left = offset;
    let right = offset + len as u64 - 1; // inclusive
    while left <= right {
        let chunk_index = layout.chunk_index_of(left);
        let end = layout.last_offset_of_chunk(chunk_index).min(right);
        let take = (end - left + 1) as usize;
        out.push(ChunkSpan {
            chunk_index,
            offset: left,
            len: take,
        });
        left += take as u64;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_within_single_chunk() {
        let layout = ChunkLayout::default();
        let spans = split_file_range_into_chunks(layout, 123, 1000);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].chunk_index, 0);
        assert_eq!(spans[0].offset, 123);
        assert_eq!(spans[0].len, 1000);
    }

    #[test]
    fn test_split_across_two_chunks() {
        let layout = ChunkLayout::default();
        let start = layout.chunk_size - 10;
        let spans = split_file_range_into_chunks(layout, start, 100);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].chunk_index, 0);
        assert_eq!(spans[0].offset, start);
        assert_eq!(spans[0].len, 10);
        assert_eq!(spans[1].chunk_index, 1);
        assert_eq!(spans[1].offset, layout.chunk_size);
        assert_eq!(spans[1].len, 90);
    }

    #[test]
    fn test_split_unaligned_examples() {
        let layout = ChunkLayout::default();

        // 5000 bytes at 3000: tail of chunk 0 plus most of chunk 1.
        let spans = split_file_range_into_chunks(layout, 3000, 5000);
        assert_eq!(
            spans,
            vec![
                ChunkSpan { chunk_index: 0, offset: 3000, len: 1096 },
                ChunkSpan { chunk_index: 1, offset: 4096, len: 3904 },
            ]
        );

        // 10000 bytes at 4000: three chunks touched.
        let spans = split_file_range_into_chunks(layout, 4000, 10000);
        assert_eq!(
            spans,
            vec![
                ChunkSpan { chunk_index: 0, offset: 4000, len: 96 },
                ChunkSpan { chunk_index: 1, offset: 4096, len: 4096 },
                ChunkSpan { chunk_index: 2, offset: 8192, len: 3904 },
            ]
        );
    }

    #[test]
    fn test_zero_len() {
        let layout = ChunkLayout::default();
        let spans = split_file_range_into_chunks(layout, 0, 0);
        assert!(spans.is_empty());
        let spans = split_file_range_into_chunks(layout, 9999, 0);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_spans_cover_range_exactly() {
        let layout = ChunkLayout::default();
        for &offset in &[0u64, 1, 4095, 4096, 5000, 12287] {
            for &len in &[1usize, 4095, 4096, 4097, 10000] {
                let spans = split_file_range_into_chunks(layout, offset, len);
                assert_eq!(spans[0].offset, offset);
                assert_eq!(spans.iter().map(|s| s.len).sum::<usize>(), len);
                let mut next = offset;
                for s in &spans {
                    // contiguous, left to right
                    assert_eq!(s.offset, next);
                    // entirely inside one chunk
                    assert_eq!(layout.chunk_index_of(s.offset), s.chunk_index);
                    assert_eq!(
                        layout.chunk_index_of(s.offset + s.len as u64 - 1),
                        s.chunk_index
                    );
                    next += s.len as u64;
                }
            }
        }
    }
}
