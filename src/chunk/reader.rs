//! Read aggregation: chunk-aligned sub-reads, concatenated left-to-right.

use crate::rpc::client::MasterClient;
use crate::rpc::wire::{self, STATUS_OK};

use super::layout::ChunkLayout;
use super::window::split_file_range_into_chunks;

pub struct ChunkedReader<'a, M: MasterClient + ?Sized> {
    layout: ChunkLayout,
    master: &'a M,
}

impl<'a, M: MasterClient + ?Sized> ChunkedReader<'a, M> {
    pub fn new(layout: ChunkLayout, master: &'a M) -> Self {
        Self { layout, master }
    }

    /// Read `[offset, offset+size)` of `path`, one sub-read per chunk span.
    ///
    /// The loop stops at the first failed sub-read, non-zero status,
    /// undecodable payload or short payload (the short payload still
    /// contributes) and returns whatever accumulated so far. A short result
    /// is indistinguishable from end-of-file to the caller.
    pub async fn read(&self, path: &str, offset: u64, size: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(size);
        for span in split_file_range_into_chunks(self.layout, offset, size) {
            let req = wire::ReadRequest {
                path: path.to_string(),
                offset: span.offset,
                size: span.len as u64,
            };
            let resp = match self.master.read(req).await {
                Ok(resp) => resp,
                Err(_) => break,
            };
            if resp.status != STATUS_OK {
                break;
            }
            let Some(part) = wire::decode_payload(&resp.data) else {
                debug!("undecodable read payload for {path} at offset {}", span.offset);
                break;
            };
            let take = part.len().min(span.len);
            out.extend_from_slice(&part[..take]);
            if part.len() < span.len {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::wire::{ReadResponse, encode_payload};
    use crate::test_utils::MockMaster;

    #[tokio::test]
    async fn test_read_concatenates_full_sub_reads() {
        let master = MockMaster::new();
        master.push_read_payload(&vec![1u8; 10]);
        master.push_read_payload(&vec![2u8; 90]);

        let layout = ChunkLayout::default();
        let reader = ChunkedReader::new(layout, &master);
        let out = reader.read("/f", layout.chunk_size - 10, 100).await;

        assert_eq!(out.len(), 100);
        assert!(out[..10].iter().all(|&b| b == 1));
        assert!(out[10..].iter().all(|&b| b == 2));
        assert_eq!(master.call_count(), 2);
    }

    #[tokio::test]
    async fn test_read_stops_after_short_sub_read() {
        // 10000 bytes at 4000 split into 96 + 4096 + 3904; the second
        // sub-read returns only 10 bytes, so the third is never issued.
        let master = MockMaster::new();
        master.push_read_payload(&vec![7u8; 96]);
        master.push_read_payload(&vec![8u8; 10]);

        let reader = ChunkedReader::new(ChunkLayout::default(), &master);
        let out = reader.read("/f", 4000, 10000).await;

        assert_eq!(out.len(), 106);
        assert_eq!(
            master.calls(),
            vec![
                "read /f offset=4000 size=96",
                "read /f offset=4096 size=4096",
            ]
        );
    }

    #[tokio::test]
    async fn test_read_failed_sub_read_contributes_nothing() {
        let master = MockMaster::new();
        master.push_read_payload(&vec![3u8; 96]);
        master.push_read(Ok(ReadResponse {
            status: libc::ENOENT,
            data: encode_payload(&[9u8; 4096]),
        }));

        let reader = ChunkedReader::new(ChunkLayout::default(), &master);
        let out = reader.read("/f", 4000, 10000).await;

        // the failed sub-read's payload is discarded and the loop halts
        assert_eq!(out, vec![3u8; 96]);
        assert_eq!(master.call_count(), 2);
    }

    #[tokio::test]
    async fn test_read_undecodable_payload_stops_loop() {
        let master = MockMaster::new();
        master.push_read(Ok(ReadResponse {
            status: 0,
            data: "!!! not base64".into(),
        }));

        let reader = ChunkedReader::new(ChunkLayout::default(), &master);
        let out = reader.read("/f", 0, 8192).await;

        assert!(out.is_empty());
        assert_eq!(master.call_count(), 1);
    }

    #[tokio::test]
    async fn test_read_zero_size_issues_no_rpc() {
        let master = MockMaster::new();
        let reader = ChunkedReader::new(ChunkLayout::default(), &master);
        let out = reader.read("/f", 123, 0).await;
        assert!(out.is_empty());
        assert_eq!(master.call_count(), 0);
    }
}
