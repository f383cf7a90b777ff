//! Write aggregation: chunk-aligned sub-writes with per-span status
//! collection.

use crate::rpc::client::MasterClient;
use crate::rpc::error::Errno;
use crate::rpc::wire::{self, STATUS_OK};

use super::layout::ChunkLayout;
use super::window::split_file_range_into_chunks;

pub struct ChunkedWriter<'a, M: MasterClient + ?Sized> {
    layout: ChunkLayout,
    master: &'a M,
}

impl<'a, M: MasterClient + ?Sized> ChunkedWriter<'a, M> {
    pub fn new(layout: ChunkLayout, master: &'a M) -> Self {
        Self { layout, master }
    }

    /// Write `data` at `offset`, one sub-write per chunk span.
    ///
    /// Every span is attempted even after a failure. The collected statuses
    /// decide the outcome: all success reports the full requested size, any
    /// `ENOSPC` wins over a generic failure, anything else is `EIO`. A
    /// zero-length write succeeds without touching the master.
    pub async fn write(&self, path: &str, offset: u64, data: &[u8]) -> Result<usize, Errno> {
        if data.is_empty() {
            return Ok(0);
        }
        let spans = split_file_range_into_chunks(self.layout, offset, data.len());
        let mut statuses = Vec::with_capacity(spans.len());
        let mut cursor = 0usize;
        for span in spans {
            let part = &data[cursor..cursor + span.len];
            cursor += span.len;
            let req = wire::WriteRequest {
                path: path.to_string(),
                offset: span.offset,
                data: wire::encode_payload(part),
            };
            let status = match self.master.write(req).await {
                Ok(resp) => resp.status,
                Err(errno) => errno,
            };
            statuses.push(status);
        }
        if statuses.iter().all(|&s| s == STATUS_OK) {
            Ok(data.len())
        } else if statuses.contains(&libc::ENOSPC) {
            Err(libc::ENOSPC)
        } else {
            Err(libc::EIO)
        }
    }
}
