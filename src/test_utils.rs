//! Test doubles shared across module tests (only compiled during tests).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::rpc::client::MasterClient;
use crate::rpc::error::Errno;
use crate::rpc::wire::{
    AttrResponse, FilePathRequest, ReadDirRequest, ReadDirResponse, ReadRequest, ReadResponse,
    RenameRequest, STATUS_OK, StatusResponse, TruncateRequest, WriteRequest, decode_payload,
    encode_payload, endpoint,
};

/// Scripted master: queued replies per endpoint family plus a call log.
///
/// When a queue is empty the operation succeeds with a bland default, so
/// tests only script what they assert on. The log records one line per RPC
/// (endpoint, path and, for ranged ops, the sub-range) in issue order.
#[derive(Default)]
pub struct MockMaster {
    calls: Mutex<Vec<String>>,
    read_replies: Mutex<VecDeque<Result<ReadResponse, Errno>>>,
    write_replies: Mutex<VecDeque<Result<StatusResponse, Errno>>>,
    attr_replies: Mutex<VecDeque<Result<AttrResponse, Errno>>>,
    status_replies: Mutex<VecDeque<Result<StatusResponse, Errno>>>,
    readdir_replies: Mutex<VecDeque<Result<ReadDirResponse, Errno>>>,
}

impl MockMaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_read(&self, reply: Result<ReadResponse, Errno>) {
        self.read_replies.lock().unwrap().push_back(reply);
    }

    /// Queue a successful read returning exactly `data`.
    pub fn push_read_payload(&self, data: &[u8]) {
        self.push_read(Ok(ReadResponse {
            status: STATUS_OK,
            data: encode_payload(data),
        }));
    }

    pub fn push_write(&self, reply: Result<StatusResponse, Errno>) {
        self.write_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_write_status(&self, status: i32) {
        self.push_write(Ok(StatusResponse {
            status,
            message: None,
        }));
    }

    pub fn push_attr(&self, reply: Result<AttrResponse, Errno>) {
        self.attr_replies.lock().unwrap().push_back(reply);
    }

    /// Queue a status reply for the next path-only operation
    /// (create/mkdir/rename/rmdir/truncate/unlink).
    pub fn push_status(&self, status: i32) {
        self.status_replies.lock().unwrap().push_back(Ok(StatusResponse {
            status,
            message: None,
        }));
    }

    pub fn push_readdir(&self, contents: Vec<String>) {
        self.readdir_replies.lock().unwrap().push_back(Ok(ReadDirResponse {
            status: STATUS_OK,
            contents,
        }));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, line: String) {
        self.calls.lock().unwrap().push(line);
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T, Errno>>>) -> Option<Result<T, Errno>> {
        queue.lock().unwrap().pop_front()
    }

    fn pop_status(&self, endpoint: &str, path: &str) -> Result<StatusResponse, Errno> {
        self.record(format!("{endpoint} {path}"));
        Self::pop(&self.status_replies).unwrap_or(Ok(StatusResponse {
            status: STATUS_OK,
            message: None,
        }))
    }
}

#[async_trait]
impl MasterClient for MockMaster {
    async fn read(&self, req: ReadRequest) -> Result<ReadResponse, Errno> {
        self.record(format!(
            "read {} offset={} size={}",
            req.path, req.offset, req.size
        ));
        Self::pop(&self.read_replies).unwrap_or_else(|| {
            Ok(ReadResponse {
                status: STATUS_OK,
                data: encode_payload(&vec![0u8; req.size as usize]),
            })
        })
    }

    async fn write(&self, req: WriteRequest) -> Result<StatusResponse, Errno> {
        let len = decode_payload(&req.data).map(|d| d.len()).unwrap_or(0);
        self.record(format!("write {} offset={} len={len}", req.path, req.offset));
        Self::pop(&self.write_replies).unwrap_or(Ok(StatusResponse {
            status: STATUS_OK,
            message: None,
        }))
    }

    async fn create(&self, req: FilePathRequest) -> Result<StatusResponse, Errno> {
        self.pop_status(endpoint::CREATE, &req.path)
    }

    async fn getattr(&self, req: FilePathRequest) -> Result<AttrResponse, Errno> {
        self.record(format!("{} {}", endpoint::GETATTR, req.path));
        Self::pop(&self.attr_replies).unwrap_or(Ok(AttrResponse {
            status: STATUS_OK,
            mode: libc::S_IFREG as u32 | 0o644,
            size: 0,
        }))
    }

    async fn mkdir(&self, req: FilePathRequest) -> Result<StatusResponse, Errno> {
        self.pop_status(endpoint::MKDIR, &req.path)
    }

    async fn readdir(&self, req: ReadDirRequest) -> Result<ReadDirResponse, Errno> {
        self.record(format!("{} {}", endpoint::READDIR, req.path));
        Self::pop(&self.readdir_replies).unwrap_or(Ok(ReadDirResponse {
            status: STATUS_OK,
            contents: Vec::new(),
        }))
    }

    async fn rename(&self, req: RenameRequest) -> Result<StatusResponse, Errno> {
        self.record(format!("{} {} -> {}", endpoint::RENAME, req.path, req.new_name));
        Self::pop(&self.status_replies).unwrap_or(Ok(StatusResponse {
            status: STATUS_OK,
            message: None,
        }))
    }

    async fn rmdir(&self, req: FilePathRequest) -> Result<StatusResponse, Errno> {
        self.pop_status(endpoint::RMDIR, &req.path)
    }

    async fn truncate(&self, req: TruncateRequest) -> Result<StatusResponse, Errno> {
        self.record(format!(
            "{} {} offset={}",
            endpoint::TRUNCATE,
            req.path,
            req.offset
        ));
        Self::pop(&self.status_replies).unwrap_or(Ok(StatusResponse {
            status: STATUS_OK,
            message: None,
        }))
    }

    async fn unlink(&self, req: FilePathRequest) -> Result<StatusResponse, Errno> {
        self.pop_status(endpoint::UNLINK, &req.path)
    }
}
