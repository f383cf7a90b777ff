//! Wire types for the master protocol.
//!
//! Field names and the status convention (0 = success) are the compatibility
//! surface with an existing master; they must not drift. Unknown fields in
//! responses are ignored. `data` fields always carry base64-encoded byte
//! payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Master status value meaning success.
pub const STATUS_OK: i32 = 0;

/// Endpoint paths on the master, appended to the configured base address.
pub mod endpoint {
    pub const READ: &str = "/fs/read";
    pub const WRITE: &str = "/fs/write";
    pub const CREATE: &str = "/fs/create";
    pub const GETATTR: &str = "/fs/getattr";
    pub const MKDIR: &str = "/fs/mkdir";
    pub const READDIR: &str = "/fs/readdir";
    pub const RENAME: &str = "/fs/rename";
    pub const RMDIR: &str = "/fs/rmdir";
    pub const TRUNCATE: &str = "/fs/truncate";
    pub const UNLINK: &str = "/fs/unlink";
}

// ===== requests =====

#[derive(Debug, Clone, Serialize)]
pub struct ReadRequest {
    pub path: String,
    pub offset: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteRequest {
    pub path: String,
    pub offset: u64,
    /// base64-encoded byte payload
    pub data: String,
}

/// Used by create/getattr/mkdir/rmdir/unlink.
#[derive(Debug, Clone, Serialize)]
pub struct FilePathRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameRequest {
    pub path: String,
    #[serde(rename = "newName")]
    pub new_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TruncateRequest {
    pub path: String,
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadDirRequest {
    pub path: String,
}

// ===== responses =====

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: i32,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadResponse {
    pub status: i32,
    /// base64-encoded byte payload
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttrResponse {
    pub status: i32,
    #[serde(default)]
    pub mode: u32,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadDirResponse {
    pub status: i32,
    /// entry names, in master order
    #[serde(default)]
    pub contents: Vec<String>,
}

// ===== payload codec =====

pub fn encode_payload(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// `None` on malformed base64; the read path treats that as an early stop.
pub fn decode_payload(data: &str) -> Option<Vec<u8>> {
    BASE64.decode(data).ok()
}
