//! HTTP client for the master: one synchronous JSON exchange per request.
//!
//! Every serialization, transport or deserialization failure is converted to
//! an errno at this boundary; the dispatcher above only ever sees POSIX
//! codes. No retries are performed; a failed call is final.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{Errno, error_body_status};
use super::wire::{self, endpoint};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Master connection settings, injected at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl MasterConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One method per master endpoint. The windowing engine and the dispatcher
/// are generic over this, so tests can observe calls without a network.
#[async_trait]
pub trait MasterClient: Send + Sync {
    async fn read(&self, req: wire::ReadRequest) -> Result<wire::ReadResponse, Errno>;
    async fn write(&self, req: wire::WriteRequest) -> Result<wire::StatusResponse, Errno>;
    async fn create(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno>;
    async fn getattr(&self, req: wire::FilePathRequest) -> Result<wire::AttrResponse, Errno>;
    async fn mkdir(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno>;
    async fn readdir(&self, req: wire::ReadDirRequest) -> Result<wire::ReadDirResponse, Errno>;
    async fn rename(&self, req: wire::RenameRequest) -> Result<wire::StatusResponse, Errno>;
    async fn rmdir(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno>;
    async fn truncate(&self, req: wire::TruncateRequest) -> Result<wire::StatusResponse, Errno>;
    async fn unlink(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno>;
}

/// reqwest-backed master client.
pub struct HttpMaster {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMaster {
    pub fn new(config: &MasterConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST one JSON request and decode the typed response. A non-success
    /// HTTP status may still carry a `StatusResponse` error body; that status
    /// wins over the generic I/O code.
    async fn call<Q, R>(&self, endpoint: &str, req: &Q) -> Result<R, Errno>
    where
        Q: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                warn!("master call {endpoint} failed: {e}");
                libc::EIO
            })?;
        if resp.status().is_success() {
            resp.json::<R>().await.map_err(|e| {
                warn!("undecodable master response on {endpoint}: {e}");
                libc::EIO
            })
        } else {
            let body = resp.bytes().await.unwrap_or_default();
            Err(error_body_status(&body))
        }
    }
}

#[async_trait]
impl MasterClient for HttpMaster {
    async fn read(&self, req: wire::ReadRequest) -> Result<wire::ReadResponse, Errno> {
        self.call(endpoint::READ, &req).await
    }

    async fn write(&self, req: wire::WriteRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::WRITE, &req).await
    }

    async fn create(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::CREATE, &req).await
    }

    async fn getattr(&self, req: wire::FilePathRequest) -> Result<wire::AttrResponse, Errno> {
        self.call(endpoint::GETATTR, &req).await
    }

    async fn mkdir(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::MKDIR, &req).await
    }

    async fn readdir(&self, req: wire::ReadDirRequest) -> Result<wire::ReadDirResponse, Errno> {
        self.call(endpoint::READDIR, &req).await
    }

    async fn rename(&self, req: wire::RenameRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::RENAME, &req).await
    }

    async fn rmdir(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::RMDIR, &req).await
    }

    async fn truncate(&self, req: wire::TruncateRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::TRUNCATE, &req).await
    }

    async fn unlink(&self, req: wire::FilePathRequest) -> Result<wire::StatusResponse, Errno> {
        self.call(endpoint::UNLINK, &req).await
    }
}
