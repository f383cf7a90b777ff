//! Path-based dispatcher: every operation is one master call, except ranged
//! reads/writes (which go through the chunk windowing engine) and the
//! operations the protocol answers locally (open, statfs).

use std::sync::Mutex;

use crate::chunk::{ChunkLayout, ChunkedReader, ChunkedWriter};
use crate::rpc::client::MasterClient;
use crate::rpc::error::{Errno, status_to_result};
use crate::rpc::wire::{self, AttrResponse};

use super::paths::{PathTable, ROOT_INO};

/// Locally synthesized filesystem statistics; the master is never asked.
/// Fixed totals keep copy tools working on hosts that size the volume from
/// statfs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStatistics {
    pub total_blocks: u64,
    pub free_blocks: u64,
    pub fragment_size: u32,
    pub block_size: u32,
    pub name_len: u32,
}

pub const FS_STATISTICS: FsStatistics = FsStatistics {
    total_blocks: 1024 * 1024,
    free_blocks: 1024 * 1024,
    fragment_size: 1024,
    block_size: 4096,
    name_len: 255,
};

pub struct RemoteFs<M: MasterClient> {
    layout: ChunkLayout,
    master: M,
    paths: Mutex<PathTable>,
}

impl<M: MasterClient> RemoteFs<M> {
    pub fn new(layout: ChunkLayout, master: M) -> Self {
        Self {
            layout,
            master,
            paths: Mutex::new(PathTable::new()),
        }
    }

    /// Missing path short-circuits with EINVAL before any network activity.
    fn require_path(path: &str) -> Result<(), Errno> {
        if path.is_empty() {
            Err(libc::EINVAL)
        } else {
            Ok(())
        }
    }

    fn file_path_request(path: &str) -> wire::FilePathRequest {
        wire::FilePathRequest {
            path: path.to_string(),
        }
    }

    // ===== inode bookkeeping (used by the FUSE layer) =====

    pub fn root_ino(&self) -> u64 {
        ROOT_INO
    }

    pub fn path_of(&self, ino: u64) -> Option<String> {
        self.paths.lock().unwrap().path_of(ino)
    }

    pub fn assign_ino(&self, path: &str) -> u64 {
        self.paths.lock().unwrap().assign(path)
    }

    // ===== operations =====

    /// getattr: mode and size come from the master; ownership is filled from
    /// the caller's context at the FUSE boundary.
    pub async fn stat(&self, path: &str) -> Result<AttrResponse, Errno> {
        Self::require_path(path)?;
        debug!("getattr {path:?}");
        let resp = self.master.getattr(Self::file_path_request(path)).await?;
        status_to_result(resp.status)?;
        Ok(resp)
    }

    /// Ranged read through the windowing engine. Never fails once the path
    /// is validated; sub-read failures shorten the result instead.
    pub async fn read(&self, path: &str, offset: u64, size: usize) -> Result<Vec<u8>, Errno> {
        Self::require_path(path)?;
        debug!("read {path:?} offset={offset} size={size}");
        let reader = ChunkedReader::new(self.layout, &self.master);
        Ok(reader.read(path, offset, size).await)
    }

    /// Ranged write through the windowing engine.
    pub async fn write(&self, path: &str, offset: u64, data: &[u8]) -> Result<usize, Errno> {
        Self::require_path(path)?;
        debug!("write {path:?} offset={offset} size={}", data.len());
        let writer = ChunkedWriter::new(self.layout, &self.master);
        writer.write(path, offset, data).await
    }

    pub async fn create_file(&self, path: &str) -> Result<(), Errno> {
        Self::require_path(path)?;
        debug!("create {path:?}");
        let resp = self.master.create(Self::file_path_request(path)).await?;
        status_to_result(resp.status)
    }

    pub async fn mkdir(&self, path: &str) -> Result<(), Errno> {
        Self::require_path(path)?;
        debug!("mkdir {path:?}");
        let resp = self.master.mkdir(Self::file_path_request(path)).await?;
        status_to_result(resp.status)
    }

    /// Entry names in master order.
    pub async fn read_dir(&self, path: &str) -> Result<Vec<String>, Errno> {
        Self::require_path(path)?;
        debug!("readdir {path:?}");
        let resp = self
            .master
            .readdir(wire::ReadDirRequest {
                path: path.to_string(),
            })
            .await?;
        status_to_result(resp.status)?;
        Ok(resp.contents)
    }

    pub async fn rename_path(&self, old: &str, new: &str) -> Result<(), Errno> {
        Self::require_path(old)?;
        Self::require_path(new)?;
        debug!("rename {old:?} -> {new:?}");
        let resp = self
            .master
            .rename(wire::RenameRequest {
                path: old.to_string(),
                new_name: new.to_string(),
            })
            .await?;
        status_to_result(resp.status)?;
        self.paths.lock().unwrap().rename(old, new);
        Ok(())
    }

    pub async fn rmdir(&self, path: &str) -> Result<(), Errno> {
        Self::require_path(path)?;
        debug!("rmdir {path:?}");
        let resp = self.master.rmdir(Self::file_path_request(path)).await?;
        status_to_result(resp.status)?;
        self.paths.lock().unwrap().remove(path);
        Ok(())
    }

    pub async fn truncate(&self, path: &str, size: u64) -> Result<(), Errno> {
        Self::require_path(path)?;
        debug!("truncate {path:?} size={size}");
        let resp = self
            .master
            .truncate(wire::TruncateRequest {
                path: path.to_string(),
                offset: size,
            })
            .await?;
        status_to_result(resp.status)
    }

    pub async fn unlink(&self, path: &str) -> Result<(), Errno> {
        Self::require_path(path)?;
        debug!("unlink {path:?}");
        let resp = self.master.unlink(Self::file_path_request(path)).await?;
        status_to_result(resp.status)?;
        self.paths.lock().unwrap().remove(path);
        Ok(())
    }

    /// open never consults the master; no per-open state exists.
    pub fn open(&self) -> Result<(), Errno> {
        Ok(())
    }

    /// statfs is answered locally.
    pub fn statfs(&self) -> FsStatistics {
        FS_STATISTICS
    }
}
