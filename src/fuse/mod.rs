//! FUSE adapter and request handling.
//!
//! Implements the rfuse3 `Filesystem` trait for `RemoteFs`, translating
//! inode-addressed kernel requests into the path-based dispatcher calls.
//! Attribute mode and size come from the master; ownership (uid/gid) is
//! filled from the calling request's context. Handle-oriented callbacks
//! (release, flush, fsync, ...) are stateless no-ops, mirrored explicitly.
pub mod mount;

use crate::rpc::client::MasterClient;
use crate::rpc::wire::AttrResponse;
use crate::vfs::fs::RemoteFs;
use crate::vfs::paths::join_child;
use bytes::Bytes;
use rfuse3::Result as FuseResult;
use rfuse3::raw::Request;
use rfuse3::raw::reply::{
    DirectoryEntry, DirectoryEntryPlus, FileAttr, ReplyAttr, ReplyCreated, ReplyData,
    ReplyDirectory, ReplyDirectoryPlus, ReplyEntry, ReplyInit, ReplyOpen, ReplyStatFs, ReplyWrite,
};
use std::ffi::{OsStr, OsString};
use std::num::NonZeroU32;
use std::pin::Pin;
use std::time::{Duration, SystemTime};

use futures_util::stream::{self, Stream};
use rfuse3::raw::Filesystem;
use rfuse3::{FileType, SetAttr, Timestamp};

const ATTR_TTL: Duration = Duration::from_secs(1);

impl<M> Filesystem for RemoteFs<M>
where
    M: MasterClient + 'static,
{
    type DirEntryStream<'a>
        = Pin<Box<dyn Stream<Item = FuseResult<DirectoryEntry>> + Send + 'a>>
    where
        Self: 'a;

    type DirEntryPlusStream<'a>
        = Pin<Box<dyn Stream<Item = FuseResult<DirectoryEntryPlus>> + Send + 'a>>
    where
        Self: 'a;

    async fn init(&self, _req: Request) -> FuseResult<ReplyInit> {
        // Conservative maximum write size (1 MiB).
        let max_write = NonZeroU32::new(1024 * 1024).unwrap();
        Ok(ReplyInit { max_write })
    }

    async fn destroy(&self, _req: Request) {}

    // parent inode + name -> child path; existence is the master's call.
    async fn lookup(&self, req: Request, parent: u64, name: &OsStr) -> FuseResult<ReplyEntry> {
        let Some(parent_path) = self.path_of(parent) else {
            return Err(libc::ENOENT.into());
        };
        let path = join_child(&parent_path, &name.to_string_lossy());
        let attr = self.stat(&path).await.map_err(rfuse3::Errno::from)?;
        let ino = self.assign_ino(&path);
        Ok(ReplyEntry {
            ttl: ATTR_TTL,
            attr: master_attr_to_fuse(ino, &attr, &req),
            generation: 0,
        })
    }

    // Stateless IO: always succeeds, no master call, fh=0.
    async fn open(&self, _req: Request, _ino: u64, _flags: u32) -> FuseResult<ReplyOpen> {
        self.open().map_err(rfuse3::Errno::from)?;
        Ok(ReplyOpen { fh: 0, flags: 0 })
    }

    async fn opendir(&self, _req: Request, _ino: u64, _flags: u32) -> FuseResult<ReplyOpen> {
        Ok(ReplyOpen { fh: 0, flags: 0 })
    }

    async fn read(
        &self,
        _req: Request,
        ino: u64,
        _fh: u64,
        offset: u64,
        size: u32,
    ) -> FuseResult<ReplyData> {
        let Some(path) = self.path_of(ino) else {
            return Err(libc::ENOENT.into());
        };
        let data = self
            .read(&path, offset, size as usize)
            .await
            .map_err(rfuse3::Errno::from)?;
        Ok(ReplyData {
            data: Bytes::from(data),
        })
    }

    async fn write(
        &self,
        _req: Request,
        ino: u64,
        _fh: u64,
        offset: u64,
        data: &[u8],
        _write_flags: u32,
        _flags: u32,
    ) -> FuseResult<ReplyWrite> {
        let Some(path) = self.path_of(ino) else {
            return Err(libc::ENOENT.into());
        };
        let written = self
            .write(&path, offset, data)
            .await
            .map_err(rfuse3::Errno::from)? as u32;
        Ok(ReplyWrite { written })
    }

    async fn getattr(
        &self,
        req: Request,
        ino: u64,
        _fh: Option<u64>,
        _flags: u32,
    ) -> FuseResult<ReplyAttr> {
        let Some(path) = self.path_of(ino) else {
            return Err(libc::ENOENT.into());
        };
        let attr = self.stat(&path).await.map_err(rfuse3::Errno::from)?;
        Ok(ReplyAttr {
            ttl: ATTR_TTL,
            attr: master_attr_to_fuse(ino, &attr, &req),
        })
    }

    // size maps to the truncate endpoint; time updates (utimens) are
    // accepted without a master call.
    async fn setattr(
        &self,
        req: Request,
        ino: u64,
        _fh: Option<u64>,
        set_attr: SetAttr,
    ) -> FuseResult<ReplyAttr> {
        let Some(path) = self.path_of(ino) else {
            return Err(libc::ENOENT.into());
        };
        if let Some(size) = set_attr.size {
            self.truncate(&path, size)
                .await
                .map_err(rfuse3::Errno::from)?;
        }
        let attr = self.stat(&path).await.map_err(rfuse3::Errno::from)?;
        Ok(ReplyAttr {
            ttl: ATTR_TTL,
            attr: master_attr_to_fuse(ino, &attr, &req),
        })
    }

    async fn readdir<'a>(
        &'a self,
        _req: Request,
        ino: u64,
        _fh: u64,
        offset: i64,
    ) -> FuseResult<ReplyDirectory<Self::DirEntryStream<'a>>> {
        let Some(path) = self.path_of(ino) else {
            return Err(libc::ENOENT.into());
        };
        let names = self.read_dir(&path).await.map_err(rfuse3::Errno::from)?;

        // "." and ".." first; offset is "offset of the previous entry", so
        // output resumes after it.
        let mut all: Vec<DirectoryEntry> = Vec::with_capacity(names.len() + 2);
        all.push(DirectoryEntry {
            inode: ino,
            kind: FileType::Directory,
            name: OsString::from("."),
            offset: 1,
        });
        let parent_ino = parent_ino_of(self, &path);
        all.push(DirectoryEntry {
            inode: parent_ino,
            kind: FileType::Directory,
            name: OsString::from(".."),
            offset: 2,
        });
        for (i, name) in names.iter().enumerate() {
            let child_path = join_child(&path, name);
            let child_ino = self.assign_ino(&child_path);
            // The listing carries names only; the kind comes from a per-entry
            // stat, falling back to a regular file so every name is emitted.
            let kind = match self.stat(&child_path).await {
                Ok(attr) => kind_of_mode(attr.mode),
                Err(_) => FileType::RegularFile,
            };
            all.push(DirectoryEntry {
                inode: child_ino,
                kind,
                name: OsString::from(name.clone()),
                offset: (i as i64) + 3,
            });
        }

        let start = if offset <= 0 { 0 } else { offset as usize };
        let entries = if start >= all.len() {
            Vec::new()
        } else {
            all[start..].to_vec()
        };
        let boxed: Self::DirEntryStream<'a> = Box::pin(stream::iter(entries.into_iter().map(Ok)));
        Ok(ReplyDirectory { entries: boxed })
    }

    async fn readdirplus<'a>(
        &'a self,
        req: Request,
        ino: u64,
        _fh: u64,
        offset: u64,
        _lock_owner: u64,
    ) -> FuseResult<ReplyDirectoryPlus<Self::DirEntryPlusStream<'a>>> {
        let Some(path) = self.path_of(ino) else {
            return Err(libc::ENOENT.into());
        };
        let names = self.read_dir(&path).await.map_err(rfuse3::Errno::from)?;

        let mut all: Vec<DirectoryEntryPlus> = Vec::with_capacity(names.len() + 2);
        let self_attr = self.stat(&path).await.map_err(rfuse3::Errno::from)?;
        all.push(DirectoryEntryPlus {
            inode: ino,
            generation: 0,
            kind: FileType::Directory,
            name: OsString::from("."),
            offset: 1,
            attr: master_attr_to_fuse(ino, &self_attr, &req),
            entry_ttl: ATTR_TTL,
            attr_ttl: ATTR_TTL,
        });
        let parent_ino = parent_ino_of(self, &path);
        let parent_attr = match self.path_of(parent_ino) {
            Some(parent_path) => self
                .stat(&parent_path)
                .await
                .unwrap_or_else(|_| self_attr.clone()),
            None => self_attr.clone(),
        };
        all.push(DirectoryEntryPlus {
            inode: parent_ino,
            generation: 0,
            kind: FileType::Directory,
            name: OsString::from(".."),
            offset: 2,
            attr: master_attr_to_fuse(parent_ino, &parent_attr, &req),
            entry_ttl: ATTR_TTL,
            attr_ttl: ATTR_TTL,
        });
        for (i, name) in names.iter().enumerate() {
            let child_path = join_child(&path, name);
            let Ok(attr) = self.stat(&child_path).await else {
                continue;
            };
            let child_ino = self.assign_ino(&child_path);
            all.push(DirectoryEntryPlus {
                inode: child_ino,
                generation: 0,
                kind: kind_of_mode(attr.mode),
                name: OsString::from(name.clone()),
                offset: (i as i64) + 3,
                attr: master_attr_to_fuse(child_ino, &attr, &req),
                entry_ttl: ATTR_TTL,
                attr_ttl: ATTR_TTL,
            });
        }

        let start = if offset == 0 { 0 } else { offset as usize };
        let entries = if start >= all.len() {
            Vec::new()
        } else {
            all[start..].to_vec()
        };
        let boxed: Self::DirEntryPlusStream<'a> =
            Box::pin(stream::iter(entries.into_iter().map(Ok)));
        Ok(ReplyDirectoryPlus { entries: boxed })
    }

    // Synthesized locally; the master holds no capacity statistics.
    async fn statfs(&self, _req: Request, _ino: u64) -> FuseResult<ReplyStatFs> {
        let stats = self.statfs();
        Ok(ReplyStatFs {
            blocks: stats.total_blocks,
            bfree: stats.free_blocks,
            bavail: stats.free_blocks,
            files: 0,
            ffree: u64::MAX,
            bsize: stats.block_size,
            namelen: stats.name_len,
            frsize: stats.fragment_size,
        })
    }

    async fn mkdir(
        &self,
        req: Request,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
    ) -> FuseResult<ReplyEntry> {
        let Some(parent_path) = self.path_of(parent) else {
            return Err(libc::ENOENT.into());
        };
        let path = join_child(&parent_path, &name.to_string_lossy());
        self.mkdir(&path).await.map_err(rfuse3::Errno::from)?;
        let attr = self.stat(&path).await.map_err(rfuse3::Errno::from)?;
        let ino = self.assign_ino(&path);
        Ok(ReplyEntry {
            ttl: ATTR_TTL,
            attr: master_attr_to_fuse(ino, &attr, &req),
            generation: 0,
        })
    }

    async fn create(
        &self,
        req: Request,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _flags: u32,
    ) -> FuseResult<ReplyCreated> {
        let Some(parent_path) = self.path_of(parent) else {
            return Err(libc::ENOENT.into());
        };
        let path = join_child(&parent_path, &name.to_string_lossy());
        self.create_file(&path).await.map_err(rfuse3::Errno::from)?;
        let attr = self.stat(&path).await.map_err(rfuse3::Errno::from)?;
        let ino = self.assign_ino(&path);
        Ok(ReplyCreated {
            ttl: ATTR_TTL,
            attr: master_attr_to_fuse(ino, &attr, &req),
            generation: 0,
            fh: 0,
            flags: 0,
        })
    }

    async fn unlink(&self, _req: Request, parent: u64, name: &OsStr) -> FuseResult<()> {
        let Some(parent_path) = self.path_of(parent) else {
            return Err(libc::ENOENT.into());
        };
        let path = join_child(&parent_path, &name.to_string_lossy());
        self.unlink(&path).await.map_err(rfuse3::Errno::from)
    }

    async fn rmdir(&self, _req: Request, parent: u64, name: &OsStr) -> FuseResult<()> {
        let Some(parent_path) = self.path_of(parent) else {
            return Err(libc::ENOENT.into());
        };
        let path = join_child(&parent_path, &name.to_string_lossy());
        self.rmdir(&path).await.map_err(rfuse3::Errno::from)
    }

    async fn rename(
        &self,
        _req: Request,
        parent: u64,
        name: &OsStr,
        new_parent: u64,
        new_name: &OsStr,
    ) -> FuseResult<()> {
        let Some(old_parent_path) = self.path_of(parent) else {
            return Err(libc::ENOENT.into());
        };
        let Some(new_parent_path) = self.path_of(new_parent) else {
            return Err(libc::ENOENT.into());
        };
        let old = join_child(&old_parent_path, &name.to_string_lossy());
        let new = join_child(&new_parent_path, &new_name.to_string_lossy());
        self.rename_path(&old, &new)
            .await
            .map_err(rfuse3::Errno::from)
    }

    // Extended attributes are not part of the master protocol; accepting the
    // set keeps archival tools quiet.
    async fn setxattr(
        &self,
        _req: Request,
        _inode: u64,
        _name: &OsStr,
        _value: &[u8],
        _flags: u32,
        _position: u32,
    ) -> FuseResult<()> {
        Ok(())
    }

    // ===== stateless handle lifecycle: immediate success =====

    async fn release(
        &self,
        _req: Request,
        _inode: u64,
        _fh: u64,
        _flags: u32,
        _lock_owner: u64,
        _flush: bool,
    ) -> FuseResult<()> {
        Ok(())
    }

    async fn flush(
        &self,
        _req: Request,
        _inode: u64,
        _fh: u64,
        _lock_owner: u64,
    ) -> FuseResult<()> {
        Ok(())
    }

    async fn fsync(&self, _req: Request, _inode: u64, _fh: u64, _datasync: bool) -> FuseResult<()> {
        Ok(())
    }

    async fn releasedir(
        &self,
        _req: Request,
        _inode: u64,
        _fh: u64,
        _flags: u32,
    ) -> FuseResult<()> {
        Ok(())
    }

    async fn fsyncdir(
        &self,
        _req: Request,
        _inode: u64,
        _fh: u64,
        _datasync: bool,
    ) -> FuseResult<()> {
        Ok(())
    }

    async fn forget(&self, _req: Request, _inode: u64, _nlookup: u64) {}

    async fn batch_forget(&self, _req: Request, _inodes: &[(u64, u64)]) {}

    async fn interrupt(&self, _req: Request, _unique: u64) -> FuseResult<()> {
        Ok(())
    }
}

// =============== helpers ===============

fn kind_of_mode(mode: u32) -> FileType {
    if mode & libc::S_IFMT as u32 == libc::S_IFDIR as u32 {
        FileType::Directory
    } else {
        FileType::RegularFile
    }
}

/// Parent inode from the path string; the root is its own parent.
fn parent_ino_of<M: MasterClient>(fs: &RemoteFs<M>, path: &str) -> u64 {
    match path.rfind('/') {
        Some(0) | None => fs.root_ino(),
        Some(n) => fs.assign_ino(&path[..n]),
    }
}

/// Mode and size come from the master; ownership comes from the calling
/// request's context, and timestamps are synthesized (the protocol carries
/// none).
fn master_attr_to_fuse(ino: u64, attr: &AttrResponse, req: &Request) -> FileAttr {
    let now = Timestamp::from(SystemTime::now());
    let perm = (attr.mode & 0o7777) as u16;
    let blocks = attr.size.div_ceil(512);
    FileAttr {
        ino,
        size: attr.size,
        blocks,
        atime: now,
        mtime: now,
        ctime: now,
        #[cfg(target_os = "macos")]
        crtime: now,
        kind: kind_of_mode(attr.mode),
        perm,
        nlink: 1,
        uid: req.uid,
        gid: req.gid,
        rdev: 0,
        #[cfg(target_os = "macos")]
        flags: 0,
        blksize: 4096,
    }
}
