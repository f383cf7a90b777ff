//! Mount helpers for starting/stopping FUSE.
//!
//! Notes:
//! - Only supported on Unix-like systems. On Linux we support unprivileged
//!   mount via fusermount3.
//! - These helpers are thin wrappers over rfuse3 raw Session APIs.

use std::path::Path;

use rfuse3::MountOptions;

use crate::rpc::client::MasterClient;
use crate::vfs::fs::RemoteFs;

/// Build default mount options for chunkfs.
fn default_mount_options() -> MountOptions {
    let mut mo = MountOptions::default();
    mo.fs_name("chunkfs");
    // Keep defaults conservative: no allow_other, require empty mountpoint.
    mo
}

/// Mount a `RemoteFs` on the given empty directory using unprivileged mode
/// when available.
#[cfg(target_os = "linux")]
pub async fn mount_remote_unprivileged<M>(
    fs: RemoteFs<M>,
    mount_point: impl AsRef<Path>,
) -> std::io::Result<rfuse3::raw::MountHandle>
where
    M: MasterClient + 'static,
{
    let opts = default_mount_options();
    let session = rfuse3::raw::Session::new(opts);
    // Prefer unprivileged mount on Linux (requires fusermount3 in PATH)
    session.mount_with_unprivileged(fs, mount_point).await
}

/// Fallback stub for non-Linux targets.
#[cfg(not(target_os = "linux"))]
pub async fn mount_remote_unprivileged<M>(
    _fs: RemoteFs<M>,
    _mount_point: impl AsRef<Path>,
) -> std::io::Result<rfuse3::raw::MountHandle>
where
    M: MasterClient + 'static,
{
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "FUSE mount is only supported on Linux in this build",
    ))
}
