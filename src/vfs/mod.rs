//! Filesystem operation dispatcher.
//!
//! `fs::RemoteFs` implements the path-based operation set against the
//! master; `paths::PathTable` keeps the inode-to-path bookkeeping the
//! inode-addressed FUSE protocol needs. Neither layer retains file data or
//! attributes; the master stays the single source of truth.

pub mod fs;
pub mod paths;

pub use fs::RemoteFs;
