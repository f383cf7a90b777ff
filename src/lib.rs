// Library crate for chunkfs: re-export internal modules for reuse by external bins.
//
// chunkfs is the client half of a chunked, network-backed filesystem: it
// exposes a local FUSE mount and satisfies every operation with a request to
// a remote master. Ranged reads and writes are decomposed into fixed-size,
// chunk-aligned sub-requests before they hit the wire.
#[macro_use]
extern crate log;

pub mod chunk;
pub mod fuse;
pub mod rpc;
pub mod vfs;

#[cfg(test)]
pub mod test_utils;
