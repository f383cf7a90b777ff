//! Chunk windowing and ranged I/O aggregation.
//!
//! A chunk is a fixed-size, contiguous, zero-indexed window over a file's
//! byte stream and the unit of addressing toward the master. Ranged reads
//! and writes are decomposed here into chunk-aligned sub-requests, issued
//! strictly left-to-right, and their outcomes aggregated back into the
//! single byte count the kernel expects.
//!
//! Submodules:
//! - `layout`: chunk size and index math
//! - `window`: file range -> chunk-aligned span decomposition
//! - `reader`: read aggregation (early stop on short or failed sub-reads)
//! - `writer`: write aggregation (per-span status collection)

pub mod layout;
pub mod reader;
pub mod window;
pub mod writer;

pub use layout::ChunkLayout;
pub use reader::ChunkedReader;
pub use window::{ChunkSpan, split_file_range_into_chunks};
pub use writer::ChunkedWriter;
