//! Master protocol: wire types, error translation and the HTTP client.
//!
//! Submodules:
//! - `wire`: request/response bodies and the base64 payload codec
//! - `error`: master status / transport failure -> POSIX errno translation
//! - `client`: the `MasterClient` trait and its reqwest-backed implementation

pub mod client;
pub mod error;
pub mod wire;

pub use client::{HttpMaster, MasterClient, MasterConfig};
