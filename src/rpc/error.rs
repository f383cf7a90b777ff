//! Translation of master statuses and transport failures into POSIX codes.
//!
//! The master uses POSIX-style numbering for its non-zero statuses, so they
//! pass through verbatim; only transport-level failures and undecodable
//! bodies collapse into `EIO`. `ENOSPC` is part of the verbatim passthrough,
//! which lets write aggregation special-case it.

use crate::rpc::wire::{STATUS_OK, StatusResponse};

/// Positive POSIX errno value, the error currency of the dispatcher and the
/// windowing engine. Converted to `rfuse3::Errno` at the FUSE boundary.
pub type Errno = i32;

/// 0 becomes `Ok`; any other status is surfaced verbatim.
pub fn status_to_result(status: i32) -> Result<(), Errno> {
    if status == STATUS_OK { Ok(()) } else { Err(status) }
}

/// Map a failed exchange's error body to an errno. A parseable
/// `StatusResponse` with a non-zero status wins (its message goes to the log,
/// never to the caller); anything malformed or absent is the generic I/O
/// failure.
pub fn error_body_status(body: &[u8]) -> Errno {
    match serde_json::from_slice::<StatusResponse>(body) {
        Ok(resp) if resp.status != STATUS_OK => {
            if let Some(message) = &resp.message {
                warn!("master error (status {}): {message}", resp.status);
            }
            resp.status
        }
        _ => libc::EIO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_result() {
        assert_eq!(status_to_result(0), Ok(()));
        assert_eq!(status_to_result(libc::ENOENT), Err(libc::ENOENT));
        assert_eq!(status_to_result(libc::ENOSPC), Err(libc::ENOSPC));
    }

    #[test]
    fn test_error_body_with_parseable_status() {
        let body = format!(r#"{{"status":{},"message":"disk full"}}"#, libc::ENOSPC);
        assert_eq!(error_body_status(body.as_bytes()), libc::ENOSPC);
    }

    #[test]
    fn test_error_body_fallbacks_to_eio() {
        // malformed body
        assert_eq!(error_body_status(b"<html>oops</html>"), libc::EIO);
        // empty body
        assert_eq!(error_body_status(b""), libc::EIO);
        // a success status inside an error body makes no sense either
        assert_eq!(error_body_status(br#"{"status":0}"#), libc::EIO);
    }
}
