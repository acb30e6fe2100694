mod hash;

pub use hash::{content_checksum, file_checksum};

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
