use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;

/// Hex SHA-256 of a migration body, stored next to each journal entry
pub fn content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checksum of a migration file as `migrate list` shows it
pub async fn file_checksum(path: &Path) -> Result<String, std::io::Error> {
    let content = fs::read_to_string(path).await?;
    Ok(content_checksum(&content))
}
