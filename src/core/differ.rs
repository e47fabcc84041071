use sha2::{Digest, Sha256};

/// Tracks the digest of the last analysed text so unchanged input can be
/// skipped.
#[derive(Debug, Default)]
pub struct ContentDiffer {
    last_hash: Option<String>,
}

impl ContentDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate SHA256 hash of content
    pub fn calculate_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn has_content_changed(&self, content: &str) -> bool {
        self.last_hash.as_deref() != Some(Self::calculate_hash(content).as_str())
    }

    /// Record `content` as analysed
    pub fn mark(&mut self, content: &str) {
        self.last_hash = Some(Self::calculate_hash(content));
    }

    pub fn reset(&mut self) {
        self.last_hash = None;
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }
}
