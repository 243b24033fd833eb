use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SealError, SealResult};

/// Default plaintext chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streaming configuration (loaded from sealstream.toml)
///
/// `chunk_size` is part of the container format: a container must be
/// decrypted with the same chunk size it was encrypted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Plaintext bytes per chunk record (default: 65536)
    pub chunk_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl StreamConfig {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub fn validate(&self) -> SealResult<()> {
        if self.chunk_size == 0 {
            return Err(SealError::Config("chunk_size must be non-zero".into()));
        }
        if u32::try_from(self.chunk_size).is_err() {
            return Err(SealError::Config(format!(
                "chunk_size {} exceeds {}",
                self.chunk_size,
                u32::MAX
            )));
        }
        Ok(())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: StreamConfig =
            toml::from_str(content).map_err(|e| anyhow::anyhow!("parsing stream config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "config file not found: {}  (using defaults)",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("loading config {}: {e}", path.display()))
    }
}
