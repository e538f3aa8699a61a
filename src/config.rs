use std::path::Path;

use serde::{Deserialize, Serialize};

/// Fixed sizes and switches for one VM session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    /// Capacity of the dual operand stack, in slots.
    pub stack_slots: usize,
    /// Size of the executable heap mapping, in bytes.
    pub heap_bytes: usize,
    /// Run the built-in startup script during construction.
    pub startup: bool,
}

pub const DEFAULT_STACK_SLOTS: usize = 1 << 16;
pub const DEFAULT_HEAP_BYTES: usize = 16 * 1024 * 1024;

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig { stack_slots: DEFAULT_STACK_SLOTS, heap_bytes: DEFAULT_HEAP_BYTES, startup: true }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

impl VmConfig {
    /// Load a JSON config file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
