//! # Runtime Configuration Module
//!
//! Environment-based settings that shape request handling.
//!
//! ## Environment Variables
//!
//! ### `BINDR_MAX_BODY_BYTES`
//!
//! Largest accepted request body. Larger bodies are answered with 413 before
//! any parsing happens. Accepts decimal (`1048576`) or hexadecimal
//! (`0x100000`).
//!
//! Default: `0x100000` (1 MiB)
//!
//! ## Usage
//!
//! ```rust
//! use bindrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.max_body_bytes > 0);
//! ```

use std::env;

/// Default body limit: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 0x10_0000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let max_body_bytes = env::var("BINDR_MAX_BODY_BYTES")
            .ok()
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        RuntimeConfig { max_body_bytes }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Decimal or `0x`-prefixed hexadecimal.
fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}
