//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rows per decoded batch; also the CSV type-detection window.
    pub batch_size: usize,

    /// Chunk size of the per-line scratch arena.
    pub arena_block_size: usize,

    /// Optional hard cap on scratch arena bytes for a single line.
    pub arena_limit_bytes: Option<usize>,

    /// Read size used by hosts that stream files into `push`.
    pub input_chunk_bytes: usize,

    /// Seed for the reservoir samplers' xorshift generator.
    pub sample_seed: u64,
}

pub const DEFAULT_BATCH_SIZE: usize = 1024;
pub const DEFAULT_ARENA_BLOCK_SIZE: usize = 64 * 1024;
pub const DEFAULT_SAMPLE_SEED: u64 = 0x1234_5678_dead_beef;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            arena_block_size: DEFAULT_ARENA_BLOCK_SIZE,
            arena_limit_bytes: None,
            input_chunk_bytes: 64 * 1024,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SLUICE_BATCH_SIZE`: rows per batch / detection window
    /// - `SLUICE_ARENA_BLOCK_SIZE`: scratch arena chunk size in bytes
    /// - `SLUICE_ARENA_LIMIT_BYTES`: scratch arena cap in bytes
    /// - `SLUICE_INPUT_CHUNK_BYTES`: host read size
    /// - `SLUICE_SAMPLE_SEED`: reservoir seed (decimal or `0x` hex)
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("SLUICE_BATCH_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.batch_size = v;
            }
        }

        if let Ok(s) = std::env::var("SLUICE_ARENA_BLOCK_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.arena_block_size = v;
            }
        }

        if let Ok(s) = std::env::var("SLUICE_ARENA_LIMIT_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.arena_limit_bytes = Some(v);
            }
        }

        if let Ok(s) = std::env::var("SLUICE_INPUT_CHUNK_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.input_chunk_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("SLUICE_SAMPLE_SEED") {
            if let Some(v) = parse_seed(&s) {
                cfg.sample_seed = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        if self.arena_block_size == 0 {
            return Err(Error::Config("arena_block_size must be positive".into()));
        }
        if self.input_chunk_bytes == 0 {
            return Err(Error::Config("input_chunk_bytes must be positive".into()));
        }
        Ok(())
    }
}

fn parse_seed(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse::<u64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.batch_size, 1024);
        assert_eq!(cfg.sample_seed, 0x1234_5678_dead_beef);
    }

    #[test]
    fn zero_batch_size_rejected() {
        let cfg = EngineConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn seed_accepts_hex_and_decimal() {
        assert_eq!(parse_seed("0xff"), Some(255));
        assert_eq!(parse_seed("42"), Some(42));
        assert_eq!(parse_seed("nope"), None);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"batch_size": 8}"#).unwrap();
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.arena_block_size, DEFAULT_ARENA_BLOCK_SIZE);
    }
}
