//! Server configuration.
//!
//! Read from the environment (a `.env` file is loaded first by the binary).
//! Every variable has a default; malformed values are startup errors.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

pub const ENV_ADDR: &str = "FORM_IMPORTER_ADDR";
pub const ENV_MAX_UPLOAD_MB: &str = "FORM_IMPORTER_MAX_UPLOAD_MB";
pub const ENV_READ_TIMEOUT_SECS: &str = "FORM_IMPORTER_READ_TIMEOUT_SECS";
pub const ENV_DEFAULT_OWNER: &str = "FORM_IMPORTER_DEFAULT_OWNER";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:3000`.
    pub addr: String,
    /// Request body limit for uploads, in megabytes.
    pub max_upload_mb: usize,
    /// Bound on reading an uploaded file into memory.
    pub read_timeout: Duration,
    /// Owner recorded for persisted forms when the request names none.
    pub default_owner: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            max_upload_mb: 10,
            read_timeout: Duration::from_secs(30),
            default_owner: "anonymous".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            "Config: addr={} max_upload_mb={} read_timeout={:?}",
            config.addr, config.max_upload_mb, config.read_timeout
        );
        Ok(config)
    }

    /// Build from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_ADDR) {
            config.addr = addr;
        }
        if let Some(raw) = lookup(ENV_MAX_UPLOAD_MB) {
            config.max_upload_mb = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number, got {:?}", ENV_MAX_UPLOAD_MB, raw))?;
            if config.max_upload_mb.checked_mul(1024 * 1024).is_none() {
                anyhow::bail!("{} is too large: {} MB does not fit in a byte count", ENV_MAX_UPLOAD_MB, raw.trim());
            }
        }
        if let Some(raw) = lookup(ENV_READ_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().with_context(|| {
                format!("{} must be a whole number, got {:?}", ENV_READ_TIMEOUT_SECS, raw)
            })?;
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(owner) = lookup(ENV_DEFAULT_OWNER).filter(|o| !o.trim().is_empty()) {
            config.default_owner = owner;
        }

        Ok(config)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000");
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.default_owner, "anonymous");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_ADDR, "127.0.0.1:8080"),
            (ENV_MAX_UPLOAD_MB, "2"),
            (ENV_READ_TIMEOUT_SECS, " 5 "),
            (ENV_DEFAULT_OWNER, "ops"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080");
        assert_eq!(config.max_upload_mb, 2);
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.default_owner, "ops");
    }

    #[test]
    fn test_bad_number_is_error() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_MAX_UPLOAD_MB, "ten")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_UPLOAD_MB));
    }

    #[test]
    fn test_upload_limit_overflow_is_error() {
        let raw = usize::MAX.to_string();
        let err = ServerConfig::from_lookup(lookup(&[(ENV_MAX_UPLOAD_MB, raw.as_str())])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_UPLOAD_MB));

        let largest = (usize::MAX / (1024 * 1024)).to_string();
        let config = ServerConfig::from_lookup(lookup(&[(ENV_MAX_UPLOAD_MB, largest.as_str())])).unwrap();
        assert_eq!(config.max_upload_bytes(), config.max_upload_mb * 1024 * 1024);
    }

    #[test]
    fn test_blank_owner_keeps_default() {
        let config = ServerConfig::from_lookup(lookup(&[(ENV_DEFAULT_OWNER, "  ")])).unwrap();
        assert_eq!(config.default_owner, "anonymous");
    }
}
