//! Base domain validation and the ambient TOML configuration layer.
//!
//! `BaseDomain` normalizes to a leading dot, then walks the string once
//! checking character set and per-label length. `TunnelConfig` is the
//! ambient addition — an optional TOML file (`serde` + `toml`) carrying
//! defaults the CLI layer can override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TunnelError;

/// Maximum total length of a normalized base domain (`.example.com`),
/// reserving room for at least one data label plus its length prefix and
/// the terminating zero octet.
const MAX_BASE_DOMAIN_LEN: usize = 252;

/// A validated, normalized base domain shared by every packet in a session.
///
/// The normalized form always begins with `.` (e.g. `.example.com`). Both
/// the dotted form and its precomputed length-prefixed wire form are kept
/// so the framer never has to re-derive either on the hot path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDomain {
    dotted: String,
    prefixed: Vec<u8>,
}

impl BaseDomain {
    /// Validates and normalizes `raw`, matching `check_base_host`'s rules:
    /// only letters, digits, `-`, `.`; each label 1..=63 octets; normalized
    /// total length < [`MAX_BASE_DOMAIN_LEN`].
    pub fn new(raw: &str) -> Result<Self, TunnelError> {
        if raw.is_empty() {
            return Err(TunnelError::InvalidBaseHost("empty base host".into()));
        }
        let dotted = if raw.starts_with('.') {
            raw.to_string()
        } else {
            format!(".{raw}")
        };

        if dotted.len() > MAX_BASE_DOMAIN_LEN {
            return Err(TunnelError::InvalidBaseHost(format!(
                "'{raw}' exceeds {MAX_BASE_DOMAIN_LEN} bytes once normalized"
            )));
        }

        for label in dotted.split('.').skip(1) {
            if label.is_empty() || label.len() > crate::wire::MAX_LABEL_LEN {
                return Err(TunnelError::InvalidBaseHost(format!(
                    "label '{label}' must be 1..=63 bytes"
                )));
            }
            if !label
                .bytes()
                .all(|c| c.is_ascii_alphanumeric() || c == b'-')
            {
                return Err(TunnelError::InvalidBaseHost(format!(
                    "label '{label}' contains a character outside [a-zA-Z0-9-]"
                )));
            }
        }

        let mut prefixed = Vec::new();
        crate::wire::qname_dotted_to_prefixed(&dotted[1..], &mut prefixed)
            .map_err(|e| TunnelError::InvalidBaseHost(e.to_string()))?;

        Ok(Self { dotted, prefixed })
    }

    /// The normalized dotted form, e.g. `.example.com`.
    pub fn dotted(&self) -> &str {
        &self.dotted
    }

    /// The dotted form without its leading dot, e.g. `example.com`.
    pub fn dotted_unprefixed(&self) -> &str {
        &self.dotted[1..]
    }

    /// The precomputed length-prefixed wire form, zero-terminated.
    pub fn prefixed(&self) -> &[u8] {
        &self.prefixed
    }
}

/// Protocol-level constants, overridable via [`TunnelConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Sender's per-exchange receive timeout. Default 4s.
    #[serde(with = "humantime_serde")]
    pub sender_timeout: Duration,
    /// Receiver's per-packet receive timeout within a session. Default 10s.
    #[serde(with = "humantime_serde")]
    pub receiver_timeout: Duration,
    /// Max send+receive attempts per chunk. Default 3.
    pub retry_budget: u8,
    /// UDP port both endpoints use unless overridden. Default 53.
    pub port: u16,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            sender_timeout: Duration::from_secs(4),
            receiver_timeout: Duration::from_secs(10),
            retry_budget: 3,
            port: 53,
        }
    }
}

impl TunnelConfig {
    /// Loads a config file, falling back to defaults for any field the file
    /// omits (every field has `#[serde(default)]` semantics via the
    /// container-level `default`).
    pub fn load(path: &std::path::Path) -> Result<Self, TunnelError> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| TunnelError::InvalidBaseHost(format!("invalid config file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_missing_leading_dot() {
        let d = BaseDomain::new("example.com").unwrap();
        assert_eq!(d.dotted(), ".example.com");
        assert_eq!(d.dotted_unprefixed(), "example.com");
    }

    #[test]
    fn keeps_explicit_leading_dot() {
        let d = BaseDomain::new(".t.io").unwrap();
        assert_eq!(d.dotted(), ".t.io");
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(BaseDomain::new("exa mple.com").is_err());
        assert!(BaseDomain::new("exa_mple.com").is_err());
    }

    #[test]
    fn rejects_oversized_label() {
        let label = "a".repeat(64);
        assert!(BaseDomain::new(&format!("{label}.com")).is_err());
    }

    #[test]
    fn prefixed_form_matches_dotted() {
        let d = BaseDomain::new("t.io").unwrap();
        let (back, _) = crate::wire::qname_prefixed_to_dotted(d.prefixed()).unwrap();
        assert_eq!(back, "t.io");
    }

    #[test]
    fn default_config_matches_builtin_defaults() {
        let cfg = TunnelConfig::default();
        assert_eq!(cfg.sender_timeout, Duration::from_secs(4));
        assert_eq!(cfg.receiver_timeout, Duration::from_secs(10));
        assert_eq!(cfg.retry_budget, 3);
        assert_eq!(cfg.port, 53);
    }
}
