//! TOML configuration for building a ring.
//!
//! ```toml
//! [ring]
//! replication = 100
//! owners = ["10.0.0.1:11211", "10.0.0.2:11211"]
//!
//! [log]
//! level = "info"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ring::Ring;
use crate::sync_ring::SyncRing;

/// Virtual nodes per owner when the config does not say.
pub const DEFAULT_REPLICATION: usize = 160;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Ring shape and initial members.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Virtual nodes per owner. Must be at least 1.
    pub replication: usize,
    /// Owners inserted when the ring is built, in order.
    pub owners: Vec<String>,
}

impl Default for RingSection {
    fn default() -> Self {
        Self {
            replication: DEFAULT_REPLICATION,
            owners: Vec::new(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RingConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Build a ring holding every configured owner.
    ///
    /// Owners are added with [`Ring::insert_checked`], so a collision fails
    /// the whole build without leaving a half-added owner behind.
    pub fn build_ring(&self) -> Result<Ring, ConfigError> {
        let mut ring = Ring::new(self.ring.replication)?;
        for owner in &self.ring.owners {
            ring.insert_checked(owner)?;
        }
        Ok(ring)
    }

    /// Like [`build_ring`](Self::build_ring), wrapped in a [`SyncRing`].
    pub fn build_sync_ring(&self) -> Result<SyncRing, ConfigError> {
        self.build_ring().map(SyncRing::from_ring)
    }
}
