//! Error types for ring operations.

/// Errors produced by the hash ring and its wrappers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The ring was constructed with a replication factor below 1.
    #[error("replication factor must be 1 or greater, got {replication}")]
    InvalidConfiguration {
        /// The rejected replication factor.
        replication: usize,
    },

    /// A virtual node hashed onto a position that is already occupied.
    ///
    /// Replicas inserted before the collision by the same
    /// [`Ring::insert`](crate::Ring::insert) call stay in the ring.
    #[error("collision on {owner} hashed as {position}")]
    Collision {
        /// The owner being inserted.
        owner: String,
        /// The contested ring position.
        position: u32,
    },

    /// A lookup was attempted on a ring with no positions.
    #[error("ring is empty")]
    EmptyRing,

    /// A ring position has no owner mapping.
    #[error("no owner mapping for position {position}")]
    InternalConsistency {
        /// The orphaned position.
        position: u32,
    },

    /// The ring service task is no longer running.
    #[error("ring service stopped")]
    ServiceStopped,
}

/// Errors that can occur while loading a ring configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`RingConfig`](crate::RingConfig).
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured ring could not be built.
    #[error("ring error: {0}")]
    Ring(#[from] RingError),
}
