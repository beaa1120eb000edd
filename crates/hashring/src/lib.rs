//! Consistent hashing ring for routing keys to named owners.
//!
//! Owners (servers, shards) are placed on a `u32` ring at the CRC-32
//! checksums of their virtual keys, `"{owner}.{index}"` for each of
//! `replication` replicas. A key belongs to the owner of the first position
//! at or after the key's checksum, wrapping around past the top of the ring.
//! Adding or removing an owner only moves the keys that owner gains or loses.
//!
//! - [`Ring`] — the unsynchronized ring.
//! - [`SyncRing`] — a `RwLock` wrapper for shared use across threads.
//! - [`service`] — a ring owned by a tokio task, driven through [`RingHandle`].
//! - [`RingConfig`] — TOML configuration that builds a populated ring.

mod config;
mod error;
pub mod hash;
mod ring;
pub mod service;
mod sync_ring;

pub use config::{DEFAULT_REPLICATION, LogSection, RingConfig, RingSection};
pub use error::{ConfigError, RingError};
pub use ring::{Migration, Ring};
pub use service::RingHandle;
pub use sync_ring::SyncRing;
