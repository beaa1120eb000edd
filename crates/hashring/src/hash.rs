//! Ring position hashing.
//!
//! Every position on the ring is a CRC-32/IEEE checksum. Owners are spread
//! over the ring by hashing one virtual key per replica: `"{owner}.{index}"`
//! with `index` counting from 1.

/// Separator between an owner and its replica index in a virtual key.
pub const REPLICA_SEPARATOR: char = '.';

/// Compute the 32-bit ring position of arbitrary bytes.
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Build the virtual key for replica `index` of `owner`.
pub fn virtual_key(owner: &str, index: usize) -> String {
    format!("{owner}{REPLICA_SEPARATOR}{index}")
}

/// Ring position of replica `index` of `owner`.
pub fn replica_position(owner: &str, index: usize) -> u32 {
    checksum(virtual_key(owner, index).as_bytes())
}
