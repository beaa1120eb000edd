//! Integration test: ring membership scenarios.
//!
//! Builds rings through the public API only and checks placement counts,
//! ordering, wraparound and the stability of keys across membership changes.

use hashring::hash::{checksum, replica_position};
use hashring::{Ring, RingError};
use hashring_integration_tests::{OWNERS, distribution, init_tracing, populated_ring, random_keys};

fn is_strictly_ascending(ring: &Ring) -> bool {
    ring.positions().windows(2).all(|w| w[0] < w[1])
}

#[test]
fn test_reinsert_single_replica_owner_collides() {
    init_tracing();
    let mut ring = Ring::new(1).unwrap();
    ring.insert("hello").unwrap();
    assert!(matches!(
        ring.insert("hello"),
        Err(RingError::Collision { ref owner, .. }) if owner == "hello"
    ));
}

#[test]
fn test_hundred_replicas_fourteen_owners() {
    init_tracing();
    let ring = populated_ring(100, &OWNERS);
    assert_eq!(ring.len(), 1400);
    assert!(is_strictly_ascending(&ring));

    let owner = ring.find("anything").unwrap();
    assert!(OWNERS.contains(&owner));
}

#[test]
fn test_remove_one_of_fourteen() {
    init_tracing();
    let mut ring = populated_ring(2, &OWNERS);
    let removed = OWNERS[3];

    ring.remove(removed);

    assert_eq!(ring.len(), 26);
    assert!(is_strictly_ascending(&ring));
    for index in 1..=2 {
        assert!(!ring.positions().contains(&replica_position(removed, index)));
    }
    for owner in OWNERS.iter().filter(|&&o| o != removed) {
        assert!(ring.contains_owner(owner));
    }
}

#[test]
fn test_zero_replication_rejected() {
    assert!(matches!(
        Ring::new(0),
        Err(RingError::InvalidConfiguration { replication: 0 })
    ));
}

#[test]
fn test_find_before_insert_fails() {
    let ring = Ring::new(1).unwrap();
    assert_eq!(ring.find("hello"), Err(RingError::EmptyRing));
}

#[test]
fn test_remove_never_inserted_owner() {
    init_tracing();
    let mut ring = populated_ring(2, &["A", "B"]);
    let before = ring.positions().to_vec();

    assert_eq!(ring.remove("C"), 0);
    assert_eq!(ring.positions(), before.as_slice());
    assert_eq!(ring.owners(), vec!["A", "B"]);
}

#[test]
fn test_count_invariant_through_churn() {
    init_tracing();
    let m = 7;
    let mut ring = Ring::new(m).unwrap();

    for (n, owner) in OWNERS.iter().enumerate() {
        ring.insert(owner).unwrap();
        assert_eq!(ring.len(), m * (n + 1));
        assert!(is_strictly_ascending(&ring));
    }
    for (n, owner) in OWNERS.iter().enumerate() {
        assert_eq!(ring.remove(owner), m);
        assert_eq!(ring.len(), m * (OWNERS.len() - n - 1));
        assert!(is_strictly_ascending(&ring));
    }
    assert!(ring.is_empty());
    assert_eq!(ring.find("k"), Err(RingError::EmptyRing));
}

#[test]
fn test_key_past_last_position_wraps() {
    let ring = populated_ring(3, &OWNERS[..4]);
    let last = *ring.positions().last().unwrap();
    let first_owner = ring.owner_at(ring.positions()[0]).unwrap();

    let key = random_keys(11, 100_000)
        .into_iter()
        .find(|k| checksum(k.as_bytes()) > last)
        .expect("some key hashes past the last position");
    assert_eq!(ring.find(&key).unwrap(), first_owner);
}

#[test]
fn test_distribution_approaches_even_share() {
    init_tracing();
    let ring = populated_ring(160, &OWNERS);
    let keys = random_keys(99, 50_000);
    let counts = distribution(&keys, |k| ring.find(k).unwrap().to_string());

    assert_eq!(counts.len(), OWNERS.len(), "every owner should receive keys");
    let expected = 1.0 / OWNERS.len() as f64;
    for (owner, count) in &counts {
        let share = *count as f64 / keys.len() as f64;
        assert!(
            (expected / 3.0..=expected * 2.5).contains(&share),
            "{owner} received {share:.3}, expected about {expected:.3}"
        );
    }
}

#[test]
fn test_adding_owner_moves_keys_only_to_it() {
    init_tracing();
    let old = populated_ring(100, &OWNERS[..5]);
    let mut new = old.clone();
    new.insert(OWNERS[5]).unwrap();

    let keys = random_keys(3, 5_000);
    let migrations = Ring::diff(&old, &new, &keys);

    assert!(!migrations.is_empty());
    for m in &migrations {
        assert_eq!(m.to, OWNERS[5]);
        assert_ne!(m.from, OWNERS[5]);
    }

    // Roughly 1/6 of keys should move.
    let ratio = migrations.len() as f64 / keys.len() as f64;
    assert!((0.05..=0.4).contains(&ratio), "moved {ratio:.2} of keys");
}

#[test]
fn test_preference_list_starts_with_primary() {
    let ring = populated_ring(40, &OWNERS);
    for key in random_keys(8, 200) {
        let owners = ring.find_n(&key, 3).unwrap();
        assert_eq!(owners.len(), 3);
        assert_eq!(owners[0], ring.find(&key).unwrap());
    }
}
