//! Property-based and example-driven tests for [`occkey_engine::AllocationCoordinator`].

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use occkey_backend::{InMemoryBackend, KvBackend};
use occkey_core::types::OccurrenceKey;
use occkey_engine::{AllocationCoordinator, CoordinatorConfig};

fn coordinator() -> AllocationCoordinator {
    AllocationCoordinator::new(Arc::new(InMemoryBackend::new()), CoordinatorConfig::new())
}

fn fragment() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    /// Convergence: concurrent calls whose key sets pairwise share a
    /// fragment all return the same key.
    #[test]
    fn convergence_over_overlapping_key_sets(
        shared in fragment(),
        extras in proptest::collection::vec(fragment(), 0..4),
    ) {
        let coordinator = coordinator();
        let mut keys = BTreeSet::new();
        let (first, _) = coordinator.generate_key([shared.as_str()], Some("ds")).unwrap();
        keys.insert(first);

        for extra in &extras {
            let (key, _) = coordinator
                .generate_key([shared.as_str(), extra.as_str()], Some("ds"))
                .unwrap();
            keys.insert(key);
        }

        prop_assert_eq!(keys.len(), 1);
    }

    /// Disjointness: calls over disjoint natural-key sets never collide.
    #[test]
    fn disjointness_over_disjoint_key_sets(
        a in fragment(),
        b in fragment(),
    ) {
        prop_assume!(a != b);
        let coordinator = coordinator();
        let (key_a, _) = coordinator.generate_key([a.as_str()], Some("ds")).unwrap();
        let (key_b, _) = coordinator.generate_key([b.as_str()], Some("ds")).unwrap();
        prop_assert_ne!(key_a, key_b);
    }

    /// Idempotence: repeated calls over the same key set return the same
    /// integer, and `created` is `false` on every call after the first.
    #[test]
    fn idempotence_of_repeated_allocation(fragment in fragment(), repeats in 1usize..6) {
        let coordinator = coordinator();
        let (first, created_first) = coordinator.generate_key([fragment.as_str()], Some("ds")).unwrap();
        prop_assert!(created_first);

        for _ in 0..repeats {
            let (again, created_again) = coordinator.generate_key([fragment.as_str()], Some("ds")).unwrap();
            prop_assert_eq!(again, first);
            prop_assert!(!created_again);
        }

        prop_assert_eq!(coordinator.find_key([fragment.as_str()], Some("ds")).unwrap(), Some(first));
    }
}

/// Monotonicity: across a sequence of successful allocations in one process,
/// returned integers strictly increase.
#[test]
fn monotonicity_across_a_sequence_of_allocations() {
    let coordinator = coordinator();
    let mut last = 0;
    for i in 0..50 {
        let (key, created) = coordinator
            .generate_key([format!("frag-{i}")], Some("ds"))
            .unwrap();
        assert!(created);
        assert!(key.value() > last, "keys must strictly increase");
        last = key.value();
    }
}

/// Self-healing lookup: a row corrupted to a missing key is restored by
/// `find_key`; a row corrupted to a *different* key raises fatal inconsistency.
#[test]
fn self_healing_lookup_restores_or_detects_corruption() {
    let backend = Arc::new(InMemoryBackend::new());
    let coordinator = AllocationCoordinator::new(
        Arc::clone(&backend) as Arc<dyn KvBackend>,
        CoordinatorConfig::new(),
    );
    let (key, _) = coordinator.generate_key(["a", "b"], Some("ds")).unwrap();

    backend.corrupt_key("ds|a", None);
    assert_eq!(coordinator.find_key(["a"], Some("ds")).unwrap(), Some(key));
    assert_eq!(backend.get_key("ds|a").unwrap(), Some(key));

    backend.corrupt_key("ds|a", Some(OccurrenceKey::new(key.value() + 1)));
    let err = coordinator.find_key(["a", "b"], Some("ds")).unwrap_err();
    assert!(format!("{err}").contains("fatal inconsistency"));
}

/// Liveness under crash: a lock abandoned by a killed client does not block
/// another client forever; a fresh attempt succeeds once the lock goes stale.
#[test]
fn liveness_under_crash_recovers_via_stale_lock_takeover() {
    use std::time::{Duration, SystemTime};

    let backend = Arc::new(InMemoryBackend::new());
    let coordinator = AllocationCoordinator::new(
        Arc::clone(&backend) as Arc<dyn KvBackend>,
        CoordinatorConfig::new().with_stale_lock_time(Duration::from_millis(50)),
    );

    // Simulate a client that acquired the lock on "ds|x" and then crashed,
    // by force-aging the lock past the stale threshold.
    backend
        .check_and_put_lock("ds|x", occkey_core::types::LockToken::generate(), None)
        .unwrap();
    backend.force_lock_timestamp("ds|x", SystemTime::now() - Duration::from_millis(200));

    let (key, created) = coordinator.generate_key(["x"], Some("ds")).unwrap();
    assert!(created);
    assert_eq!(key.value(), 1);
}

/// Counter safety: across K parallel threads each allocating N distinct key
/// sets, the union of returned integers has cardinality K*N, no duplicates.
#[test]
fn counter_safety_under_parallel_allocation() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let coordinator = Arc::new(AllocationCoordinator::new(
        Arc::new(InMemoryBackend::new()),
        CoordinatorConfig::new().with_batch_size(10),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| {
                        coordinator
                            .generate_key([format!("t{t}-k{i}")], Some("ds"))
                            .unwrap()
                            .0
                            .value()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all_keys = BTreeSet::new();
    for handle in handles {
        for key in handle.join().unwrap() {
            assert!(all_keys.insert(key), "duplicate key {key} allocated");
        }
    }
    assert_eq!(all_keys.len(), THREADS * PER_THREAD);
}
