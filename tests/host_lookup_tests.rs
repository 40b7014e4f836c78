//! Integration tests driving the full collect/build/lookup pipeline with
//! realistic routing data.

use hostmap::{
    Arena, BuildError, CombinedTable, HashInit, KeyCollector, KeyFlags, KeyScale, MergePolicy,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn build(entries: &[(&str, &'static str)]) -> CombinedTable<&'static str> {
    let arena = Arena::unbounded();
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Small).unwrap();
    for &(key, value) in entries {
        keys.add_key(key, value, KeyFlags::default()).unwrap();
    }
    let init = HashInit::new("server_names", &arena, &temp);
    CombinedTable::build(&init, keys.finish()).unwrap()
}

#[test]
fn test_virtual_host_routing() {
    let hosts = build(&[
        ("example.com", "main"),
        ("www.example.com", "main"),
        ("api.example.com", "api-v2"),
        ("*.example.com", "catchall"),
        ("*.eu.example.com", "eu-cluster"),
        (".legacy.example.org", "legacy"),
        ("status.vendor.*", "status-page"),
    ]);

    // Exact names route directly.
    assert_eq!(hosts.find("example.com"), Some(&"main"));
    assert_eq!(hosts.find("www.example.com"), Some(&"main"));
    assert_eq!(hosts.find("api.example.com"), Some(&"api-v2"));

    // Wildcard catches unknown subdomains, deepest registration first.
    assert_eq!(hosts.find("cdn.example.com"), Some(&"catchall"));
    assert_eq!(hosts.find("fr.eu.example.com"), Some(&"eu-cluster"));
    assert_eq!(hosts.find("a.b.eu.example.com"), Some(&"eu-cluster"));

    // Leading dot covers the bare domain and subdomains.
    assert_eq!(hosts.find("legacy.example.org"), Some(&"legacy"));
    assert_eq!(hosts.find("old.legacy.example.org"), Some(&"legacy"));

    // Tail wildcard spans a single trailing label.
    assert_eq!(hosts.find("status.vendor.io"), Some(&"status-page"));
    assert_eq!(hosts.find("status.vendor.io.evil"), None);

    // Unrelated names miss every tier.
    assert_eq!(hosts.find("example.net"), None);
    assert_eq!(hosts.find("wwwexample.com"), None);
}

#[test]
fn test_media_type_table() {
    // Extension-to-type resolution: flat exact keys, no wildcard shapes.
    let extensions = [
        ("html", "text/html"),
        ("htm", "text/html"),
        ("css", "text/css"),
        ("js", "application/javascript"),
        ("json", "application/json"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("svg", "image/svg+xml"),
        ("woff2", "font/woff2"),
        ("wasm", "application/wasm"),
        ("txt", "text/plain"),
    ];

    let arena = Arena::unbounded();
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Small).unwrap();
    for &(ext, mime) in &extensions {
        keys.add_key(ext, mime, KeyFlags::exact_only()).unwrap();
    }
    let init = HashInit::new("media_types", &arena, &temp).with_bucket_size(128);
    let types = CombinedTable::build(&init, keys.finish()).unwrap();

    for &(ext, mime) in &extensions {
        assert_eq!(types.find(ext), Some(&mime), "extension {}", ext);
    }
    assert_eq!(types.find("HTML"), Some(&"text/html"));
    assert_eq!(types.find("exe"), None);
}

#[test]
fn test_read_only_keys_reject_reconfiguration() {
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Small).unwrap();
    keys.add_key("admin.example.com", "admin", KeyFlags::read_only())
        .unwrap();
    let err = keys
        .add_key("admin.example.com", "spoofed", KeyFlags::read_only())
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateKey(_)));
}

#[test]
fn test_reject_policy_surfaces_config_clashes() {
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Small)
        .unwrap()
        .with_merge_policy(MergePolicy::Reject);
    keys.add_key("example.com", 1u32, KeyFlags::default()).unwrap();
    assert!(matches!(
        keys.add_key("example.com", 2u32, KeyFlags::default()),
        Err(BuildError::DuplicateKey(_))
    ));
}

#[test]
fn test_large_key_set_round_trips() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut names: Vec<String> = (0..1200)
        .map(|i| {
            let tld = ["com", "net", "org", "io"][rng.gen_range(0..4)];
            format!("host-{}.zone-{}.{}", i, rng.gen_range(0..40), tld)
        })
        .collect();
    names.shuffle(&mut rng);

    let arena = Arena::unbounded();
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Large).unwrap();
    for (i, name) in names.iter().enumerate() {
        keys.add_key(name, i, KeyFlags::default()).unwrap();
    }
    let init = HashInit::new("large_set", &arena, &temp)
        .with_max_size(16384)
        .with_bucket_size(128);
    let hosts = CombinedTable::build(&init, keys.finish()).unwrap();

    for (i, name) in names.iter().enumerate() {
        assert_eq!(hosts.find(name), Some(&i), "missing {}", name);
    }
    assert_eq!(hosts.find("host-1200.zone-0.com"), None);
}

#[test]
fn test_small_arena_fails_large_build() {
    let arena = Arena::new(256);
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Small).unwrap();
    for i in 0..200 {
        keys.add_key(&format!("h{}.example.com", i), i, KeyFlags::default())
            .unwrap();
    }
    let init = HashInit::new("tight", &arena, &temp);
    let err = CombinedTable::build(&init, keys.finish()).unwrap_err();
    assert!(matches!(err, BuildError::AllocationFailure { .. }));
}

#[test]
fn test_max_size_too_small_is_reported() {
    let arena = Arena::unbounded();
    let temp = Arena::unbounded();
    let mut keys = KeyCollector::new(&temp, KeyScale::Small).unwrap();
    for i in 0..64 {
        keys.add_key(&format!("h{}.example.com", i), i, KeyFlags::default())
            .unwrap();
    }
    let init = HashInit::new("cramped", &arena, &temp).with_max_size(4);
    match CombinedTable::build(&init, keys.finish()) {
        Err(BuildError::NoFeasibleBucketSize { name, max_size, .. }) => {
            assert_eq!(name, "cramped");
            assert_eq!(max_size, 4);
        }
        other => panic!("expected NoFeasibleBucketSize, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_shared_reads_after_publication() {
    let hosts = std::sync::Arc::new(build(&[
        ("www.example.com", "site"),
        ("*.example.com", "tenant"),
    ]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let hosts = std::sync::Arc::clone(&hosts);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    assert_eq!(hosts.find("www.example.com"), Some(&"site"));
                    assert_eq!(hosts.find("x.example.com"), Some(&"tenant"));
                    assert_eq!(hosts.find("nowhere.net"), None);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
