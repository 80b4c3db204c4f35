//! Concurrency test: parallel store and load against one store instance.
//!
//! Validates distinct-key writes all land, same-key writes never tear, and
//! a load issued after a completed store observes it.

use std::sync::Arc;
use std::thread;

use ledger_identity::{
    FileUserStore, MemoryUserStore, User, UserIdentity, UserKey, UserStore,
};

fn make_user(msp_id: &str, name: &str, cert: String) -> UserIdentity {
    UserIdentity::builder(msp_id, name)
        .enrollment_certificate(cert.into_bytes())
        .role("client")
        .build()
        .expect("identity should build")
}

fn distinct_keys(store: Arc<dyn UserStore>) {
    let mut handles = Vec::new();
    for thread_id in 0..16 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let name = format!("user-{thread_id}-{i}");
                store
                    .store(&make_user("Org1MSP", &name, format!("cert-{thread_id}-{i}")))
                    .expect("store should succeed");
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.keys().unwrap().len(), 400);
    for thread_id in 0..16 {
        for i in 0..25 {
            let key = UserKey::new("Org1MSP", format!("user-{thread_id}-{i}"));
            let loaded = store.load(&key).expect("every stored key should load");
            assert_eq!(
                loaded.enrollment_certificate(),
                format!("cert-{thread_id}-{i}").as_bytes()
            );
        }
    }
}

/// Writers race on one key; every read must see one writer's complete value.
fn same_key_no_torn_reads(store: Arc<dyn UserStore>) {
    let key = UserKey::new("Org1MSP", "admin");
    store
        .store(&make_user("Org1MSP", "admin", "writer-0-0".repeat(64)))
        .unwrap();

    let mut handles = Vec::new();
    for writer in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                let cert = format!("writer-{writer}-{i}").repeat(64);
                store.store(&make_user("Org1MSP", "admin", cert)).unwrap();
            }
        }));
    }
    for _ in 0..4 {
        let store = Arc::clone(&store);
        let key = key.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let loaded = store.load(&key).expect("load should never fail mid-write");
                let cert = String::from_utf8(loaded.enrollment_certificate().to_vec()).unwrap();
                let unit = &cert[..cert.len() / 64];
                assert_eq!(cert, unit.repeat(64), "torn certificate: {cert}");
                assert_eq!(loaded.roles(), ["client"]);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.keys().unwrap(), vec![key]);
}

fn read_your_write(store: Arc<dyn UserStore>) {
    for i in 0..100 {
        let cert = format!("version-{i}");
        store
            .store(&make_user("Org3MSP", "rotating", cert.clone()))
            .unwrap();
        let loaded = store.load(&UserKey::new("Org3MSP", "rotating")).unwrap();
        assert_eq!(loaded.enrollment_certificate(), cert.as_bytes());
    }
}

#[test]
fn stress_memory_distinct_keys() {
    distinct_keys(Arc::new(MemoryUserStore::new()));
}

#[test]
fn stress_file_distinct_keys() {
    let dir = tempfile::tempdir().unwrap();
    distinct_keys(Arc::new(FileUserStore::open(dir.path()).unwrap()));
}

#[test]
fn stress_memory_same_key() {
    same_key_no_torn_reads(Arc::new(MemoryUserStore::new()));
}

#[test]
fn stress_file_same_key() {
    let dir = tempfile::tempdir().unwrap();
    same_key_no_torn_reads(Arc::new(FileUserStore::open(dir.path()).unwrap()));
}

#[test]
fn stress_memory_read_your_write() {
    read_your_write(Arc::new(MemoryUserStore::new()));
}

#[test]
fn stress_file_read_your_write() {
    let dir = tempfile::tempdir().unwrap();
    read_your_write(Arc::new(FileUserStore::open(dir.path()).unwrap()));
}
