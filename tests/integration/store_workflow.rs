//! Integration test: the store contract against every backend.
//!
//! Each scenario runs once against `MemoryUserStore` and once against
//! `FileUserStore`, through `&dyn UserStore`, so both backends are held to
//! the same behavior.

use std::sync::Arc;

use ledger_identity::crypto::{Ed25519PrivateKey, KeyHandle};
use ledger_identity::{
    FileUserStore, IdentityContext, IdentityError, MemoryKeyStore, MemoryUserStore, User,
    UserIdentity, UserKey, UserStore,
};

const C1: &[u8] = b"-----BEGIN CERTIFICATE-----\nC1\n-----END CERTIFICATE-----\n";
const C2: &[u8] = b"-----BEGIN CERTIFICATE-----\nC2\n-----END CERTIFICATE-----\n";

fn with_each_backend(scenario: impl Fn(&dyn UserStore)) {
    let memory = MemoryUserStore::new();
    scenario(&memory);

    let dir = tempfile::tempdir().unwrap();
    let file = FileUserStore::open(dir.path()).unwrap();
    scenario(&file);
}

fn user(msp_id: &str, name: &str, cert: &[u8], roles: &[&str]) -> UserIdentity {
    UserIdentity::builder(msp_id, name)
        .enrollment_certificate(cert)
        .roles(roles.iter().copied())
        .build()
        .unwrap()
}

#[test]
fn concrete_admin_scenario() {
    with_each_backend(|store| {
        store
            .store(&user("Org1MSP", "admin", C1, &["admin"]))
            .expect("store should succeed");

        let loaded = store
            .load(&UserKey::new("Org1MSP", "admin"))
            .expect("load should succeed");
        assert_eq!(loaded.enrollment_certificate(), C1);
        assert_eq!(loaded.roles(), ["admin"]);

        let err = store
            .load(&UserKey::new("Org1MSP", "nonexistent"))
            .unwrap_err();
        assert!(
            matches!(err, IdentityError::UserNotFound(_)),
            "expected UserNotFound, got {err:?}"
        );
    });
}

#[test]
fn roundtrip_preserves_fields() {
    with_each_backend(|store| {
        let original = user("Org2MSP", "peer-operator", C1, &["peer", "client", "admin"]);
        store.store(&original).unwrap();

        let loaded = store.load(&original.user_key()).unwrap();
        assert_eq!(loaded.msp_id(), original.msp_id());
        assert_eq!(loaded.name(), original.name());
        assert_eq!(loaded.enrollment_certificate(), original.enrollment_certificate());
        assert_eq!(loaded.roles(), original.roles());
        assert_eq!(loaded.identity().unwrap(), original.identity().unwrap());
    });
}

#[test]
fn overwrite_leaves_only_second() {
    with_each_backend(|store| {
        let key = UserKey::new("Org1MSP", "admin");
        store.store(&user("Org1MSP", "admin", C1, &["admin"])).unwrap();
        store.store(&user("Org1MSP", "admin", C2, &[])).unwrap();

        let loaded = store.load(&key).unwrap();
        assert_eq!(loaded.enrollment_certificate(), C2);
        assert!(loaded.roles().is_empty(), "roles must be replaced, not merged");
        assert_eq!(store.keys().unwrap(), vec![key]);
    });
}

#[test]
fn lookup_is_exact() {
    with_each_backend(|store| {
        store.store(&user("Org1MSP", "admin", C1, &[])).unwrap();

        for miss in [
            UserKey::new("Org1MSP", "Admin"),
            UserKey::new("org1msp", "admin"),
            UserKey::new("Org1MSP", "admin "),
            UserKey::new("Org2MSP", "admin"),
        ] {
            assert!(
                store.load(&miss).unwrap_err().is_not_found(),
                "{miss} must not match admin@Org1MSP"
            );
        }
    });
}

#[test]
fn empty_msp_id_rejected_at_store() {
    struct RawUser;

    impl IdentityContext for RawUser {
        fn msp_id(&self) -> &str {
            ""
        }
        fn identity(&self) -> ledger_identity::Result<Vec<u8>> {
            Err(IdentityError::IdentityUnavailable("raw".into()))
        }
        fn private_key(&self) -> KeyHandle {
            KeyHandle::null()
        }
    }

    impl User for RawUser {
        fn name(&self) -> &str {
            "raw"
        }
        fn enrollment_certificate(&self) -> &[u8] {
            &[]
        }
        fn roles(&self) -> &[String] {
            &[]
        }
    }

    with_each_backend(|store| {
        let err = store.store(&RawUser).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidIdentity(_)));
        assert!(store.keys().unwrap().is_empty());
    });
}

#[test]
fn remove_then_reenroll() {
    with_each_backend(|store| {
        let key = UserKey::new("Org1MSP", "user1");
        store.store(&user("Org1MSP", "user1", C1, &[])).unwrap();
        store.remove(&key).unwrap();

        // Expected path for callers: not found triggers enrollment.
        let err = store.load(&key).unwrap_err();
        assert!(err.is_not_found());
        store.store(&user("Org1MSP", "user1", C2, &[])).unwrap();
        assert_eq!(store.load(&key).unwrap().enrollment_certificate(), C2);
    });
}

#[test]
fn closed_store_reports_closed() {
    with_each_backend(|store| {
        store.store(&user("Org1MSP", "admin", C1, &[])).unwrap();
        store.close();
        assert!(matches!(
            store.load(&UserKey::new("Org1MSP", "admin")),
            Err(IdentityError::StoreClosed)
        ));
    });
}

#[test]
fn signing_key_survives_file_roundtrip_via_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let keys = Arc::new(MemoryKeyStore::new());
    let handle = Ed25519PrivateKey::generate_handle();
    keys.register_handle(&handle).unwrap();

    let store = FileUserStore::open(dir.path())
        .unwrap()
        .with_key_resolver(keys);
    let admin = UserIdentity::builder("Org1MSP", "admin")
        .enrollment_certificate(C1)
        .private_key(handle.clone())
        .build()
        .unwrap();
    store.store(&admin).unwrap();

    // A fresh store over the same directory still rebinds the key.
    drop(store);
    let keys2 = Arc::new(MemoryKeyStore::new());
    keys2.register_handle(&handle).unwrap();
    let reopened = FileUserStore::open(dir.path())
        .unwrap()
        .with_key_resolver(keys2);
    let loaded = reopened.load(&admin.user_key()).unwrap();
    assert!(loaded.private_key().is_valid());
    assert_eq!(loaded.private_key().ski(), handle.ski());
}

#[test]
fn memory_store_keeps_handle_by_reference() {
    let store = MemoryUserStore::new();
    let handle = Ed25519PrivateKey::generate_handle();
    let admin = UserIdentity::builder("Org1MSP", "admin")
        .enrollment_certificate(C1)
        .private_key(handle.clone())
        .build()
        .unwrap();
    store.store(&admin).unwrap();

    let loaded = store.load(&admin.user_key()).unwrap();
    assert!(loaded.private_key().same_key(&handle));
}
