//! Basic Store — build an identity, persist it, load it back.
//!
//! Run with:
//!   cargo run --example basic_store -p ledger-identity

use std::sync::Arc;

use ledger_identity::crypto::Ed25519PrivateKey;
use ledger_identity::{
    FileUserStore, IdentityContext, MemoryKeyStore, User, UserIdentity, UserKey, UserStore,
};

fn main() -> ledger_identity::Result<()> {
    // ── 1. Build an identity after enrollment ──────────────────────────────
    //
    // The certificate would come from the CA; the key handle from the
    // crypto suite. Here both are stand-ins.
    let handle = Ed25519PrivateKey::generate_handle();
    let admin = UserIdentity::builder("Org1MSP", "admin")
        .enrollment_certificate(b"-----BEGIN CERTIFICATE-----\n...\n".to_vec())
        .private_key(handle.clone())
        .role("admin")
        .build()?;
    println!("Built {}", admin.user_key());
    println!("  Serialized identity: {} bytes", admin.identity()?.len());
    println!();

    // ── 2. Persist it ──────────────────────────────────────────────────────
    //
    // The file store writes the certificate and roles, plus the key's SKI.
    // The key itself stays with the key store.
    let keys = Arc::new(MemoryKeyStore::new());
    keys.register_handle(&handle)?;

    let dir = std::env::temp_dir().join("ledger-identity-example");
    let store = FileUserStore::open(&dir)?.with_key_resolver(keys);
    store.store(&admin)?;
    println!("Stored under {}", store.user_path(&admin.user_key()).display());

    // ── 3. Load it back ────────────────────────────────────────────────────
    let loaded = store.load(&UserKey::new("Org1MSP", "admin"))?;
    println!("Loaded {}", loaded.user_key());
    println!("  Roles:      {:?}", loaded.roles());
    println!("  Can sign:   {}", loaded.private_key().is_valid());

    // ── 4. Not found is its own error ──────────────────────────────────────
    match store.load(&UserKey::new("Org1MSP", "nobody")) {
        Err(e) if e.is_not_found() => println!("nobody@Org1MSP: not enrolled yet"),
        other => println!("unexpected: {other:?}"),
    }

    store.remove(&admin.user_key())?;
    store.close();
    Ok(())
}
