// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn populated() -> SessionStore {
    let store = SessionStore::in_memory();
    store.write(SessionPatch::default().access("a0").refresh("r1").tenant(7));
    store
}

#[test]
fn starts_empty() {
    let store = SessionStore::in_memory();
    assert!(store.read().is_empty());
    assert_eq!(store.generation(), 0);
}

#[test]
fn write_merges_only_provided_fields() {
    let store = populated();
    store.write(SessionPatch::default().access("A"));

    let session = store.read();
    assert_eq!(session.access.as_deref(), Some("A"));
    assert_eq!(session.refresh.as_deref(), Some("r1"));
    assert_eq!(session.tenant, Some(7));
}

#[test]
fn clear_empties_everything() {
    let store = populated();
    store.clear();
    assert_eq!(store.read(), Session::default());
}

#[test]
fn generation_tracks_access_changes_only() {
    let store = populated();
    let g = store.generation();

    assert_eq!(store.write(SessionPatch::default().tenant(9)), g);
    assert_eq!(store.write(SessionPatch::default().refresh("r2")), g);
    assert_eq!(store.write(SessionPatch::default().access("a0")), g);
    assert_eq!(store.write(SessionPatch::default().access("a1")), g + 1);
    assert_eq!(store.clear(), g + 2);
    assert_eq!(store.clear(), g + 3);
}

#[test]
fn empty_credential_removes_it() -> anyhow::Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::open(storage.clone());
    store.write(SessionPatch::default().access("a0").refresh("r1"));
    store.write(SessionPatch::default().access(""));

    assert_eq!(store.read().access, None);
    assert_eq!(store.read().refresh.as_deref(), Some("r1"));
    assert_eq!(storage.get(ACCESS_KEY)?, None);
    Ok(())
}

#[test]
fn writes_through_to_three_keys() -> anyhow::Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::open(storage.clone());
    store.write(SessionPatch::default().access("a0").refresh("r1").tenant(42));

    assert_eq!(storage.get(ACCESS_KEY)?.as_deref(), Some("a0"));
    assert_eq!(storage.get(REFRESH_KEY)?.as_deref(), Some("r1"));
    assert_eq!(storage.get(TENANT_KEY)?.as_deref(), Some("42"));

    store.clear();
    for key in [ACCESS_KEY, REFRESH_KEY, TENANT_KEY] {
        assert_eq!(storage.get(key)?, None, "{key} should be cleared");
    }
    Ok(())
}

#[test]
fn reopen_reconstructs_session() {
    let storage = Arc::new(MemoryStorage::new());
    SessionStore::open(storage.clone())
        .write(SessionPatch::default().access("a0").refresh("r1").tenant(3));

    let reopened = SessionStore::open(storage);
    let session = reopened.read();
    assert_eq!(session.access.as_deref(), Some("a0"));
    assert_eq!(session.refresh.as_deref(), Some("r1"));
    assert_eq!(session.tenant, Some(3));
}

#[test]
fn malformed_tenant_is_ignored_on_open() {
    let storage = Arc::new(MemoryStorage::with_entries(&[
        (ACCESS_KEY, "a0"),
        (TENANT_KEY, "not-a-number"),
    ]));
    let session = SessionStore::open(storage).read();
    assert_eq!(session.access.as_deref(), Some("a0"));
    assert_eq!(session.tenant, None);
}

#[test]
fn debug_redacts_credentials() {
    let store = populated();
    let rendered = format!("{:?}", store.read());
    assert!(!rendered.contains("a0"));
    assert!(!rendered.contains("r1"));
    assert!(rendered.contains("<redacted>"));
    assert!(rendered.contains('7'));
}

#[test]
fn summary_hides_values() -> anyhow::Result<()> {
    let summary = populated().read().summary();
    assert_eq!(
        summary,
        SessionSummary { authenticated: true, renewable: true, tenant: Some(7) }
    );
    let json = serde_json::to_string(&summary)?;
    assert!(!json.contains("a0"));
    Ok(())
}
