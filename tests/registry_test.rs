/// Per-session dashboard registry.

use std::sync::Arc;

use agreement_dashboard::api::{AgreementApi, SnapshotSource};
use agreement_dashboard::dashboard::{DashboardRegistry, DashboardSettings};

mod common;
use common::*;

fn registry(max_pages: usize) -> (DashboardRegistry, Arc<RecordingApi>) {
    let store = seeded_store();
    let recording = RecordingApi::new(store.clone());
    let api: Arc<dyn AgreementApi> = recording.clone();
    let snapshot: Arc<dyn SnapshotSource> = store;
    (DashboardRegistry::new(api, Some(snapshot), DashboardSettings::default(), max_pages), recording)
}

#[test]
fn test_new_keys_are_random_hex() {
    let a = DashboardRegistry::new_key();
    let b = DashboardRegistry::new_key();
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_same_key_returns_same_page() {
    let (registry, api) = registry(10);

    let first = registry.get_or_create("alice");
    assert_eq!(api.list_reads(), 0, "creating a page does not read");
    first.select_tab(4).await.expect("all tab");

    let again = registry.get_or_create("alice");
    assert_eq!(again.inspect(|p| p.active_tab().index()).await, 4);

    let other = registry.get_or_create("bob");
    assert_eq!(other.inspect(|p| p.active_tab().index()).await, 0);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_least_recently_used_page_is_evicted() {
    let (registry, _api) = registry(2);

    let a = registry.get_or_create("a");
    a.select_tab(2).await.expect("drafts");
    std::thread::sleep(std::time::Duration::from_millis(2));
    registry.get_or_create("b");
    std::thread::sleep(std::time::Duration::from_millis(2));
    registry.get_or_create("a");
    std::thread::sleep(std::time::Duration::from_millis(2));

    registry.get_or_create("c");
    assert_eq!(registry.len(), 2);

    // "a" survived; "b" comes back fresh
    let a = registry.get_or_create("a");
    assert_eq!(a.inspect(|p| p.active_tab().index()).await, 2);
    assert_eq!(registry.len(), 2);
}
