//! Settings subsystem integration tests
//!
//! Exercises the full settings lifecycle through the application context:
//! startup defaults, shared-store mirroring, change notification, and the
//! per-account namespace sweep.

use brambling::AppContext;
use chrono::{TimeZone, Utc};
use settings::{AccountSetting, Setting, SettingValue, WriteCondition};
use storage::{PrefStore, PrefStoreConfig};
use tempfile::TempDir;

/// Helper to build a context with an in-memory primary and shared store
fn create_test_context() -> (AppContext, PrefStore, PrefStore) {
    let store = PrefStore::in_memory().unwrap();
    let shared = PrefStore::in_memory().unwrap();
    let ctx = AppContext::with_stores(store.clone(), Some(shared.clone()));
    (ctx, store, shared)
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn startup_registers_defaults_and_seeds_mirror() {
    let (ctx, store, shared) = create_test_context();

    ctx.initialize_settings(&[]);

    // Documented defaults land in the primary store only when absent
    assert_eq!(store.get::<bool>("EnableMessageCarbons").unwrap(), Some(true));
    assert_eq!(store.get::<String>("RosterItemsOrder").unwrap(), Some("alphabetical".to_string()));

    // Both mirror-subset keys were registered, so both get seeded
    assert_eq!(shared.get::<bool>("RosterDisplayHiddenGroup").unwrap(), Some(false));
    assert!(!shared.contains("EnableMessageCarbons").unwrap());
}

#[test]
fn startup_is_idempotent() {
    let (ctx, store, _) = create_test_context();

    ctx.settings().set_string(Setting::AppearanceTheme, Some("oriole"));
    ctx.initialize_settings(&[]);
    ctx.initialize_settings(&[]);

    assert_eq!(store.get::<String>("AppearanceTheme").unwrap(), Some("oriole".to_string()));
}

#[test]
fn bool_change_emits_exactly_one_event() {
    let (ctx, _, _) = create_test_context();
    let mut rx = ctx.bus().subscribe();

    ctx.settings().set_bool(Setting::MessageDeliveryReceiptsEnabled, true);
    ctx.settings().set_bool(Setting::MessageDeliveryReceiptsEnabled, true);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.key, "MessageDeliveryReceiptsEnabled");
    assert_eq!(event.old_value, Some(SettingValue::Bool(false)));
    assert_eq!(event.new_value, Some(SettingValue::Bool(true)));
    assert!(rx.try_recv().is_err());
}

#[test]
fn integer_writes_emit_no_events() {
    let (ctx, store, _) = create_test_context();
    let mut rx = ctx.bus().subscribe();

    for size in [256, 512, 1024] {
        ctx.settings().set_int(Setting::MaxImagePreviewSize, size);
    }

    assert!(rx.try_recv().is_err());
    assert_eq!(store.get::<i64>("MaxImagePreviewSize").unwrap(), Some(1024));
}

#[test]
fn mirror_tracks_primary_for_shared_keys_only() {
    let (ctx, store, shared) = create_test_context();

    ctx.settings().set_bool(Setting::SharingViaHttpUpload, true);
    ctx.settings().set_bool(Setting::EnableBookmarksSync, true);

    assert_eq!(
        shared.get::<bool>("SharingViaHttpUpload").unwrap(),
        store.get::<bool>("SharingViaHttpUpload").unwrap()
    );
    assert!(!shared.contains("EnableBookmarksSync").unwrap());
}

#[test]
fn conditional_date_write_discards_stale_sync_time() {
    let (ctx, _, _) = create_test_context();
    let account_settings = ctx.account_settings();
    let kind = AccountSetting::MessageSyncTime;

    let stored = Utc.timestamp_opt(100, 0).unwrap();
    account_settings.set_date("alice", kind, Some(stored), None);

    let older = Utc.timestamp_opt(50, 0).unwrap();
    account_settings.set_date("alice", kind, Some(older), Some(WriteCondition::OnlyIfNewer));
    assert_eq!(account_settings.get_date("alice", kind), Some(stored));

    let newer = Utc.timestamp_opt(150, 0).unwrap();
    account_settings.set_date("alice", kind, Some(newer), Some(WriteCondition::OnlyIfNewer));
    assert_eq!(account_settings.get_date("alice", kind), Some(newer));
}

#[test]
fn unset_date_is_absent_not_epoch_zero() {
    let (ctx, _, _) = create_test_context();
    assert_eq!(
        ctx.account_settings().get_date("alice", AccountSetting::MessageSyncTime),
        None
    );
}

#[test]
fn account_removal_is_prefix_boundary_exact() {
    let (ctx, store, _) = create_test_context();
    let account_settings = ctx.account_settings();

    account_settings.set_string("alice", AccountSetting::LastError, Some("timeout"));
    account_settings.set_string("alicexyz", AccountSetting::LastError, Some("timeout"));

    account_settings.remove_all("alice");

    assert!(!store.contains("Account-alice-LastError").unwrap());
    assert!(store.contains("Account-alicexyz-LastError").unwrap());
}

#[test]
fn startup_sweep_drops_unknown_accounts() {
    let (ctx, store, _) = create_test_context();
    let account_settings = ctx.account_settings();

    for account in ["a", "b", "c"] {
        account_settings.set_bool(account, AccountSetting::PushNotificationsForAway, true);
    }

    ctx.initialize_settings(&strings(&["a", "c"]));

    assert!(store.contains("Account-a-PushNotificationsForAway").unwrap());
    assert!(!store.contains("Account-b-PushNotificationsForAway").unwrap());
    assert!(store.contains("Account-c-PushNotificationsForAway").unwrap());
}

#[test]
fn account_settings_publish_no_events() {
    let (ctx, _, _) = create_test_context();
    let mut rx = ctx.bus().subscribe();

    let account_settings = ctx.account_settings();
    account_settings.set_bool("alice", AccountSetting::MessageSyncAutomatic, true);
    account_settings.set_double("alice", AccountSetting::MessageSyncPeriod, 24.0);
    account_settings.set_string("alice", AccountSetting::LastError, Some("auth failure"));
    account_settings.remove_all("alice");

    assert!(rx.try_recv().is_err());
}

#[test]
fn on_disk_context_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.db");

    {
        let store = PrefStore::open(PrefStoreConfig::new(path.to_string_lossy())).unwrap();
        let ctx = AppContext::with_stores(store.clone(), None);
        ctx.settings().set_string(Setting::AppearanceTheme, Some("oriole"));
        store.flush().unwrap();
    }

    let store = PrefStore::open(PrefStoreConfig::new(path.to_string_lossy())).unwrap();
    let ctx = AppContext::with_stores(store, None);
    assert_eq!(ctx.settings().get_string(Setting::AppearanceTheme).as_deref(), Some("oriole"));
}

#[test]
fn server_features_roundtrip_through_context() {
    let (ctx, _, _) = create_test_context();
    let account_settings = ctx.account_settings();

    let features = strings(&["urn:xmpp:mam:2", "urn:xmpp:carbons:2", "urn:xmpp:push:0"]);
    account_settings.set_string_list(
        "alice@example.com",
        AccountSetting::KnownServerFeatures,
        Some(&features),
    );

    assert_eq!(
        account_settings.get_string_list("alice@example.com", AccountSetting::KnownServerFeatures),
        Some(features)
    );
}
