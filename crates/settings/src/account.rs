//! Per-account settings
//!
//! A typed façade over the same preference store for settings keyed by
//! account. Keys are namespaced by flattening the account id into the
//! storage key (`Account-<id>-<Kind>`). Unlike [`crate::GlobalSettings`],
//! this family publishes no change events and performs no equality gating;
//! subscribers interested in per-account state poll or re-read.

use chrono::{DateTime, Utc};
use storage::PrefStore;
use tracing::{debug, warn};

/// Namespace prefix for all per-account keys
const ACCOUNT_PREFIX: &str = "Account-";

/// The closed vocabulary of per-account setting kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountSetting {
    /// Automatically fetch message archive on connect (bool)
    MessageSyncAutomatic,
    /// Message archive sync window in hours (double)
    MessageSyncPeriod,
    /// Timestamp of the last synchronized message (date)
    MessageSyncTime,
    /// Deliver push notifications while the account is away (bool)
    PushNotificationsForAway,
    /// Last connection error message (string)
    LastError,
    /// Cached server feature identifiers (string list)
    KnownServerFeatures,
}

impl AccountSetting {
    /// Every kind in the vocabulary
    pub const ALL: [AccountSetting; 6] = [
        AccountSetting::MessageSyncAutomatic,
        AccountSetting::MessageSyncPeriod,
        AccountSetting::MessageSyncTime,
        AccountSetting::PushNotificationsForAway,
        AccountSetting::LastError,
        AccountSetting::KnownServerFeatures,
    ];

    /// Kind name as embedded in the storage key
    pub fn name(self) -> &'static str {
        match self {
            AccountSetting::MessageSyncAutomatic => "MessageSyncAutomatic",
            AccountSetting::MessageSyncPeriod => "MessageSyncPeriod",
            AccountSetting::MessageSyncTime => "MessageSyncTime",
            AccountSetting::PushNotificationsForAway => "PushNotificationsForAway",
            AccountSetting::LastError => "LastError",
            AccountSetting::KnownServerFeatures => "KnownServerFeatures",
        }
    }
}

/// Condition attached to a date write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Discard the write unless the new date is strictly newer than the
    /// stored one
    OnlyIfNewer,
    /// Discard the write unless the new date is strictly older than the
    /// stored one
    OnlyIfOlder,
}

/// Flat storage key for an (account, kind) pair
///
/// Injective as long as kind names stay a closed vocabulary: two pairs map
/// to the same key only when both account id and kind match.
pub fn effective_key(account: &str, setting: AccountSetting) -> String {
    format!("{}{}-{}", ACCOUNT_PREFIX, account, setting.name())
}

fn account_namespace(account: &str) -> String {
    format!("{}{}-", ACCOUNT_PREFIX, account)
}

/// Façade over the primary store for per-account settings
///
/// Dates are stored as fractional epoch seconds; `0` doubles as the absent
/// sentinel, so an explicitly written epoch-zero date reads back as absent.
/// Long-standing behavior, kept as-is.
#[derive(Clone)]
pub struct AccountSettings {
    store: PrefStore,
}

impl AccountSettings {
    /// Create the façade over the primary store
    pub fn new(store: PrefStore) -> Self {
        Self { store }
    }

    /// Get a string value
    pub fn get_string(&self, account: &str, setting: AccountSetting) -> Option<String> {
        self.read(account, setting)
    }

    /// Get a boolean value; absent resolves to `false`
    pub fn get_bool(&self, account: &str, setting: AccountSetting) -> bool {
        self.read(account, setting).unwrap_or(false)
    }

    /// Get a floating-point value; absent resolves to `0.0`
    pub fn get_double(&self, account: &str, setting: AccountSetting) -> f64 {
        self.read(account, setting).unwrap_or(0.0)
    }

    /// Get a date value; absent (or the stored sentinel `0`) resolves to
    /// `None`
    pub fn get_date(&self, account: &str, setting: AccountSetting) -> Option<DateTime<Utc>> {
        let epoch = self.get_double(account, setting);
        if epoch == 0.0 {
            None
        } else {
            DateTime::from_timestamp_millis((epoch * 1000.0) as i64)
        }
    }

    /// Get a string-list value
    pub fn get_string_list(&self, account: &str, setting: AccountSetting) -> Option<Vec<String>> {
        self.read(account, setting)
    }

    /// Set a boolean value, unconditionally
    pub fn set_bool(&self, account: &str, setting: AccountSetting, value: bool) {
        self.write(account, setting, &value);
    }

    /// Set a floating-point value, unconditionally
    pub fn set_double(&self, account: &str, setting: AccountSetting, value: f64) {
        self.write(account, setting, &value);
    }

    /// Set or remove a date value
    ///
    /// `None` removes the key. With a [`WriteCondition`], the write is
    /// silently discarded when the stored date does not satisfy it; a
    /// discarded write is not an error.
    pub fn set_date(
        &self,
        account: &str,
        setting: AccountSetting,
        value: Option<DateTime<Utc>>,
        condition: Option<WriteCondition>,
    ) {
        let key = effective_key(account, setting);
        let Some(value) = value else {
            self.remove(&key);
            return;
        };

        let new_epoch = value.timestamp_millis() as f64 / 1000.0;
        let stored_epoch = self.get_double(account, setting);
        match condition {
            Some(WriteCondition::OnlyIfNewer) if stored_epoch >= new_epoch => return,
            Some(WriteCondition::OnlyIfOlder) if stored_epoch <= new_epoch => return,
            _ => {}
        }

        if let Err(err) = self.store.set(&key, &new_epoch) {
            warn!(key = %key, %err, "failed to write account setting");
        }
    }

    /// Set or remove a string value; `None` removes the key
    pub fn set_string(&self, account: &str, setting: AccountSetting, value: Option<&str>) {
        match value {
            Some(value) => self.write(account, setting, &value),
            None => self.remove(&effective_key(account, setting)),
        }
    }

    /// Set or remove a string-list value; `None` removes the key
    pub fn set_string_list(
        &self,
        account: &str,
        setting: AccountSetting,
        value: Option<&[String]>,
    ) {
        match value {
            Some(value) => self.write(account, setting, &value),
            None => self.remove(&effective_key(account, setting)),
        }
    }

    /// Remove every stored setting belonging to an account
    ///
    /// No-op when the account has nothing stored.
    pub fn remove_all(&self, account: &str) {
        let namespace = account_namespace(account);
        let keys = match self.store.keys_with_prefix(&namespace) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(account, %err, "failed to enumerate account settings");
                return;
            }
        };
        for key in keys {
            self.remove(&key);
        }
    }

    /// Garbage-collect settings of accounts that no longer exist
    ///
    /// Scans the whole `Account-` namespace and deletes every key whose
    /// embedded account id is not in `known_accounts`. Intended to run once
    /// at startup, after the account list has been loaded, never before.
    pub fn initialize(&self, known_accounts: &[String]) {
        let keys = match self.store.keys_with_prefix(ACCOUNT_PREFIX) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(%err, "failed to enumerate account settings");
                return;
            }
        };

        let namespaces: Vec<String> =
            known_accounts.iter().map(|account| account_namespace(account)).collect();

        let mut removed = 0usize;
        for key in keys {
            if !namespaces.iter().any(|ns| key.starts_with(ns.as_str())) {
                self.remove(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "swept stale account settings");
        }
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        account: &str,
        setting: AccountSetting,
    ) -> Option<T> {
        let key = effective_key(account, setting);
        match self.store.get(&key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, %err, "failed to read account setting");
                None
            }
        }
    }

    fn write<T: serde::Serialize>(&self, account: &str, setting: AccountSetting, value: &T) {
        let key = effective_key(account, setting);
        if let Err(err) = self.store.set(&key, value) {
            warn!(key = %key, %err, "failed to write account setting");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, %err, "failed to remove account setting");
        }
    }
}
