//! Settings change notification bus
//!
//! A process-wide publish/subscribe channel for settings changes. The bus
//! is an explicit, injectable object owned by the application context
//! rather than a hidden global; subscribers (UI, background sync) hold a
//! receiver for their own lifecycle. Delivery is synchronous and
//! fire-and-forget: events are not persisted and only reach subscribers
//! that exist at publish time.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 64;

/// A settings value as carried in change events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    String(String),
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

/// A change event for a single global setting
///
/// Carries the flat key name plus the old and new values where present
/// (a first write has no old value, a removal has no new value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingChange {
    /// Flat storage key of the setting that changed
    pub key: String,
    /// Value before the write, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<SettingValue>,
    /// Value after the write, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<SettingValue>,
}

/// Cloneable handle to the settings change bus
#[derive(Clone)]
pub struct SettingsBus {
    tx: broadcast::Sender<SettingChange>,
}

impl SettingsBus {
    /// Create a new bus with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new bus with a custom channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to settings changes
    ///
    /// The receiver only sees events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.tx.subscribe()
    }

    /// Publish a change event to all current subscribers
    ///
    /// Publishing with zero subscribers is a no-op, not an error.
    pub fn publish(&self, change: SettingChange) {
        let _ = self.tx.send(change);
    }

    /// Number of currently-attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SettingsBus {
    fn default() -> Self {
        Self::new()
    }
}
