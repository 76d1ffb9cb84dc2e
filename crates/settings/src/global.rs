//! Global, account-independent settings
//!
//! A typed façade over the preference store for the fixed vocabulary of
//! application-wide settings. Boolean and string writes are equality-gated
//! and broadcast a change event; integer writes persist unconditionally and
//! stay silent. Two keys are mirrored into the shared store so the
//! notification service extension can read them without access to the
//! primary store.

use storage::PrefStore;
use tracing::{debug, warn};

use crate::events::{SettingChange, SettingValue, SettingsBus};

/// The closed vocabulary of global setting keys
///
/// The flat key names stored on disk are the variant names; they must not
/// change, existing installs depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Drop local history when a chat is closed
    DeleteChatHistoryOnChatClose,
    /// Enable XEP-0280 message carbons
    EnableMessageCarbons,
    /// Presence show value (chat/away/dnd/...)
    StatusType,
    /// Free-text presence status message
    StatusMessage,
    /// Roster presentation style
    RosterType,
    /// Roster sorting order
    RosterItemsOrder,
    /// Hide unavailable contacts in the roster
    RosterAvailableOnly,
    /// Show the hidden-contacts group
    RosterDisplayHiddenGroup,
    /// Auto-subscribe back on accepted subscription requests
    AutoSubscribeOnAcceptedSubscriptionRequest,
    /// Push notification device token
    DeviceToken,
    /// Show notifications for messages from unknown senders
    NotificationsFromUnknown,
    /// Number of message preview lines on the recents screen
    RecentsMessageLinesNo,
    /// Ordering of the recents screen
    RecentsOrder,
    /// Share files via XEP-0363 HTTP upload
    SharingViaHttpUpload,
    /// Maximum size of inline image previews
    MaxImagePreviewSize,
    /// Request XEP-0184 delivery receipts
    MessageDeliveryReceiptsEnabled,
    /// Collapse file links when a preview is shown
    SimplifiedLinkToFileIfPreviewIsAvailable,
    /// Return key sends the message
    SendMessageOnReturn,
    /// Include timestamps when copying messages
    CopyMessagesWithTimestamps,
    /// Enable XMPP stream pipelining
    XmppPipelining,
    /// UI appearance theme
    AppearanceTheme,
    /// Synchronize bookmarks with the server
    EnableBookmarksSync,
}

impl Setting {
    /// Every key in the vocabulary
    pub const ALL: [Setting; 22] = [
        Setting::DeleteChatHistoryOnChatClose,
        Setting::EnableMessageCarbons,
        Setting::StatusType,
        Setting::StatusMessage,
        Setting::RosterType,
        Setting::RosterItemsOrder,
        Setting::RosterAvailableOnly,
        Setting::RosterDisplayHiddenGroup,
        Setting::AutoSubscribeOnAcceptedSubscriptionRequest,
        Setting::DeviceToken,
        Setting::NotificationsFromUnknown,
        Setting::RecentsMessageLinesNo,
        Setting::RecentsOrder,
        Setting::SharingViaHttpUpload,
        Setting::MaxImagePreviewSize,
        Setting::MessageDeliveryReceiptsEnabled,
        Setting::SimplifiedLinkToFileIfPreviewIsAvailable,
        Setting::SendMessageOnReturn,
        Setting::CopyMessagesWithTimestamps,
        Setting::XmppPipelining,
        Setting::AppearanceTheme,
        Setting::EnableBookmarksSync,
    ];

    /// Flat storage key for this setting
    pub fn key(self) -> &'static str {
        match self {
            Setting::DeleteChatHistoryOnChatClose => "DeleteChatHistoryOnChatClose",
            Setting::EnableMessageCarbons => "EnableMessageCarbons",
            Setting::StatusType => "StatusType",
            Setting::StatusMessage => "StatusMessage",
            Setting::RosterType => "RosterType",
            Setting::RosterItemsOrder => "RosterItemsOrder",
            Setting::RosterAvailableOnly => "RosterAvailableOnly",
            Setting::RosterDisplayHiddenGroup => "RosterDisplayHiddenGroup",
            Setting::AutoSubscribeOnAcceptedSubscriptionRequest => {
                "AutoSubscribeOnAcceptedSubscriptionRequest"
            }
            Setting::DeviceToken => "DeviceToken",
            Setting::NotificationsFromUnknown => "NotificationsFromUnknown",
            Setting::RecentsMessageLinesNo => "RecentsMessageLinesNo",
            Setting::RecentsOrder => "RecentsOrder",
            Setting::SharingViaHttpUpload => "SharingViaHttpUpload",
            Setting::MaxImagePreviewSize => "MaxImagePreviewSize",
            Setting::MessageDeliveryReceiptsEnabled => "MessageDeliveryReceiptsEnabled",
            Setting::SimplifiedLinkToFileIfPreviewIsAvailable => {
                "SimplifiedLinkToFileIfPreviewIsAvailable"
            }
            Setting::SendMessageOnReturn => "SendMessageOnReturn",
            Setting::CopyMessagesWithTimestamps => "CopyMessagesWithTimestamps",
            Setting::XmppPipelining => "XmppPipelining",
            Setting::AppearanceTheme => "AppearanceTheme",
            Setting::EnableBookmarksSync => "EnableBookmarksSync",
        }
    }

    /// Whether this key is mirrored into the shared store
    pub fn is_shared(self) -> bool {
        matches!(self, Setting::RosterDisplayHiddenGroup | Setting::SharingViaHttpUpload)
    }

    /// Documented default registered by `initialize()`, if any
    ///
    /// Keys without a registered default fall back to the type zero value
    /// (`false`, `None`, `0`).
    fn registered_default(self) -> Option<SettingValue> {
        match self {
            Setting::DeleteChatHistoryOnChatClose => Some(SettingValue::Bool(false)),
            Setting::EnableMessageCarbons => Some(SettingValue::Bool(true)),
            Setting::RosterType => Some(SettingValue::String("flat".to_string())),
            Setting::RosterItemsOrder => Some(SettingValue::String("alphabetical".to_string())),
            Setting::RosterAvailableOnly => Some(SettingValue::Bool(false)),
            Setting::RosterDisplayHiddenGroup => Some(SettingValue::Bool(false)),
            Setting::AutoSubscribeOnAcceptedSubscriptionRequest => {
                Some(SettingValue::Bool(false))
            }
            Setting::NotificationsFromUnknown => Some(SettingValue::Bool(true)),
            Setting::RecentsMessageLinesNo => Some(SettingValue::Int(2)),
            Setting::RecentsOrder => Some(SettingValue::String("byTime".to_string())),
            Setting::SendMessageOnReturn => Some(SettingValue::Bool(true)),
            Setting::AppearanceTheme => Some(SettingValue::String("classic".to_string())),
            _ => None,
        }
    }
}

/// Façade over the primary store for global settings
///
/// Reads never fail: a missing key or an unavailable store resolves to the
/// registered default (or the type zero value). Write failures are logged
/// and swallowed; surfacing store health is the store owner's concern.
#[derive(Clone)]
pub struct GlobalSettings {
    store: PrefStore,
    shared: Option<PrefStore>,
    bus: SettingsBus,
}

impl GlobalSettings {
    /// Create the façade over a primary store, an optional shared mirror
    /// store, and the change bus
    pub fn new(store: PrefStore, shared: Option<PrefStore>, bus: SettingsBus) -> Self {
        Self { store, shared, bus }
    }

    /// The change bus events are published on
    pub fn bus(&self) -> &SettingsBus {
        &self.bus
    }

    /// Register documented defaults and seed the shared mirror
    ///
    /// Writes each documented default only if the key is absent, so calling
    /// this repeatedly never clobbers values the user has set. Afterwards,
    /// every currently-present key belonging to the shared subset is copied
    /// into the shared store, bringing the mirror up to date for an
    /// extension that may have missed earlier writes.
    pub fn initialize(&self) {
        for setting in Setting::ALL {
            let Some(default) = setting.registered_default() else { continue };
            match self.store.contains(setting.key()) {
                Ok(true) => {}
                Ok(false) => {
                    let result = match &default {
                        SettingValue::Bool(v) => self.store.set(setting.key(), v),
                        SettingValue::Int(v) => self.store.set(setting.key(), v),
                        SettingValue::String(v) => self.store.set(setting.key(), v),
                    };
                    if let Err(err) = result {
                        warn!(key = setting.key(), %err, "failed to register default");
                    }
                }
                Err(err) => warn!(key = setting.key(), %err, "failed to probe setting"),
            }
        }

        let Some(shared) = &self.shared else { return };
        for setting in Setting::ALL.into_iter().filter(|s| s.is_shared()) {
            match self.store.get::<serde_json::Value>(setting.key()) {
                Ok(Some(value)) => {
                    if let Err(err) = shared.set(setting.key(), &value) {
                        warn!(key = setting.key(), %err, "failed to seed shared store");
                    } else {
                        debug!(key = setting.key(), "seeded shared store");
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(key = setting.key(), %err, "failed to read setting"),
            }
        }
    }

    /// Get a boolean setting; absent resolves to the registered default,
    /// else `false`
    pub fn get_bool(&self, setting: Setting) -> bool {
        let default = match setting.registered_default() {
            Some(SettingValue::Bool(v)) => v,
            _ => false,
        };
        match self.store.get::<bool>(setting.key()) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!(key = setting.key(), %err, "failed to read setting");
                default
            }
        }
    }

    /// Get a string setting; absent resolves to the registered default,
    /// else `None`
    pub fn get_string(&self, setting: Setting) -> Option<String> {
        let default = match setting.registered_default() {
            Some(SettingValue::String(v)) => Some(v),
            _ => None,
        };
        match self.store.get::<String>(setting.key()) {
            Ok(Some(value)) => Some(value),
            Ok(None) => default,
            Err(err) => {
                warn!(key = setting.key(), %err, "failed to read setting");
                default
            }
        }
    }

    /// Get an integer setting; absent resolves to the registered default,
    /// else `0`
    pub fn get_int(&self, setting: Setting) -> i64 {
        let default = match setting.registered_default() {
            Some(SettingValue::Int(v)) => v,
            _ => 0,
        };
        match self.store.get::<i64>(setting.key()) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!(key = setting.key(), %err, "failed to read setting");
                default
            }
        }
    }

    /// Set a boolean setting
    ///
    /// No-op when the value is unchanged; otherwise persists, mirrors if
    /// the key is shared, and publishes a change event.
    pub fn set_bool(&self, setting: Setting, value: bool) {
        let current = self.get_bool(setting);
        if current == value {
            return;
        }
        if let Err(err) = self.store.set(setting.key(), &value) {
            warn!(key = setting.key(), %err, "failed to write setting");
            return;
        }
        self.value_changed(setting, Some(current.into()), Some(value.into()));
    }

    /// Set or remove a string setting
    ///
    /// `None` removes the key. No-op when the value is unchanged; otherwise
    /// persists, mirrors if the key is shared, and publishes a change event.
    pub fn set_string(&self, setting: Setting, value: Option<&str>) {
        let current = self.get_string(setting);
        if current.as_deref() == value {
            return;
        }
        let result = match value {
            Some(v) => self.store.set(setting.key(), &v),
            None => self.store.remove(setting.key()).map(|_| ()),
        };
        if let Err(err) = result {
            warn!(key = setting.key(), %err, "failed to write setting");
            return;
        }
        self.value_changed(setting, current.map(SettingValue::String), value.map(Into::into));
    }

    /// Set an integer setting
    ///
    /// Integer writes persist unconditionally and publish no change event
    /// and no mirror update. The asymmetry with booleans and strings is
    /// long-standing behavior that subscribers rely on.
    pub fn set_int(&self, setting: Setting, value: i64) {
        if let Err(err) = self.store.set(setting.key(), &value) {
            warn!(key = setting.key(), %err, "failed to write setting");
        }
    }

    fn value_changed(
        &self,
        setting: Setting,
        old_value: Option<SettingValue>,
        new_value: Option<SettingValue>,
    ) {
        if setting.is_shared() {
            if let Some(shared) = &self.shared {
                let result = match &new_value {
                    Some(SettingValue::Bool(v)) => shared.set(setting.key(), v),
                    Some(SettingValue::Int(v)) => shared.set(setting.key(), v),
                    Some(SettingValue::String(v)) => shared.set(setting.key(), v),
                    None => shared.remove(setting.key()).map(|_| ()),
                };
                if let Err(err) = result {
                    warn!(key = setting.key(), %err, "failed to mirror setting");
                }
            }
        }
        self.bus.publish(SettingChange {
            key: setting.key().to_string(),
            old_value,
            new_value,
        });
    }
}
