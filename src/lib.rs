//! Brambling application context
//!
//! Wires the preference stores, the settings change bus, and the typed
//! settings façades into one injectable context. Collaborators (UI,
//! connection management, background sync) receive this context instead of
//! reaching for process-global state.

#![warn(missing_docs)]
#![warn(clippy::all)]

use settings::{AccountSettings, GlobalSettings, SettingsBus};
use storage::{PrefStore, PrefStoreConfig, StoreError};
use tracing_subscriber::EnvFilter;

/// Application context owning the settings subsystem
///
/// The shared store is optional: it exists only in environments where an
/// extension process needs read access to the mirrored keys.
#[derive(Clone)]
pub struct AppContext {
    settings: GlobalSettings,
    account_settings: AccountSettings,
    bus: SettingsBus,
}

impl AppContext {
    /// Open the on-disk preference store and build the context
    ///
    /// `shared` configures the mirror store for the extension-visible
    /// subset of keys; pass `None` when no extension is installed.
    pub fn open(
        config: PrefStoreConfig,
        shared: Option<PrefStoreConfig>,
    ) -> Result<Self, StoreError> {
        let store = PrefStore::open(config)?;
        let shared = shared.map(PrefStore::open).transpose()?;
        Ok(Self::with_stores(store, shared))
    }

    /// Build the context over already-open stores
    pub fn with_stores(store: PrefStore, shared: Option<PrefStore>) -> Self {
        let bus = SettingsBus::new();
        let settings = GlobalSettings::new(store.clone(), shared, bus.clone());
        let account_settings = AccountSettings::new(store);
        Self { settings, account_settings, bus }
    }

    /// Run the startup sequence for the settings subsystem
    ///
    /// Registers global defaults, seeds the shared mirror, and sweeps
    /// settings of accounts not in `known_accounts`. Call after the account
    /// list has been loaded; calling before would sweep valid accounts.
    pub fn initialize_settings(&self, known_accounts: &[String]) {
        self.settings.initialize();
        self.account_settings.initialize(known_accounts);
    }

    /// Global settings façade
    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Per-account settings façade
    pub fn account_settings(&self) -> &AccountSettings {
        &self.account_settings
    }

    /// The settings change bus
    pub fn bus(&self) -> &SettingsBus {
        &self.bus
    }
}

/// Initialize tracing with env-filter support
///
/// Reads `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
