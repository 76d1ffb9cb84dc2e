//! Settings management for Brambling
//!
//! This crate provides the typed preference façades: global settings with
//! change notification and a shared-store mirror, and per-account settings
//! with namespace garbage collection.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod events;
pub mod global;

pub use account::{AccountSetting, AccountSettings, WriteCondition};
pub use events::{SettingChange, SettingValue, SettingsBus};
pub use global::{GlobalSettings, Setting};
