//! Storage layer for Brambling
//!
//! This crate provides the synchronous key-value preference store
//! backing the settings façades.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;

pub use kv::{PrefStore, PrefStoreConfig, StoreError};
