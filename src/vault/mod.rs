//! Vault module: encrypted password storage.
//!
//! This module provides:
//! - `VaultEntry`, `EntryMetadata` and `VaultKdf` types (`entry`)
//! - High-level `VaultStore` for saving, reading, listing and deleting (`store`)

pub mod entry;
pub mod store;

// Re-export the most commonly used items.
pub use entry::{EntryMetadata, VaultEntry, VaultKdf};
pub use store::{VaultLimits, VaultStore};
