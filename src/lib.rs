//! neng-pass: a personal password vault engine.
//!
//! One master key protects a vault of named passwords.  The key is never
//! stored: a salted verifier checks candidates, and each entry is
//! encrypted with AES-256-GCM under a key derived from the master key
//! and the entry's name.  See [`engine::Engine`] for the public surface.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod errors;
pub mod generator;
pub mod master_key;
pub mod storage;
pub mod vault;

pub use engine::Engine;
pub use errors::{NengPassError, Result, ValidationError};
