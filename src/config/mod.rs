//! Configuration loading (`neng-pass.toml`).

pub mod settings;

pub use settings::{BackendKind, Settings};
