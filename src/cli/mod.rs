//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::engine::Engine;
use crate::errors::{NengPassError, Result};

/// Environment variable holding the master key for scripted use.
pub const MASTER_KEY_ENV: &str = "NENG_PASS_MASTER_KEY";

/// neng-pass: a personal password manager protected by one master key.
#[derive(Parser)]
#[command(
    name = "neng-pass",
    about = "Personal password manager protected by a single master key",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: the platform data dir, e.g. ~/.local/share/neng-pass)
    #[arg(long, env = "NENG_PASS_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Set the master key (one-time setup)
    SetMaster,

    /// Generate a new password and save it under NAME
    New {
        /// Password name (e.g. github)
        name: String,
        /// Password length (default: generated_length from settings)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Save a password you choose (add or overwrite)
    Set {
        /// Password name
        name: String,
        /// Password value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Decrypt and show a password
    Get {
        /// Password name
        name: String,
        /// Print only the value, nothing else
        #[arg(long)]
        raw: bool,
        /// Copy the value to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// List all stored password names
    List,

    /// Delete a password
    Delete {
        /// Password name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print a random password without saving it
    Generate {
        /// Password length (default: generated_length from settings)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Show where data lives and whether a master key is set
    Status,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// The data directory selected by `--data-dir` / `NENG_PASS_DATA_DIR`,
/// falling back to the platform default.
pub fn data_dir(cli: &Cli) -> PathBuf {
    Settings::resolve_data_dir(cli.data_dir.as_deref())
}

/// Load settings from the data directory and open the engine.
pub fn open_engine(cli: &Cli) -> Result<Engine> {
    let dir = data_dir(cli);
    let settings = Settings::load(&dir)?;
    Engine::open(settings, &dir)
}

/// Get the master key, trying in order:
/// 1. `NENG_PASS_MASTER_KEY` env var (scripting)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the key is wiped from memory on drop.
pub fn prompt_master_key() -> Result<Zeroizing<String>> {
    if let Some(key) = master_key_from_env() {
        return Ok(key);
    }

    let key = dialoguer::Password::new()
        .with_prompt("Enter master key")
        .interact()
        .map_err(|e| NengPassError::CommandFailed(format!("master key prompt: {e}")))?;
    Ok(Zeroizing::new(key))
}

/// Prompt for a new master key twice and require both entries to match.
///
/// Also respects `NENG_PASS_MASTER_KEY` for scripted setup.
pub fn prompt_new_master_key() -> Result<Zeroizing<String>> {
    if let Some(key) = master_key_from_env() {
        return Ok(key);
    }

    let first = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Choose master key")
            .interact()
            .map_err(|e| NengPassError::CommandFailed(format!("master key prompt: {e}")))?,
    );
    let second = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Confirm master key")
            .interact()
            .map_err(|e| NengPassError::CommandFailed(format!("master key prompt: {e}")))?,
    );

    if *first != *second {
        return Err(NengPassError::PasswordMismatch);
    }
    Ok(first)
}

/// Obtain the master key and check it against the stored record.
///
/// Fails with `MasterKeyNotSet` before prompting if setup has not run,
/// and with `WrongMasterKey` on mismatch.
pub fn unlock(engine: &Engine) -> Result<Zeroizing<String>> {
    if !engine.is_master_key_set()? {
        return Err(NengPassError::MasterKeyNotSet);
    }

    let key = prompt_master_key()?;
    if !engine.is_master_key_correct(&key)? {
        return Err(NengPassError::WrongMasterKey);
    }
    Ok(key)
}

fn master_key_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(MASTER_KEY_ENV) {
        Ok(key) if !key.is_empty() => Some(Zeroizing::new(key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn get_flags_parse() {
        let cli = Cli::try_parse_from(["neng-pass", "get", "github", "--raw"]).unwrap();
        match cli.command {
            Commands::Get { name, raw, copy } => {
                assert_eq!(name, "github");
                assert!(raw);
                assert!(!copy);
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn verbosity_counts_repeats() {
        let cli = Cli::try_parse_from(["neng-pass", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
