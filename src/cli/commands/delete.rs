//! `neng-pass delete`: remove a password from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_engine, unlock, Cli};
use crate::errors::{NengPassError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let engine = open_engine(cli)?;

    if !engine.contains_password(name)? {
        return Err(NengPassError::NotFound(name.to_string()));
    }

    // Only the key holder may remove entries.
    unlock(&engine)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete password '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| NengPassError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    engine.delete_password(name)?;
    output::success(&format!("Deleted password '{name}'"));

    Ok(())
}
