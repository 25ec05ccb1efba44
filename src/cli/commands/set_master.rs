//! `neng-pass set-master`: one-time master key setup.

use crate::cli::output;
use crate::cli::{open_engine, prompt_new_master_key, Cli};
use crate::errors::{Result, ValidationError};

/// Execute the `set-master` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;

    // Fail before prompting; `set_master_key` re-checks under the lock.
    if engine.is_master_key_set()? {
        return Err(ValidationError::AlreadySet.into());
    }

    let key = prompt_new_master_key()?;
    engine.set_master_key(&key)?;

    output::success("Master key set.");
    output::tip("Run `neng-pass new <NAME>` to generate and store a password.");

    Ok(())
}
