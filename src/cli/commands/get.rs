//! `neng-pass get`: decrypt and print (or copy) a single password.

use crate::cli::output;
use crate::cli::{open_engine, unlock, Cli};
use crate::errors::{NengPassError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str, raw: bool, copy: bool) -> Result<()> {
    let engine = open_engine(cli)?;

    // Report a missing name before asking for the key.
    if !engine.contains_password(name)? {
        return Err(NengPassError::NotFound(name.to_string()));
    }

    let key = unlock(&engine)?;
    let password = engine.get_password(&key, name)?;

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| NengPassError::CommandFailed(format!("clipboard: {e}")))?;
        clipboard
            .set_text(password.as_str())
            .map_err(|e| NengPassError::CommandFailed(format!("clipboard: {e}")))?;
        output::success(&format!("Copied '{name}' to the clipboard"));
    } else if raw {
        println!("{}", password.as_str());
    } else {
        output::info(&format!("{name}:"));
        output::secret(&password);
    }

    Ok(())
}
