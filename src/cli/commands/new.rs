//! `neng-pass new`: generate a password and store it under a name.

use crate::cli::output;
use crate::cli::{open_engine, unlock, Cli};
use crate::errors::{NengPassError, Result};
use crate::generator;

/// Execute the `new` command.
pub fn execute(cli: &Cli, name: &str, length: Option<usize>) -> Result<()> {
    let engine = open_engine(cli)?;

    let max = engine.settings().max_password_len;
    if let Some(n) = length {
        if n == 0 || n > max {
            return Err(NengPassError::ConfigError(format!(
                "--length must be between 1 and {max}, got {n}"
            )));
        }
    }

    let key = unlock(&engine)?;

    let password = match length {
        Some(n) => generator::generate_with_length(n)?,
        None => engine.generate_password()?,
    };

    let existed = engine.contains_password(name)?;
    engine.save_password(&key, name, &password)?;

    if existed {
        output::success(&format!("Password '{name}' replaced"));
    } else {
        output::success(&format!("Password '{name}' created"));
    }
    output::secret(&password);

    Ok(())
}
