//! `neng-pass set`: store a password you choose.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_engine, unlock, Cli};
use crate::errors::{NengPassError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>) -> Result<()> {
    let engine = open_engine(cli)?;
    let key = unlock(&engine)?;

    // Determine the value from one of three sources.
    let password = if let Some(v) = value {
        output::warning("Value provided on command line; it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end_matches(['\n', '\r']).to_string())
    } else {
        let v = dialoguer::Password::new()
            .with_prompt(format!("Enter password for {name}"))
            .interact()
            .map_err(|e| NengPassError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(v)
    };

    let existed = engine.contains_password(name)?;
    engine.save_password(&key, name, &password)?;

    let total = engine.get_password_list()?.len();
    let verb = if existed { "updated" } else { "added" };
    output::success(&format!("Password '{name}' {verb} ({total} total)"));

    Ok(())
}
