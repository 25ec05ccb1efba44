//! `neng-pass list`: show every stored password name.

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `list` command.  Names are not secret, so no key is needed.
pub fn execute(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let entries = engine.get_password_metadata()?;

    if !entries.is_empty() {
        output::info(&format!("{} password(s)", entries.len()));
    }
    output::print_entries_table(&entries);

    Ok(())
}
