//! `neng-pass status`: where the data lives and what state it is in.

use console::style;

use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let backend = engine.backend();

    let master = if engine.is_master_key_set()? {
        style("set").green()
    } else {
        style("not set").yellow()
    };

    println!("{}", style("neng-pass").bold());
    println!("  Location:   {}", backend.location().display());
    println!("  Backend:    {}", backend.kind());
    println!("  Master key: {master}");
    println!("  Passwords:  {}", engine.get_password_list()?.len());

    Ok(())
}
