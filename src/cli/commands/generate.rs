//! `neng-pass generate`: print a random password without storing it.

use crate::cli::{data_dir, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::generator;

/// Execute the `generate` command.
pub fn execute(cli: &Cli, length: Option<usize>) -> Result<()> {
    let length = match length {
        Some(n) => n,
        None => Settings::load(&data_dir(cli))?.generated_length,
    };

    let password = generator::generate_with_length(length)?;
    println!("{}", password.as_str());

    Ok(())
}
