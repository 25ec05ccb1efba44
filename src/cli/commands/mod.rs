//! One module per subcommand; each exposes an `execute` function.

pub mod completions;
pub mod delete;
pub mod generate;
pub mod get;
pub mod list;
pub mod new;
pub mod set;
pub mod set_master;
pub mod status;
