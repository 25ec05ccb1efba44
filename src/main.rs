use clap::Parser;
use nengpass::cli::{commands, output, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Commands::SetMaster => commands::set_master::execute(&cli),
        Commands::New { ref name, length } => commands::new::execute(&cli, name, length),
        Commands::Set {
            ref name,
            ref value,
        } => commands::set::execute(&cli, name, value.as_deref()),
        Commands::Get {
            ref name,
            raw,
            copy,
        } => commands::get::execute(&cli, name, raw, copy),
        Commands::List => commands::list::execute(&cli),
        Commands::Delete { ref name, force } => commands::delete::execute(&cli, name, force),
        Commands::Generate { length } => commands::generate::execute(&cli, length),
        Commands::Status => commands::status::execute(&cli),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never mix with passwords printed on stdout.
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}
