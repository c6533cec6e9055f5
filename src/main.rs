use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mealswipe::cli::{self, Cli};
use mealswipe::config::Config;
use mealswipe::storage::Storage;

/// Logs go to stderr so stdout stays clean for command output.
fn setup_logging(verbose: bool) {
    let default = if verbose { "mealswipe=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("MEALSWIPE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let root = Storage::default_root().unwrap_or_else(|| {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    });

    let storage = match Storage::new(root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli, &config, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
