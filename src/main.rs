#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! coicop-query: look up and full-text search COICOP consumption categories.

mod catalog;
mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, OutputCtx, write_error};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::info!(?cli, "Parsed arguments");

    let ctx = OutputCtx::new(cli.width);

    if let Err(err) = commands::dispatch(&cli.command, &cli.db, &ctx) {
        let code = err.exit_code();
        write_error(&anyhow::Error::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--verbose` selects info.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}
