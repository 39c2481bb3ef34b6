//! memfis-probe binary.
//!
//! ```bash
//! memfis-probe ./some/dir --glob '*/*.rs' --probe
//! RUST_LOG=memfis=debug memfis-probe ./some/dir --check
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the listing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("memfis=info".parse()?))
        .init();

    let args = memfis_probe::Args::parse();
    let stdout = std::io::stdout();
    memfis_probe::run(&args, &mut stdout.lock())
}
