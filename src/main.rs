//! CLI entry point for the photomosaic renderer

use clap::Parser;
use tessera::io::cli::{Cli, MosaicJob};

fn main() -> tessera::Result<()> {
    let cli = Cli::parse();
    let job = MosaicJob::new(cli);
    job.run()
}
