use std::time::Instant;

use clap::Parser;

use kmersplit::args::Cli;
use kmersplit::orchestrator::RunConfig;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let start = Instant::now();

    let config = RunConfig::from_cli(&cli)?;
    config.run()?;

    if verbose {
        eprintln!("done in {:.2?}", start.elapsed());
    }
    Ok(())
}
