use std::fs;

use clap::Parser;
use eyre::WrapErr;
use tracing::info;

use crate::{
    cli::CLI,
    initializers::{init_chain, init_tracing, read_scenario},
    scenario::run_scenario,
};

mod cli;
mod initializers;
mod scenario;

fn main() -> eyre::Result<()> {
    let CLI { opts } = CLI::parse();
    init_tracing(&opts)?;

    let mut core = init_chain(opts.genesis.as_deref())?;
    let steps = read_scenario(&opts.scenario)?;
    info!(steps = steps.len(), "Running scenario");

    let output = run_scenario(&mut core, &steps)?;
    let json = serde_json::to_string_pretty(&output)?;

    match &opts.output {
        Some(path) => {
            fs::write(path, json)
                .wrap_err_with(|| format!("failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Wrote final state");
        }
        None => println!("{json}"),
    }
    Ok(())
}
