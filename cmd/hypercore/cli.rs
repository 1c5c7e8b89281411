use std::path::PathBuf;

use clap::Parser as ClapParser;
use tracing::Level;

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(name = "hypercore-sim", author, version = VERSION_STRING, about = "Runs a ledger bridge scenario against a simulated chain", long_about = None)]
pub struct CLI {
    #[clap(flatten)]
    pub opts: Options,
}

#[derive(ClapParser, Debug)]
pub struct Options {
    #[arg(long = "genesis", value_name = "GENESIS_FILE_PATH")]
    pub genesis: Option<PathBuf>,
    #[arg(long = "scenario", value_name = "SCENARIO_FILE_PATH")]
    pub scenario: PathBuf,
    #[arg(
        long = "output",
        value_name = "OUTPUT_FILE_PATH",
        help = "Where to write the final state. Printed to stdout when missing."
    )]
    pub output: Option<PathBuf>,
    #[arg(long = "log.level", default_value_t = Level::INFO, value_name = "LOG_LEVEL")]
    pub log_level: Level,
}
