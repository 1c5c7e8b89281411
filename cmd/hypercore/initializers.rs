use std::{fs::File, io::BufReader, path::Path};

use eyre::WrapErr;
use hypercore_bridge::HyperCore;
use hypercore_common::types::Genesis;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Registry, filter::Directive, fmt, layer::SubscriberExt};

use crate::{cli::Options, scenario::Step};

pub fn init_tracing(opts: &Options) -> eyre::Result<()> {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(opts.log_level))
        .from_env_lossy();

    // Logs go to stderr so the state dump on stdout stays valid JSON
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    let subscriber = Registry::default().with(log_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("setting default subscriber failed")
}

/// Builds the chain from the genesis file, or from the default genesis when none is given.
pub fn init_chain(genesis_path: Option<&Path>) -> eyre::Result<HyperCore> {
    let core = match genesis_path {
        Some(path) => {
            info!(path = %path.display(), "Loading genesis");
            HyperCore::from_genesis_file(path)
                .wrap_err_with(|| format!("failed to load genesis from {}", path.display()))?
        }
        None => {
            warn!("No genesis file given, using the default genesis");
            HyperCore::new(&Genesis::default())?
        }
    };
    Ok(core)
}

pub fn read_scenario(path: &Path) -> eyre::Result<Vec<Step>> {
    let file = File::open(path)
        .wrap_err_with(|| format!("failed to open scenario {}", path.display()))?;
    let steps: Vec<Step> = serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("failed to decode scenario {}", path.display()))?;
    Ok(steps)
}
