use eyre::Context;
use hanko_config::logging::Configuration;
use std::env;
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, Layer, Registry};

fn default_targets(config: &Configuration) -> eyre::Result<Targets> {
    let level: LevelFilter = config
        .default_level
        .parse()
        .context("Failed to parse the default log level")?;

    Ok(Targets::default().with_default(level))
}

/// Install the global tracing subscriber
///
/// Targets are read from `RUST_LOG`, falling back to the configured default level
pub fn initialise_logging(config: &Configuration) -> eyre::Result<()> {
    let env_filter = match env::var("RUST_LOG") {
        Ok(targets) => targets
            .parse()
            .context("Failed to parse RUST_LOG value")?,
        Err(..) => default_targets(config)?,
    };

    let subscriber = Registry::default()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)
        .context("Couldn't install the global tracing subscriber")?;

    Ok(())
}
