use anyhow::Context;
use lm75a::{config::Config, monitor};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    debug!("{config:?}");

    let (shutdown_tx, shutdown_rx) = flume::bounded(1);
    let (reading_tx, reading_rx) = flume::bounded(16);

    ctrlc::set_handler(move || {
        info!("received ctrl+c, exiting");
        let _ = shutdown_tx.try_send(());
    })?;

    let unit = config.unit;
    let monitor_join = monitor::spawn_thread(config, shutdown_rx, reading_tx);

    for reading in reading_rx.iter() {
        info!("temperature: {:.1} {unit}", unit.convert(reading.celsius));
    }

    monitor_join
        .join()
        .map_err(|_| anyhow::anyhow!("monitor thread panicked"))??;

    info!("exit");

    Ok(())
}
