use std::thread::JoinHandle;

use anyhow::Context;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use rppal::i2c::I2c;
use tracing::{debug, info, trace, warn};

use crate::{
    config::Config,
    driver::{nxp::lm75a::Lm75a, ThreadDelay},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub celsius: f32,
}

pub fn spawn_thread(
    config: Config,
    shutdown_rx: flume::Receiver<()>,
    reading_tx: flume::Sender<Reading>,
) -> JoinHandle<anyhow::Result<()>> {
    std::thread::spawn(move || {
        let i2c = I2c::with_bus(config.bus)
            .with_context(|| format!("failed to open i2c bus {}", config.bus))?;
        let mut sensor = Lm75a::with_address(i2c, config.address);

        configure(&mut sensor, &config)?;
        info!(
            "monitoring lm75a at {:#04x} on i2c bus {}",
            sensor.address(),
            config.bus
        );

        run(&mut sensor, &config, &shutdown_rx, &reading_tx)
    })
}

/// Writes the configured mode and thresholds.
pub fn configure<I2C, E>(sensor: &mut Lm75a<I2C>, config: &Config) -> anyhow::Result<()>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    E: std::fmt::Debug + Send + Sync + 'static,
{
    sensor
        .set_comp_int_polarity_mode(config.mode(), config.polarity())
        .context("failed to write configuration register")?;
    debug!("lm75a mode = {:?}", sensor.mode());

    if let Some(thresholds) = config.thresholds {
        if thresholds.hysteresis > thresholds.overtemp {
            warn!(
                "hysteresis threshold {} °C is above overtemperature threshold {} °C",
                thresholds.hysteresis, thresholds.overtemp
            );
        }

        sensor
            .set_temp_threshold(thresholds.hysteresis, thresholds.overtemp)
            .context("failed to write thresholds")?;
    }

    if config.one_shot {
        sensor.shutdown().context("failed to shut down sensor")?;
    }

    Ok(())
}

/// Samples the sensor every `config.interval` until shutdown is requested or
/// nobody is listening for readings.
pub fn run<I2C, E>(
    sensor: &mut Lm75a<I2C>,
    config: &Config,
    shutdown_rx: &flume::Receiver<()>,
    reading_tx: &flume::Sender<Reading>,
) -> anyhow::Result<()>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    E: std::fmt::Debug + Send + Sync + 'static,
{
    let mut delay = ThreadDelay;

    loop {
        let celsius = if config.one_shot {
            sensor.measure_one_shot(&mut delay)
        } else {
            sensor.read_temperature()
        }
        .context("failed to read temperature")?;

        trace!("read {celsius} °C");

        if reading_tx.send(Reading { celsius }).is_err() {
            debug!("reading channel closed");
            break;
        }

        match shutdown_rx.recv_timeout(config.interval) {
            Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => break,
            Err(flume::RecvTimeoutError::Timeout) => {}
        }
    }

    debug!("exiting monitor loop");

    Ok(())
}
