//! Monitor settings, read from `LM75A_*` environment variables.

use std::time::Duration;

use anyhow::{bail, ensure, Context};

use crate::{
    driver::nxp::lm75a::{register, FaultQueue, Mode},
    units::Unit,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub hysteresis: f32,
    pub overtemp: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bus: u8,
    pub address: u8,
    pub interval: Duration,
    pub unit: Unit,
    pub thresholds: Option<Thresholds>,
    pub interrupt_mode: bool,
    pub os_active_high: bool,
    pub fault_queue: FaultQueue,
    /// Keep the sensor shut down between samples
    pub one_shot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: 1,
            address: register::DEFAULT_ADDRESS,
            interval: Duration::from_millis(1000),
            unit: Unit::Celsius,
            thresholds: None,
            interrupt_mode: false,
            os_active_high: false,
            fault_queue: FaultQueue::Samples1,
            one_shot: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Some(bus) = lookup("LM75A_I2C_BUS") {
            config.bus = bus.trim().parse().context("invalid LM75A_I2C_BUS")?;
        }

        if let Some(address) = lookup("LM75A_ADDRESS") {
            let address = parse_u8(&address).context("invalid LM75A_ADDRESS")?;
            ensure!(
                register::ADDRESS_RANGE.contains(&address),
                "LM75A_ADDRESS {address:#04x} is outside {:#04x}..={:#04x}",
                register::ADDRESS_RANGE.start(),
                register::ADDRESS_RANGE.end()
            );
            config.address = address;
        }

        if let Some(interval) = lookup("LM75A_INTERVAL_MS") {
            let ms: u64 = interval
                .trim()
                .parse()
                .context("invalid LM75A_INTERVAL_MS")?;
            ensure!(ms > 0, "LM75A_INTERVAL_MS must be greater than zero");
            config.interval = Duration::from_millis(ms);
        }

        if let Some(unit) = lookup("LM75A_UNIT") {
            config.unit = unit.parse().context("invalid LM75A_UNIT")?;
        }

        config.thresholds = match (lookup("LM75A_HYSTERESIS"), lookup("LM75A_OVERTEMP")) {
            (Some(hysteresis), Some(overtemp)) => Some(Thresholds {
                hysteresis: parse_celsius(&hysteresis).context("invalid LM75A_HYSTERESIS")?,
                overtemp: parse_celsius(&overtemp).context("invalid LM75A_OVERTEMP")?,
            }),
            (None, None) => None,
            _ => bail!("LM75A_HYSTERESIS and LM75A_OVERTEMP must be set together"),
        };

        if let Some(v) = lookup("LM75A_INTERRUPT_MODE") {
            config.interrupt_mode = parse_bool(&v).context("invalid LM75A_INTERRUPT_MODE")?;
        }

        if let Some(v) = lookup("LM75A_OS_ACTIVE_HIGH") {
            config.os_active_high = parse_bool(&v).context("invalid LM75A_OS_ACTIVE_HIGH")?;
        }

        if let Some(v) = lookup("LM75A_FAULT_QUEUE") {
            let samples = v.trim().parse().context("invalid LM75A_FAULT_QUEUE")?;
            config.fault_queue = FaultQueue::from_samples(samples)
                .with_context(|| format!("LM75A_FAULT_QUEUE must be 1, 2, 4 or 6, got {samples}"))?;
        }

        if let Some(v) = lookup("LM75A_ONE_SHOT") {
            config.one_shot = parse_bool(&v).context("invalid LM75A_ONE_SHOT")?;
        }

        Ok(config)
    }

    /// The comparator/interrupt flag and the fault queue length.
    pub fn mode(&self) -> Mode {
        let mode = if self.interrupt_mode {
            Mode::COMP_INT
        } else {
            Mode::empty()
        };
        mode.with_fault_queue(self.fault_queue)
    }

    pub fn polarity(&self) -> Mode {
        if self.os_active_high {
            Mode::OS_POLARITY
        } else {
            Mode::empty()
        }
    }
}

fn parse_u8(s: &str) -> anyhow::Result<u8> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => s.parse()?,
    };
    Ok(value)
}

fn parse_celsius(s: &str) -> anyhow::Result<f32> {
    let value: f32 = s.trim().parse()?;
    ensure!(value.is_finite(), "{value} is not a finite temperature");
    Ok(value)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.address, 0x48);
        assert_eq!(config.mode(), Mode::empty());
        assert_eq!(config.polarity(), Mode::empty());
    }

    #[test]
    fn full() {
        let config = config(&[
            ("LM75A_I2C_BUS", "3"),
            ("LM75A_ADDRESS", "0x4c"),
            ("LM75A_INTERVAL_MS", "250"),
            ("LM75A_UNIT", "fahrenheit"),
            ("LM75A_HYSTERESIS", "75"),
            ("LM75A_OVERTEMP", "80.5"),
            ("LM75A_INTERRUPT_MODE", "true"),
            ("LM75A_OS_ACTIVE_HIGH", "1"),
            ("LM75A_FAULT_QUEUE", "4"),
            ("LM75A_ONE_SHOT", "yes"),
        ])
        .unwrap();

        assert_eq!(config.bus, 3);
        assert_eq!(config.address, 0x4C);
        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(config.unit, Unit::Fahrenheit);
        assert_eq!(
            config.thresholds,
            Some(Thresholds {
                hysteresis: 75.0,
                overtemp: 80.5
            })
        );
        assert!(config.one_shot);
        assert_eq!(config.mode().bits(), 0x12);
        assert_eq!(config.polarity(), Mode::OS_POLARITY);
    }

    #[test]
    fn decimal_address() {
        assert_eq!(config(&[("LM75A_ADDRESS", "73")]).unwrap().address, 0x49);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("LM75A_ADDRESS", "0x50")]).is_err());
        assert!(config(&[("LM75A_ADDRESS", "0xzz")]).is_err());
        assert!(config(&[("LM75A_INTERVAL_MS", "0")]).is_err());
        assert!(config(&[("LM75A_UNIT", "rankine")]).is_err());
        assert!(config(&[("LM75A_FAULT_QUEUE", "3")]).is_err());
        assert!(config(&[("LM75A_INTERRUPT_MODE", "maybe")]).is_err());
        assert!(config(&[("LM75A_HYSTERESIS", "75"), ("LM75A_OVERTEMP", "inf")]).is_err());
    }

    #[test]
    fn thresholds_come_in_pairs() {
        let err = config(&[("LM75A_OVERTEMP", "80")]).unwrap_err();
        assert!(err.to_string().contains("must be set together"));
    }
}
