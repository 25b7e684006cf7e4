//! Driver for the NXP LM75A digital temperature sensor.

use embedded_hal::blocking::{
    delay::DelayMs,
    i2c::{Write, WriteRead},
};
use num_traits::ToPrimitive;
use thiserror::Error;
use tracing::{debug, trace};

use crate::units::{self, Unit};

pub mod mode;
pub mod register;

pub use mode::{FaultQueue, Mode};
pub use register::Register;

#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("i2c error: {0:?}")]
    I2c(E),
    #[error("threshold {0} °C does not fit in the threshold register")]
    ThresholdOutOfRange(f32),
}

pub struct Lm75a<I2C> {
    i2c: I2C,
    address: u8,
    mode: Mode,
}

impl<I2C, E> Lm75a<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Creates a driver for a sensor at the default address.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, register::DEFAULT_ADDRESS)
    }

    /// Creates a driver for a sensor at a 7-bit `address`, normally one of
    /// [`register::ADDRESS_RANGE`] depending on how A2..A0 are strapped.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            mode: Mode::empty(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// The last mode written to or read from the configuration register.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[pointer(reg)], &mut buf)
            .map_err(Error::I2c)?;
        trace!("read {reg:?} = {:#04x}", buf[0]);
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<E>> {
        trace!("write {reg:?} = {value:#04x}");
        self.i2c
            .write(self.address, &[pointer(reg), value])
            .map_err(Error::I2c)
    }

    fn read_temp_register(&mut self, reg: Register) -> Result<f32, Error<E>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[pointer(reg)], &mut buf)
            .map_err(Error::I2c)?;
        trace!("read {reg:?} = {buf:02x?}");
        Ok(register::decode_temperature(buf))
    }

    fn write_temp_register(&mut self, reg: Register, raw: [u8; 2]) -> Result<(), Error<E>> {
        trace!("write {reg:?} = {raw:02x?}");
        self.i2c
            .write(self.address, &[pointer(reg), raw[0], raw[1]])
            .map_err(Error::I2c)
    }

    /// Reads the temperature in degrees Celsius, with 0.5 °C resolution.
    pub fn read_temperature(&mut self) -> Result<f32, Error<E>> {
        self.read_temp_register(Register::Temperature)
    }

    pub fn read_temperature_in_fahrenheit(&mut self) -> Result<f32, Error<E>> {
        self.read_temperature().map(units::celsius_to_fahrenheit)
    }

    pub fn read_temperature_in_kelvin(&mut self) -> Result<f32, Error<E>> {
        self.read_temperature().map(units::celsius_to_kelvin)
    }

    pub fn read_temperature_in(&mut self, unit: Unit) -> Result<f32, Error<E>> {
        self.read_temperature().map(|c| unit.convert(c))
    }

    /// Programs the alarm thresholds, both in degrees Celsius.
    ///
    /// The OS output asserts above `shutdown_threshold` and releases below
    /// `hysteresis_threshold`. Values are truncated to 0.5 °C. Nothing is
    /// written if either value is outside -128.0..=127.5 °C.
    pub fn set_temp_threshold(
        &mut self,
        hysteresis_threshold: f32,
        shutdown_threshold: f32,
    ) -> Result<(), Error<E>> {
        let hyst = register::encode_temperature(hysteresis_threshold)
            .ok_or(Error::ThresholdOutOfRange(hysteresis_threshold))?;
        let os = register::encode_temperature(shutdown_threshold)
            .ok_or(Error::ThresholdOutOfRange(shutdown_threshold))?;

        self.write_temp_register(Register::OvertempShutdown, os)?;
        self.write_temp_register(Register::Hysteresis, hyst)?;

        debug!(
            "set thresholds: hysteresis = {hysteresis_threshold} °C, shutdown = {shutdown_threshold} °C"
        );
        Ok(())
    }

    pub fn read_hysteresis_threshold(&mut self) -> Result<f32, Error<E>> {
        self.read_temp_register(Register::Hysteresis)
    }

    pub fn read_overtemp_shutdown_threshold(&mut self) -> Result<f32, Error<E>> {
        self.read_temp_register(Register::OvertempShutdown)
    }

    /// Writes `mode | polarity` to the configuration register. The flags are
    /// not checked for consistency.
    pub fn set_comp_int_polarity_mode(
        &mut self,
        mode: Mode,
        polarity: Mode,
    ) -> Result<(), Error<E>> {
        let mode = mode | polarity;
        self.write_register(Register::Configuration, mode.bits())?;
        self.mode = mode;
        Ok(())
    }

    pub fn read_mode(&mut self) -> Result<Mode, Error<E>> {
        let bits = self.read_register(Register::Configuration)?;
        self.mode = Mode::from_bits_retain(bits);
        Ok(self.mode)
    }

    /// Stops conversions. The last temperature stays readable.
    pub fn shutdown(&mut self) -> Result<(), Error<E>> {
        self.set_comp_int_polarity_mode(self.mode | Mode::SHUTDOWN, Mode::empty())
    }

    pub fn wake(&mut self) -> Result<(), Error<E>> {
        self.set_comp_int_polarity_mode(self.mode - Mode::SHUTDOWN, Mode::empty())
    }

    /// Wakes the sensor, waits for one conversion and puts it back into
    /// shutdown.
    pub fn measure_one_shot<DELAY: DelayMs<u32>>(
        &mut self,
        delay: &mut DELAY,
    ) -> Result<f32, Error<E>> {
        self.wake()?;
        delay.delay_ms(register::CONVERSION_TIME_MS);
        let temp = self.read_temperature()?;
        self.shutdown()?;
        Ok(temp)
    }

    pub fn read_product_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::ProductId)
    }
}

fn pointer(reg: Register) -> u8 {
    // every variant is a u8 literal
    reg.to_u8().unwrap_or_default()
}
