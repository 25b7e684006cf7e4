//! Temperature unit conversions.

use std::{fmt, str::FromStr};

use thiserror::Error;

const KELVIN_OFFSET: f32 = 273.15;

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    (celsius * 9.0 / 5.0) + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * (5.0 / 9.0)
}

pub fn celsius_to_kelvin(celsius: f32) -> f32 {
    celsius + KELVIN_OFFSET
}

pub fn kelvin_to_celsius(kelvin: f32) -> f32 {
    kelvin - KELVIN_OFFSET
}

pub fn fahrenheit_to_kelvin(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0 + KELVIN_OFFSET
}

pub fn kelvin_to_fahrenheit(kelvin: f32) -> f32 {
    (kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Unit {
    /// Converts a value in degrees Celsius into this unit.
    pub fn convert(self, celsius: f32) -> f32 {
        match self {
            Unit::Celsius => celsius,
            Unit::Fahrenheit => celsius_to_fahrenheit(celsius),
            Unit::Kelvin => celsius_to_kelvin(celsius),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Kelvin => "K",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown temperature unit {0:?}")]
pub struct ParseUnitError(String);

impl FromStr for Unit {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(Unit::Celsius),
            "f" | "fahrenheit" => Ok(Unit::Fahrenheit),
            "k" | "kelvin" => Ok(Unit::Kelvin),
            _ => Err(ParseUnitError(s.to_owned())),
        }
    }
}
