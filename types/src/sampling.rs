use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling temperature passed through to the backend unchanged.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

#[derive(Debug, Error, PartialEq)]
#[error("temperature must be a finite, non-negative number (got {0})")]
pub struct TemperatureError(f64);

impl Temperature {
    /// Elevated default that biases the backend toward exploratory continuations.
    pub const DEFAULT: Temperature = Temperature(1.3);

    pub fn new(value: f64) -> Result<Self, TemperatureError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TemperatureError(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Temperature {
    type Error = TemperatureError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f64 {
    fn from(value: Temperature) -> Self {
        value.0
    }
}
