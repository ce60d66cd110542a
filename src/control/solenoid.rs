//! Solenoid striker: one active-low pulse per strike.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::SOLENOID_PULSE_MS;
use crate::error::{Error, Result};

pub struct Solenoid<P> {
    pin: P,
}

impl<P: OutputPin> Solenoid<P> {
    /// Takes the pin and drives it to the idle (high) level.
    pub fn new(mut pin: P) -> Result<Self> {
        pin.set_high().map_err(|_| Error::Gpio)?;
        Ok(Self { pin })
    }

    /// Fire once. Blocks for the pulse length.
    pub fn strike(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        self.pin.set_low().map_err(|_| Error::Gpio)?;
        delay.delay_ms(SOLENOID_PULSE_MS);
        self.pin.set_high().map_err(|_| Error::Gpio)
    }
}
