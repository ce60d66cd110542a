//! Defender carriage: DC motor on an I²C DAC, direction pin, and a
//! 16-bit quadrature counter read back over a parallel bus.
//!
//! The encoder count only means something relative to the end stops,
//! so an uncalibrated [`Motor`] cannot report a position. Running
//! [`Motor::calibrate`] consumes it and yields a [`CalibratedMotor`],
//! the only type that implements [`PositionActuator`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::config::{
    ANALOG_FULL_SCALE, MOTOR_CALIBRATION_SPEED, MOTOR_DAC_ADDRESS, MOTOR_DAC_COMMAND,
    MOTOR_SETTLE_MAX_POLLS, MOTOR_SETTLE_POLL_MS, MOTOR_STOP_MS, MOTOR_TRAVEL_MS,
};
use crate::error::{Error, Result};

/// Carriage position counter.
pub trait Encoder {
    /// Raw signed count.
    fn read(&mut self) -> Result<i16>;
    /// Zero the count at the current position.
    fn reset(&mut self) -> Result<()>;
}

/// A motor that can report where it is on the 0..=255 slider scale.
pub trait PositionActuator {
    fn position(&mut self) -> Result<u8>;
    /// Signed drive level; the sign picks the direction.
    fn drive(&mut self, control: i16) -> Result<()>;
}

/// Encoder extents measured against the end stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorCalibration {
    /// Negated count at the left stop.
    pub min: i16,
    /// Negated count at the right stop.
    pub max: i16,
}

impl MotorCalibration {
    /// Validate measured extents.
    pub fn new(min: i16, max: i16) -> Result<Self> {
        if max <= min {
            error!("Motor range invalid: min={} max={}", min, max);
            return Err(Error::Calibration);
        }
        Ok(Self { min, max })
    }

    /// Map a raw encoder count onto 0..=255.
    pub fn position(&self, count: i16) -> u8 {
        let travelled = -i32::from(count) - i32::from(self.min);
        let span = i32::from(self.max) - i32::from(self.min);
        let scaled = travelled * i32::from(ANALOG_FULL_SCALE) / span;
        scaled.clamp(0, i32::from(ANALOG_FULL_SCALE)) as u8
    }
}

/// Motor hardware before range-finding.
pub struct Motor<I2C, DIR, ENC> {
    dac: I2C,
    direction: DIR,
    encoder: ENC,
}

impl<I2C, DIR, ENC> Motor<I2C, DIR, ENC>
where
    I2C: I2c,
    DIR: OutputPin,
    ENC: Encoder,
{
    pub fn new(dac: I2C, direction: DIR, encoder: ENC) -> Self {
        Self {
            dac,
            direction,
            encoder,
        }
    }

    /// Set direction and DAC level. Magnitude saturates at the DAC range.
    pub fn drive(&mut self, speed: i16) -> Result<()> {
        if speed < 0 {
            self.direction.set_low().map_err(|_| Error::Gpio)?;
        } else {
            self.direction.set_high().map_err(|_| Error::Gpio)?;
        }
        let level = speed.unsigned_abs().min(u16::from(u8::MAX)) as u8;
        self.dac
            .write(MOTOR_DAC_ADDRESS, &[MOTOR_DAC_COMMAND, level])
            .map_err(|_| Error::MotorLink)
    }

    /// Home against the left stop, zero the encoder, then measure both
    /// extents. Blocks for a few seconds.
    pub fn calibrate(mut self, delay: &mut impl DelayNs) -> Result<CalibratedMotor<I2C, DIR, ENC>> {
        self.home(delay)?;

        self.drive(-MOTOR_CALIBRATION_SPEED)?;
        delay.delay_ms(MOTOR_TRAVEL_MS);
        let min = self.encoder.read()?;

        self.drive(MOTOR_CALIBRATION_SPEED)?;
        delay.delay_ms(MOTOR_TRAVEL_MS);
        let max = self.encoder.read()?.saturating_neg();
        self.drive(0)?;

        let calibration = MotorCalibration::new(min, max)?;
        info!("Motor calibrated: min={} max={}", calibration.min, calibration.max);
        Ok(CalibratedMotor {
            motor: self,
            calibration,
        })
    }

    fn home(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        self.drive(-MOTOR_CALIBRATION_SPEED)?;
        delay.delay_ms(MOTOR_TRAVEL_MS);

        let mut previous = self.encoder.read()?;
        let mut settled = false;
        for _ in 0..MOTOR_SETTLE_MAX_POLLS {
            delay.delay_ms(MOTOR_SETTLE_POLL_MS);
            let current = self.encoder.read()?;
            if current == previous {
                settled = true;
                break;
            }
            previous = current;
        }

        self.drive(0)?;
        if !settled {
            error!("Carriage never came to rest against the left stop");
            return Err(Error::Calibration);
        }
        delay.delay_ms(MOTOR_STOP_MS);
        self.encoder.reset()
    }
}

/// Motor with known end stops.
pub struct CalibratedMotor<I2C, DIR, ENC> {
    motor: Motor<I2C, DIR, ENC>,
    calibration: MotorCalibration,
}

impl<I2C, DIR, ENC> CalibratedMotor<I2C, DIR, ENC> {
    pub fn calibration(&self) -> MotorCalibration {
        self.calibration
    }
}

impl<I2C, DIR, ENC> PositionActuator for CalibratedMotor<I2C, DIR, ENC>
where
    I2C: I2c,
    DIR: OutputPin,
    ENC: Encoder,
{
    fn position(&mut self) -> Result<u8> {
        let count = self.motor.encoder.read()?;
        Ok(self.calibration.position(count))
    }

    fn drive(&mut self, control: i16) -> Result<()> {
        self.motor.drive(control)
    }
}
