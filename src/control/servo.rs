//! Joystick → servo pulse mapping.
//!
//! The servo expects a 50 Hz frame with a 1.0..=2.0 ms high pulse;
//! 1.5 ms is centre. Joystick x (−100..=100) maps linearly onto that
//! range. Pulses at or beyond the mechanical limits are never applied.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::{
    SERVO_CENTER_US, SERVO_HALF_RANGE_US, SERVO_LIMIT_LEFT_US, SERVO_LIMIT_RIGHT_US,
    SERVO_PERIOD_US,
};
use crate::error::{Error, Result};

/// Pulse width in µs for joystick deflection `x`.
///
/// Negative x lands in [1000, 1500), non-negative in [1500, 2000].
pub fn pulse_width_us(x: i8) -> u16 {
    let x = i32::from(x.clamp(-100, 100));
    let width = i32::from(SERVO_CENTER_US) + x * i32::from(SERVO_HALF_RANGE_US) / 100;
    width as u16
}

/// True if the pulse lies strictly inside the servo's deflection limits.
pub fn within_limits(pulse_us: u16) -> bool {
    pulse_us > SERVO_LIMIT_LEFT_US && pulse_us < SERVO_LIMIT_RIGHT_US
}

/// Servo on one PWM channel running at a 20 ms period.
pub struct Servo<P> {
    pwm: P,
}

impl<P: SetDutyCycle> Servo<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Apply a pulse width. Out-of-range pulses are withheld and
    /// reported as `Ok(None)`.
    pub fn set_pulse(&mut self, pulse_us: u16) -> Result<Option<u16>> {
        if !within_limits(pulse_us) {
            warn!("Servo pulse {=u16} us outside limits, withheld", pulse_us);
            return Ok(None);
        }
        self.pwm
            .set_duty_cycle_fraction(pulse_us, SERVO_PERIOD_US)
            .map_err(|_| Error::Pwm)?;
        Ok(Some(pulse_us))
    }

    pub fn channel(&self) -> &P {
        &self.pwm
    }

    /// Point the servo according to joystick x.
    pub fn follow(&mut self, x: i8) -> Result<Option<u16>> {
        self.set_pulse(pulse_width_us(x))
    }
}
