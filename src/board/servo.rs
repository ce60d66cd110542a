//! Servo PWM channel on the nRF52840 PWM peripheral.
//!
//! 16 MHz / 128 = 125 kHz counter, 2500 counts per 20 ms frame. The
//! peripheral's output is inverted relative to the duty value, so the
//! duty is written as `max - duty`.

use core::convert::Infallible;

use embassy_nrf::pwm::{Instance, Prescaler, SimplePwm};
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

/// Counts per servo frame at the chosen prescaler.
const FRAME_COUNTS: u16 = 2_500;

pub struct ServoPwm<'d, T: Instance> {
    pwm: SimplePwm<'d, T>,
}

impl<'d, T: Instance> ServoPwm<'d, T> {
    pub fn new(mut pwm: SimplePwm<'d, T>) -> Self {
        pwm.set_prescaler(Prescaler::Div128);
        pwm.set_max_duty(FRAME_COUNTS);
        pwm.set_duty(0, FRAME_COUNTS);
        Self { pwm }
    }
}

impl<T: Instance> ErrorType for ServoPwm<'_, T> {
    type Error = Infallible;
}

impl<T: Instance> SetDutyCycle for ServoPwm<'_, T> {
    fn max_duty_cycle(&self) -> u16 {
        self.pwm.max_duty()
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        let max = self.pwm.max_duty();
        self.pwm.set_duty(0, max - duty.min(max));
        Ok(())
    }
}
