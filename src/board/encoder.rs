//! 16-bit motor encoder counter read over an 8-bit parallel bus.
//!
//! !OE enables the counter's outputs; SEL picks the high (low level) or
//! low (high level) byte. Each byte needs ~100 µs to settle.

use embassy_nrf::gpio::{Input, Output};
use embedded_hal::delay::DelayNs;

use crate::config::{ENCODER_RESET_US, ENCODER_SELECT_US};
use crate::control::motor::Encoder;
use crate::error::Result;

pub struct ParallelEncoder<D> {
    data: [Input<'static>; 8],
    select: Output<'static>,
    output_enable: Output<'static>,
    reset: Output<'static>,
    delay: D,
}

impl<D: DelayNs> ParallelEncoder<D> {
    /// `data[0]` is D0. Control lines should start high.
    pub fn new(
        data: [Input<'static>; 8],
        select: Output<'static>,
        output_enable: Output<'static>,
        reset: Output<'static>,
        delay: D,
    ) -> Self {
        Self {
            data,
            select,
            output_enable,
            reset,
            delay,
        }
    }

    fn read_bus(&self) -> u8 {
        self.data
            .iter()
            .enumerate()
            .fold(0u8, |byte, (bit, pin)| byte | (u8::from(pin.is_high()) << bit))
    }
}

impl<D: DelayNs> Encoder for ParallelEncoder<D> {
    fn read(&mut self) -> Result<i16> {
        self.output_enable.set_low();

        self.select.set_low();
        self.delay.delay_us(ENCODER_SELECT_US);
        let high = self.read_bus();

        self.select.set_high();
        self.delay.delay_us(ENCODER_SELECT_US);
        let low = self.read_bus();

        self.output_enable.set_high();
        Ok(i16::from_be_bytes([high, low]))
    }

    fn reset(&mut self) -> Result<()> {
        self.reset.set_low();
        self.delay.delay_us(ENCODER_RESET_US);
        self.reset.set_high();
        Ok(())
    }
}
