//! Human-input collection for the interface node.
//!
//! The multifunction board exposes four analog channels (joystick X/Y,
//! left/right slider) behind an 8-bit sampler, plus the joystick
//! push-button and two touch pads on GPIO.
//!
//! ## Components
//!
//! - **Joystick**: calibrated percentage map and direction classifier
//! - **Sliders**: raw 0..=255 readings, sent unscaled
//! - **Buttons**: confirm edge latch and touch level

pub mod buttons;
pub mod joystick;
pub mod slider;

use joystick::{JoystickCalibration, JoystickPosition};
use slider::Sliders;

/// Analog inputs of the multifunction board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogChannel {
    JoystickX,
    JoystickY,
    SliderLeft,
    SliderRight,
}

impl AnalogChannel {
    /// Multiplexer channel number on the board.
    pub const fn index(self) -> u8 {
        match self {
            AnalogChannel::JoystickX => 5,
            AnalogChannel::JoystickY => 4,
            AnalogChannel::SliderLeft => 6,
            AnalogChannel::SliderRight => 7,
        }
    }
}

/// Channel-select → 8-bit sample.
pub trait AnalogSampler {
    fn read(&mut self, channel: AnalogChannel) -> u8;
}

/// One reading of every analog input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputFrame {
    pub joystick: JoystickPosition,
    pub sliders: Sliders,
}

/// Joystick + slider reader bound to a boot-time calibration.
#[derive(Clone, Copy, Debug)]
pub struct InputCollector {
    calibration: JoystickCalibration,
}

impl InputCollector {
    /// Record the joystick rest position. Call once at boot with the
    /// stick released.
    pub fn calibrate(sampler: &mut impl AnalogSampler) -> Self {
        let calibration = JoystickCalibration::capture(sampler);
        info!(
            "Joystick centre x={} y={}",
            calibration.x.center(),
            calibration.y.center()
        );
        Self { calibration }
    }

    pub fn with_calibration(calibration: JoystickCalibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> JoystickCalibration {
        self.calibration
    }

    pub fn joystick(&self, sampler: &mut impl AnalogSampler) -> JoystickPosition {
        self.calibration.position(sampler)
    }

    pub fn sample(&self, sampler: &mut impl AnalogSampler) -> InputFrame {
        InputFrame {
            joystick: self.joystick(sampler),
            sliders: Sliders::read(sampler),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{AnalogChannel, AnalogSampler};

    /// Fixed readings per channel.
    #[derive(Clone, Copy, Debug)]
    pub struct FixedSampler {
        pub x: u8,
        pub y: u8,
        pub left: u8,
        pub right: u8,
    }

    impl FixedSampler {
        pub fn centred() -> Self {
            Self {
                x: 128,
                y: 128,
                left: 0,
                right: 0,
            }
        }
    }

    impl AnalogSampler for FixedSampler {
        fn read(&mut self, channel: AnalogChannel) -> u8 {
            match channel {
                AnalogChannel::JoystickX => self.x,
                AnalogChannel::JoystickY => self.y,
                AnalogChannel::SliderLeft => self.left,
                AnalogChannel::SliderRight => self.right,
            }
        }
    }
}
