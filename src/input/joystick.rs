//! Joystick percentage map and direction classification.
//!
//! Raw samples are 0..=255. Each axis is anchored at a centre recorded
//! once at boot; the two halves of the travel are scaled separately so
//! both ends reach ±100 even when the centre is off-mid.

use super::{AnalogChannel, AnalogSampler};
use crate::config::{ANALOG_FULL_SCALE, JOYSTICK_DEAD_ZONE};

/// Calibrated centre of one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    center: u8,
}

impl AxisCalibration {
    pub const fn new(center: u8) -> Self {
        Self { center }
    }

    pub fn center(&self) -> u8 {
        self.center
    }

    /// Map a raw sample to −100..=100.
    pub fn to_percent(&self, sample: u8) -> i8 {
        let s = i32::from(sample);
        let c = i32::from(self.center);
        let full = i32::from(ANALOG_FULL_SCALE);

        let percent = if s < c {
            -((c - s) * 100 / c)
        } else if s > c {
            (s - c) * 100 / (full - c)
        } else {
            0
        };
        percent as i8
    }
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self::new(ANALOG_FULL_SCALE / 2)
    }
}

/// Rest position of both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickCalibration {
    pub x: AxisCalibration,
    pub y: AxisCalibration,
}

impl JoystickCalibration {
    pub fn capture(sampler: &mut impl AnalogSampler) -> Self {
        Self {
            x: AxisCalibration::new(sampler.read(AnalogChannel::JoystickX)),
            y: AxisCalibration::new(sampler.read(AnalogChannel::JoystickY)),
        }
    }

    pub fn position(&self, sampler: &mut impl AnalogSampler) -> JoystickPosition {
        JoystickPosition {
            x: self.x.to_percent(sampler.read(AnalogChannel::JoystickX)),
            y: self.y.to_percent(sampler.read(AnalogChannel::JoystickY)),
        }
    }
}

/// Deflection in percent, −100..=100 per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickPosition {
    pub x: i8,
    pub y: i8,
}

/// Quadrant by sign of (x, y), with a neutral dead zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quadrant {
    Neutral,
    /// x ≥ 0, y > 0
    First,
    /// x < 0, y ≥ 0
    Second,
    /// x ≤ 0, y < 0
    Third,
    /// x > 0, y ≤ 0
    Fourth,
}

/// Menu navigation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Neutral,
}

impl JoystickPosition {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub fn in_dead_zone(&self) -> bool {
        self.x.unsigned_abs() < JOYSTICK_DEAD_ZONE as u8
            && self.y.unsigned_abs() < JOYSTICK_DEAD_ZONE as u8
    }

    pub fn quadrant(&self) -> Quadrant {
        let (x, y) = (self.x, self.y);
        if self.in_dead_zone() {
            Quadrant::Neutral
        } else if x >= 0 && y > 0 {
            Quadrant::First
        } else if x < 0 && y >= 0 {
            Quadrant::Second
        } else if x <= 0 && y < 0 {
            Quadrant::Third
        } else {
            Quadrant::Fourth
        }
    }

    /// Dominant axis wins; ties go vertical.
    pub fn direction(&self) -> Direction {
        if self.in_dead_zone() {
            return Direction::Neutral;
        }
        if self.y.unsigned_abs() >= self.x.unsigned_abs() {
            if self.y > 0 {
                Direction::Up
            } else {
                Direction::Down
            }
        } else if self.x > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}
