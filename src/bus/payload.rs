//! Payload layouts of the two message classes.
//!
//! Controller snapshot (id 0, 7 bytes):
//! ```text
//! Byte 0: joystick x   (i8, -100..=100, two's complement on the wire)
//! Byte 1: joystick y   (i8, -100..=100)
//! Byte 2: touch pad    (0/1)
//! Byte 3: slider left  (0..=255)
//! Byte 4: slider right (0..=255)
//! Byte 5: play flag    (0/1)
//! Byte 6: difficulty   (0 = easy, 1 = medium, 2 = hard)
//! ```
//!
//! Game info (id 1, 2 bytes):
//! ```text
//! Byte 0: round sequence (wrapping; bumped once per game over)
//! Byte 1: game-over flag (0/1)
//! ```

use super::Message;
use crate::config::{MSG_ID_CONTROLLER, MSG_ID_GAME_INFO};
use crate::error::{Error, Result};

/// Controller snapshot size in bytes.
pub const CONTROLLER_SNAPSHOT_SIZE: usize = 7;

/// Game info size in bytes.
pub const GAME_INFO_SIZE: usize = 2;

/// Joystick percentage limit.
const AXIS_LIMIT: i8 = 100;

/// Difficulty selected in the menu; picks the PID gain set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Difficulty {
    #[default]
    Easy = 0,
    Medium = 1,
    Hard = 2,
}

impl Difficulty {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Difficulty::Easy),
            1 => Some(Difficulty::Medium),
            2 => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub const fn to_wire(self) -> u8 {
        self as u8
    }
}

/// One periodic sample of all human-input state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerSnapshot {
    pub joystick_x: i8,
    pub joystick_y: i8,
    pub touch: bool,
    pub slider_left: u8,
    pub slider_right: u8,
    pub play: bool,
    pub difficulty: Difficulty,
}

impl ControllerSnapshot {
    pub fn encode(&self) -> Message {
        let bytes = [
            self.joystick_x as u8,
            self.joystick_y as u8,
            u8::from(self.touch),
            self.slider_left,
            self.slider_right,
            u8::from(self.play),
            self.difficulty.to_wire(),
        ];
        Message::from_raw(MSG_ID_CONTROLLER, bytes.len() as u8, pad(&bytes))
    }

    pub fn decode(message: &Message) -> Result<Self> {
        if message.id() != MSG_ID_CONTROLLER {
            return Err(Error::UnknownMessage(message.id()));
        }
        let data = message.payload();
        if data.len() < CONTROLLER_SNAPSHOT_SIZE {
            return Err(Error::MalformedPayload);
        }

        let joystick_x = data[0] as i8;
        let joystick_y = data[1] as i8;
        if !(-AXIS_LIMIT..=AXIS_LIMIT).contains(&joystick_x)
            || !(-AXIS_LIMIT..=AXIS_LIMIT).contains(&joystick_y)
        {
            return Err(Error::MalformedPayload);
        }

        Ok(Self {
            joystick_x,
            joystick_y,
            touch: flag(data[2])?,
            slider_left: data[3],
            slider_right: data[4],
            play: flag(data[5])?,
            difficulty: Difficulty::from_wire(data[6]).ok_or(Error::MalformedPayload)?,
        })
    }
}

/// Game-over notification from the actuation node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameInfo {
    /// Bumped once per game over so repeats of a cached frame are recognisable.
    pub sequence: u8,
    pub game_over: bool,
}

impl GameInfo {
    pub fn encode(&self) -> Message {
        let bytes = [self.sequence, u8::from(self.game_over)];
        Message::from_raw(MSG_ID_GAME_INFO, bytes.len() as u8, pad(&bytes))
    }

    pub fn decode(message: &Message) -> Result<Self> {
        if message.id() != MSG_ID_GAME_INFO {
            return Err(Error::UnknownMessage(message.id()));
        }
        let data = message.payload();
        if data.len() < GAME_INFO_SIZE {
            return Err(Error::MalformedPayload);
        }
        Ok(Self {
            sequence: data[0],
            game_over: flag(data[1])?,
        })
    }
}

fn flag(byte: u8) -> Result<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::MalformedPayload),
    }
}

fn pad(bytes: &[u8]) -> [u8; 8] {
    let mut block = [0u8; 8];
    block[..bytes.len()].copy_from_slice(bytes);
    block
}
