//! CAN message bus shared by both nodes.
//!
//! Layers, leaves first:
//!
//! 1. [`mcp2515`] - register transactions (reset / read / write /
//!    bit-modify / request-to-send) over SPI.
//! 2. [`can`] - 8-byte tagged frames on top of the transaction driver,
//!    plus the receive-handler entry point.
//! 3. [`slot`] - the interrupt-updated "most recent message" cache.
//! 4. [`payload`] - typed views of the two message classes.
//!
//! Delivery is best effort: no acknowledgement, no retry. Every cycle
//! resends full state, so a lost frame is corrected one period later.

pub mod can;
pub mod mcp2515;
pub mod payload;
pub mod slot;


use crate::config::{MSG_ID_CONTROLLER, MSG_ID_GAME_INFO};
use crate::error::{Error, Result};
use payload::{ControllerSnapshot, GameInfo};

/// Payload capacity of a classic CAN frame.
pub const FRAME_CAPACITY: usize = 8;

/// One bus frame: standard identifier, length, fixed 8-byte payload block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    id: u16,
    len: u8,
    data: [u8; FRAME_CAPACITY],
}

impl Message {
    /// Build a frame. Fails if `payload` does not fit in one frame.
    pub fn new(id: u16, payload: &[u8]) -> Result<Self> {
        if payload.len() > FRAME_CAPACITY {
            return Err(Error::FrameTooLong(payload.len()));
        }
        let mut data = [0u8; FRAME_CAPACITY];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len: payload.len() as u8,
            data,
        })
    }

    /// Rebuild a frame from raw register contents.
    ///
    /// A DLC above 8 is legal on the wire and still means 8 data bytes.
    pub(crate) fn from_raw(id: u16, len: u8, data: [u8; FRAME_CAPACITY]) -> Self {
        Self {
            id,
            len: len.min(FRAME_CAPACITY as u8),
            data,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes of the payload.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// The full 8-byte payload block, including unused trailing bytes.
    pub fn data(&self) -> &[u8; FRAME_CAPACITY] {
        &self.data
    }
}

/// Typed view of a received frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusMessage {
    Controller(ControllerSnapshot),
    GameInfo(GameInfo),
}

impl BusMessage {
    /// Classify a frame by identifier and decode its payload.
    pub fn classify(message: &Message) -> Result<Self> {
        match message.id() {
            MSG_ID_CONTROLLER => ControllerSnapshot::decode(message).map(BusMessage::Controller),
            MSG_ID_GAME_INFO => GameInfo::decode(message).map(BusMessage::GameInfo),
            other => Err(Error::UnknownMessage(other)),
        }
    }

    pub fn encode(&self) -> Message {
        match self {
            BusMessage::Controller(snapshot) => snapshot.encode(),
            BusMessage::GameInfo(info) => info.encode(),
        }
    }
}

/// Anything that can put a frame on the bus.
///
/// Implemented by [`can::CanBus`]; tests substitute a recorder.
pub trait MessageSink {
    fn send(&mut self, message: &Message) -> Result<()>;
}
