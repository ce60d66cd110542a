//! Unified error type for pingpong-nodes.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

use crate::bus::mcp2515::OperatingMode;

/// Top-level error type used across both nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Bus
    /// The SPI link to the CAN controller reported a transfer error.
    Spi,

    /// The CAN controller did not reach the requested operating mode.
    ModeMismatch {
        expected: OperatingMode,
        actual: u8,
    },

    /// A bounded wait on a hardware-ready signal ran out.
    Timeout,

    /// A frame was built with more payload bytes than a CAN frame holds.
    FrameTooLong(usize),

    /// A received frame carried an identifier no node understands.
    UnknownMessage(u16),

    /// A frame was too short or carried out-of-range field values.
    MalformedPayload,

    // Actuation
    /// I²C write to the motor DAC failed.
    MotorLink,

    /// A GPIO pin (direction, solenoid, chip select) could not be driven.
    Gpio,

    /// The servo PWM channel rejected a duty cycle.
    Pwm,

    /// Motor range-finding produced an unusable encoder range.
    Calibration,

    // UI / Display
    /// Display transaction failed.
    Display,
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;
