//! MCP2515 register-level transaction driver.
//!
//! Every operation is exactly one SPI transaction:
//!
//! ```text
//! CS low → instruction → address → (mask) → data… → CS high
//! ```
//!
//! The driver is shared between the main loop and the CAN receive
//! handler, so each transaction runs under a critical-section mutex.
//! A handler can therefore never split a main-loop transaction in half.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::{Error, Result};

/// SPI instruction bytes.
pub mod instruction {
    pub const RESET: u8 = 0xC0;
    pub const READ: u8 = 0x03;
    pub const WRITE: u8 = 0x02;
    pub const BIT_MODIFY: u8 = 0x05;
    pub const READ_STATUS: u8 = 0xA0;
    /// Request-to-send; the low three bits select TXB0..TXB2.
    pub const RTS: u8 = 0x80;
}

/// Register addresses used by the bus layer.
pub mod register {
    pub const CANSTAT: u8 = 0x0E;
    pub const CANCTRL: u8 = 0x0F;
    pub const CNF3: u8 = 0x28;
    pub const CNF2: u8 = 0x29;
    pub const CNF1: u8 = 0x2A;
    pub const CANINTE: u8 = 0x2B;
    pub const CANINTF: u8 = 0x2C;

    pub const TXB0CTRL: u8 = 0x30;
    pub const TXB0SIDH: u8 = 0x31;
    pub const TXB0SIDL: u8 = 0x32;
    pub const TXB0DLC: u8 = 0x35;
    pub const TXB0D0: u8 = 0x36;

    pub const RXB0CTRL: u8 = 0x60;
    pub const RXB0SIDH: u8 = 0x61;
    pub const RXB0SIDL: u8 = 0x62;
    pub const RXB0DLC: u8 = 0x65;
    pub const RXB0D0: u8 = 0x66;
}

/// Bit masks inside the registers above.
pub mod bits {
    /// REQOP (CANCTRL) / OPMOD (CANSTAT).
    pub const MODE_MASK: u8 = 0xE0;
    /// Receive-buffer operating mode (RXB0CTRL.RXM).
    pub const RXM_MASK: u8 = 0x60;
    /// RXM = 11: accept any frame, filters off.
    pub const RXM_ANY: u8 = 0x60;
    /// Receive interrupts (CANINTE / CANINTF).
    pub const RX0I: u8 = 0x01;
    pub const RX1I: u8 = 0x02;
    pub const RX_INT_MASK: u8 = RX0I | RX1I;
    /// Transmit request pending (TXBnCTRL.TXREQ).
    pub const TXREQ: u8 = 0x08;
    /// Data length code (TXBnDLC / RXBnDLC).
    pub const DLC_MASK: u8 = 0x0F;
}

/// Operating modes selectable through CANCTRL.REQOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    Normal = 0x00,
    Sleep = 0x20,
    Loopback = 0x40,
    ListenOnly = 0x60,
    Configuration = 0x80,
}

impl OperatingMode {
    /// Value of the mode field as it appears in CANCTRL / CANSTAT.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Transmit buffer selector for request-to-send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxBuffer {
    Zero,
    One,
    Two,
}

impl TxBuffer {
    const fn rts_mask(self) -> u8 {
        match self {
            TxBuffer::Zero => 0x01,
            TxBuffer::One => 0x02,
            TxBuffer::Two => 0x04,
        }
    }
}

/// Unguarded SPI link to the controller.
///
/// Only reachable through [`Mcp2515::exclusive`] or the guarded
/// single-transaction methods, so callers never race on it.
pub struct Link<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Link<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// One full select → transfer → deselect sequence.
    ///
    /// CS is released even when a transfer fails, so the chip never
    /// stays selected into the next transaction.
    fn transaction<R>(&mut self, body: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.cs.set_low().map_err(|_| Error::Gpio)?;
        let result = body(self).and_then(|value| {
            self.spi.flush().map_err(|_| Error::Spi)?;
            Ok(value)
        });
        let released = self.cs.set_high().map_err(|_| Error::Gpio);
        let value = result?;
        released?;
        Ok(value)
    }

    fn exchange(&mut self, byte: u8) -> Result<u8> {
        let mut buf = [byte];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|_| Error::Spi)?;
        Ok(buf[0])
    }

    /// RESET: return every register to its power-on value (configuration mode).
    pub fn reset(&mut self) -> Result<()> {
        self.transaction(|link| link.exchange(instruction::RESET).map(|_| ()))
    }

    /// READ one register.
    pub fn read(&mut self, address: u8) -> Result<u8> {
        self.transaction(|link| {
            link.exchange(instruction::READ)?;
            link.exchange(address)?;
            link.exchange(0x00)
        })
    }

    /// WRITE one register.
    pub fn write(&mut self, address: u8, value: u8) -> Result<()> {
        self.transaction(|link| {
            link.exchange(instruction::WRITE)?;
            link.exchange(address)?;
            link.exchange(value)?;
            Ok(())
        })
    }

    /// BIT MODIFY: only bits set in `mask` take the value from `value`.
    pub fn bit_modify(&mut self, address: u8, mask: u8, value: u8) -> Result<()> {
        self.transaction(|link| {
            link.exchange(instruction::BIT_MODIFY)?;
            link.exchange(address)?;
            link.exchange(mask)?;
            link.exchange(value)?;
            Ok(())
        })
    }

    /// RTS for a single transmit buffer.
    pub fn request_to_send(&mut self, buffer: TxBuffer) -> Result<()> {
        self.transaction(|link| {
            link.exchange(instruction::RTS | buffer.rts_mask())
                .map(|_| ())
        })
    }

    /// READ STATUS: quick poll of the RX/TX interrupt and request bits.
    pub fn read_status(&mut self) -> Result<u8> {
        self.transaction(|link| {
            link.exchange(instruction::READ_STATUS)?;
            link.exchange(0x00)
        })
    }
}

/// Critical-section guarded MCP2515 driver.
pub struct Mcp2515<SPI, CS> {
    link: Mutex<CriticalSectionRawMutex, RefCell<Link<SPI, CS>>>,
}

impl<SPI, CS> Mcp2515<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Wrap an SPI bus and the controller's chip-select pin.
    ///
    /// `cs` should already be driven high (deselected).
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            link: Mutex::new(RefCell::new(Link { spi, cs })),
        }
    }

    /// Run several transactions back to back with handlers masked.
    ///
    /// `body` must not call back into this driver's guarded methods.
    pub fn exclusive<R>(&self, body: impl FnOnce(&mut Link<SPI, CS>) -> R) -> R {
        self.link.lock(|link| body(&mut link.borrow_mut()))
    }

    pub fn reset(&self) -> Result<()> {
        self.exclusive(|link| link.reset())
    }

    pub fn read(&self, address: u8) -> Result<u8> {
        self.exclusive(|link| link.read(address))
    }

    pub fn write(&self, address: u8, value: u8) -> Result<()> {
        self.exclusive(|link| link.write(address, value))
    }

    pub fn bit_modify(&self, address: u8, mask: u8, value: u8) -> Result<()> {
        self.exclusive(|link| link.bit_modify(address, mask, value))
    }

    pub fn request_to_send(&self, buffer: TxBuffer) -> Result<()> {
        self.exclusive(|link| link.request_to_send(buffer))
    }

    pub fn read_status(&self) -> Result<u8> {
        self.exclusive(|link| link.read_status())
    }

    /// Give back the SPI bus and chip-select pin.
    pub fn release(self) -> (SPI, CS) {
        let link = self.link.into_inner().into_inner();
        (link.spi, link.cs)
    }
}
