//! CAN frame transport over the MCP2515.
//!
//! `CanBus` is a pair of shared references (driver + cache), so the main
//! loop and the receive handler can each hold their own copy.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::mcp2515::{bits, register, Link, Mcp2515, OperatingMode, TxBuffer};
use super::slot::MessageSlot;
use super::{Message, MessageSink, FRAME_CAPACITY};
use crate::config::{
    CAN_CNF1, CAN_CNF2, CAN_CNF3, CAN_MODE_RETRIES, CAN_RESET_SETTLE_US, CAN_TX_READY_POLLS,
};
use crate::error::{Error, Result};

/// Pause between CANSTAT polls while waiting for a mode change (µs).
const MODE_POLL_US: u32 = 100;

/// Frame transport bound to one controller and one receive cache.
pub struct CanBus<'a, SPI, CS> {
    driver: &'a Mcp2515<SPI, CS>,
    cache: &'a MessageSlot,
}

impl<SPI, CS> Clone for CanBus<'_, SPI, CS> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<SPI, CS> Copy for CanBus<'_, SPI, CS> {}

impl<'a, SPI, CS> CanBus<'a, SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    pub fn new(driver: &'a Mcp2515<SPI, CS>, cache: &'a MessageSlot) -> Self {
        Self { driver, cache }
    }

    /// Reset and configure the controller, then enter `mode`.
    ///
    /// Fails with [`Error::ModeMismatch`] if the controller does not
    /// report the configuration mode after reset, or `mode` afterwards.
    pub fn init(&self, mode: OperatingMode, delay: &mut impl DelayNs) -> Result<()> {
        self.driver.reset()?;
        delay.delay_us(CAN_RESET_SETTLE_US);
        self.enter_mode(OperatingMode::Configuration, delay)?;

        self.driver.write(register::CNF1, CAN_CNF1)?;
        self.driver.write(register::CNF2, CAN_CNF2)?;
        self.driver.write(register::CNF3, CAN_CNF3)?;
        self.driver
            .bit_modify(register::RXB0CTRL, bits::RXM_MASK, bits::RXM_ANY)?;
        self.driver
            .bit_modify(register::CANINTE, bits::RX_INT_MASK, bits::RX_INT_MASK)?;
        self.driver
            .bit_modify(register::CANINTF, bits::RX_INT_MASK, 0)?;

        self.enter_mode(mode, delay)?;
        info!("MCP2515 ready in {} mode", mode);
        Ok(())
    }

    /// Request `mode` and confirm it through CANSTAT, with bounded retries.
    pub fn enter_mode(&self, mode: OperatingMode, delay: &mut impl DelayNs) -> Result<()> {
        self.driver
            .bit_modify(register::CANCTRL, bits::MODE_MASK, mode.bits())?;

        let mut actual = 0;
        for _ in 0..CAN_MODE_RETRIES {
            actual = self.driver.read(register::CANSTAT)? & bits::MODE_MASK;
            if actual == mode.bits() {
                return Ok(());
            }
            delay.delay_us(MODE_POLL_US);
        }

        error!("MCP2515 stuck: wanted {} but CANSTAT reports {=u8:#x}", mode, actual);
        Err(Error::ModeMismatch {
            expected: mode,
            actual,
        })
    }

    /// Queue a frame on TXB0 and request transmission.
    ///
    /// Waits (bounded) for the previous frame to leave the buffer; no
    /// acknowledgement and no retry beyond that.
    pub fn send(&self, message: &Message) -> Result<()> {
        self.wait_tx_ready()?;
        self.driver.exclusive(|link| write_frame(link, message))
    }

    /// Receive-handler entry point: pull RXB0 into the cache.
    ///
    /// The cache is overwritten unconditionally; the frame is also
    /// returned for callers that want to log it.
    pub fn on_receive_interrupt(&self) -> Result<Message> {
        let message = self.driver.exclusive(read_frame)?;
        self.cache.publish(&message);
        Ok(message)
    }

    /// Most recently received frame, if any. Never blocks.
    pub fn recent(&self) -> Option<Message> {
        self.cache.latest()
    }

    /// Cache generation; changes whenever a new frame lands.
    pub fn generation(&self) -> u32 {
        self.cache.generation()
    }

    /// Send one frame to ourselves in loopback mode and compare.
    ///
    /// Leaves the controller in `restore` mode afterwards. Must run
    /// before the receive handler is live, since it polls RXB0 itself.
    pub fn loopback_self_test(
        &self,
        restore: OperatingMode,
        delay: &mut impl DelayNs,
    ) -> Result<bool> {
        self.enter_mode(OperatingMode::Loopback, delay)?;

        let probe = Message::new(0x7F, &[0x00, 0x02, 0x04, 0x06, 0x08, 0x0A, 0x0C, 0x0E])?;
        self.send(&probe)?;

        let mut received = None;
        for _ in 0..CAN_TX_READY_POLLS {
            if self.driver.read(register::CANINTF)? & bits::RX0I != 0 {
                received = Some(self.driver.exclusive(read_frame)?);
                break;
            }
            delay.delay_us(MODE_POLL_US);
        }

        self.enter_mode(restore, delay)?;

        let passed = received == Some(probe);
        if passed {
            info!("CAN loopback self-test passed");
        } else {
            warn!("CAN loopback self-test failed");
        }
        Ok(passed)
    }

    fn wait_tx_ready(&self) -> Result<()> {
        for _ in 0..CAN_TX_READY_POLLS {
            if self.driver.read(register::TXB0CTRL)? & bits::TXREQ == 0 {
                return Ok(());
            }
        }
        warn!("TXB0 still pending after {} polls", CAN_TX_READY_POLLS);
        Err(Error::Timeout)
    }
}

impl<SPI, CS> MessageSink for CanBus<'_, SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    fn send(&mut self, message: &Message) -> Result<()> {
        CanBus::send(self, message)
    }
}

fn write_frame<SPI, CS>(link: &mut Link<SPI, CS>, message: &Message) -> Result<()>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    let id = message.id();
    link.write(register::TXB0SIDH, (id >> 3) as u8)?;
    link.write(register::TXB0SIDL, ((id & 0x07) << 5) as u8)?;
    link.write(register::TXB0DLC, message.len() as u8)?;
    for (offset, byte) in message.payload().iter().enumerate() {
        link.write(register::TXB0D0 + offset as u8, *byte)?;
    }
    link.request_to_send(TxBuffer::Zero)
}

fn read_frame<SPI, CS>(link: &mut Link<SPI, CS>) -> Result<Message>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    let sidh = link.read(register::RXB0SIDH)?;
    let sidl = link.read(register::RXB0SIDL)?;
    let id = (u16::from(sidh) << 3) | u16::from(sidl >> 5);

    let dlc = link.read(register::RXB0DLC)? & bits::DLC_MASK;
    let len = usize::from(dlc).min(FRAME_CAPACITY);

    let mut data = [0u8; FRAME_CAPACITY];
    for (offset, byte) in data.iter_mut().take(len).enumerate() {
        *byte = link.read(register::RXB0D0 + offset as u8)?;
    }

    link.bit_modify(register::CANINTF, bits::RX0I, 0)?;
    Ok(Message::from_raw(id, len as u8, data))
}
