//! Interface node firmware.
//!
//! Reads the multifunction board (joystick, sliders, touch pads), runs
//! the OLED menu and broadcasts a controller snapshot every 100 ms.
//! The CAN receive handler and the confirm button run on a
//! higher-priority interrupt executor so they preempt the console loop.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info, unwrap, warn};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::saadc::{self, ChannelConfig, Saadc};
use embassy_nrf::spim::{self, Spim};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Delay, Duration, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pingpong_nodes::board::analog::AnalogCache;
use pingpong_nodes::board::buttons::{self, Buttons};
use pingpong_nodes::board::display::Oled;
use pingpong_nodes::bus::can::CanBus;
use pingpong_nodes::bus::mcp2515::{Mcp2515, OperatingMode};
use pingpong_nodes::bus::slot::MessageSlot;
use pingpong_nodes::config::{JOYSTICK_SETTLE_MS, SNAPSHOT_PERIOD_MS};
use pingpong_nodes::input::buttons::ConfirmLatch;
use pingpong_nodes::input::InputCollector;
use pingpong_nodes::ui::Console;

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SAADC => saadc::InterruptHandler;
});

type CanSpi = Spim<'static, peripherals::SPI3>;
type Bus = CanBus<'static, CanSpi, Output<'static>>;
type Screen = Oled<Twim<'static, peripherals::TWISPI0>>;

static DRIVER: StaticCell<Mcp2515<CanSpi, Output<'static>>> = StaticCell::new();
static INBOX: MessageSlot = MessageSlot::new();
static ANALOG: AnalogCache = AnalogCache::new();
static CONFIRM: ConfirmLatch = ConfirmLatch::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn EGU1_SWI1() {
    EXECUTOR_HIGH.on_interrupt()
}

fn halt() -> ! {
    loop {
        cortex_m::asm::wfe();
    }
}

/// Drain the MCP2515 into the message cache whenever INT goes low.
#[embassy_executor::task]
async fn receive_task(bus: Bus, mut can_int: Input<'static>) -> ! {
    loop {
        can_int.wait_for_low().await;
        if let Err(e) = bus.on_receive_interrupt() {
            warn!("CAN receive failed: {}", e);
            // INT stays low until the flag is cleared; don't spin on it.
            Timer::after_millis(1).await;
        }
    }
}

#[embassy_executor::task]
async fn confirm_task(button: Input<'static>) -> ! {
    buttons::watch_confirm(button, &CONFIRM).await
}

#[embassy_executor::task]
async fn console_task(
    mut bus: Bus,
    mut saadc: Saadc<'static, 4>,
    screen: Screen,
    panel: Buttons,
) -> ! {
    Timer::after_millis(u64::from(JOYSTICK_SETTLE_MS)).await;
    ANALOG.refresh(&mut saadc).await;
    let inputs = InputCollector::calibrate(&mut &ANALOG);

    let mut console = Console::new(&ANALOG, panel, screen, inputs);
    let mut delay = Delay;
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(SNAPSHOT_PERIOD_MS)));

    loop {
        ANALOG.refresh(&mut saadc).await;
        if let Err(e) = console.tick(bus.recent(), &mut bus, &mut delay) {
            warn!("Console tick failed: {}", e);
        }
        ticker.next().await;
    }
}

#[entry]
fn main() -> ! {
    info!("Interface node starting");
    let p = embassy_nrf::init(Default::default());

    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M1;
    spi_config.mode = spim::MODE_0;
    let spi = Spim::new(p.SPI3, Irqs, p.P0_19, p.P0_21, p.P0_20, spi_config);
    let cs = Output::new(p.P0_22, Level::High, OutputDrive::Standard);
    let driver = DRIVER.init(Mcp2515::new(spi, cs));
    let bus = CanBus::new(driver, &INBOX);

    let mut delay = Delay;
    if let Err(e) = bus.init(OperatingMode::Normal, &mut delay) {
        error!("CAN init failed: {}", e);
        halt();
    }
    match bus.loopback_self_test(OperatingMode::Normal, &mut delay) {
        Ok(true) => {}
        Ok(false) => warn!("Continuing without a verified CAN controller"),
        Err(e) => {
            error!("CAN self-test aborted: {}", e);
            halt();
        }
    }

    let twim_config = twim::Config::default();
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim_config);
    let screen = match Oled::init(i2c) {
        Ok(screen) => screen,
        Err(e) => {
            error!("OLED init failed: {}", e);
            halt();
        }
    };

    let mut adc_config = saadc::Config::default();
    adc_config.resolution = saadc::Resolution::_8BIT;
    // Channel order matches AnalogCache: X, Y, left, right.
    let channels = [
        ChannelConfig::single_ended(p.P0_29),
        ChannelConfig::single_ended(p.P0_28),
        ChannelConfig::single_ended(p.P0_30),
        ChannelConfig::single_ended(p.P0_31),
    ];
    let saadc = Saadc::new(p.SAADC, Irqs, adc_config, channels);

    let panel = Buttons::new(
        Input::new(p.P0_12, Pull::Down),
        Input::new(p.P0_24, Pull::Down),
        &CONFIRM,
    );

    interrupt::EGU1_SWI1.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::EGU1_SWI1);
    unwrap!(high.spawn(receive_task(bus, Input::new(p.P0_23, Pull::Up))));
    unwrap!(high.spawn(confirm_task(Input::new(p.P0_11, Pull::Up))));

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(spawner.spawn(console_task(bus, saadc, screen, panel)));
    })
}
