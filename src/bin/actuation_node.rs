//! Actuation node firmware.
//!
//! Follows the interface node's snapshots: servo from the joystick,
//! PID-driven carriage from the left slider, solenoid from the touch
//! pads, and counts goals on the IR beam. Announces game over on the
//! bus after three misses.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info, unwrap, warn};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::saadc::{self, ChannelConfig, Saadc};
use embassy_nrf::spim::{self, Spim};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Delay, Duration, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pingpong_nodes::board::analog::LightCache;
use pingpong_nodes::board::encoder::ParallelEncoder;
use pingpong_nodes::board::servo::ServoPwm;
use pingpong_nodes::bus::can::CanBus;
use pingpong_nodes::bus::mcp2515::{Mcp2515, OperatingMode};
use pingpong_nodes::bus::slot::MessageSlot;
use pingpong_nodes::config::{CONTROL_PERIOD_MS, GOAL_SAMPLES, PID_SAMPLE_PERIOD_US};
use pingpong_nodes::control::motor::Motor;
use pingpong_nodes::control::servo::Servo;
use pingpong_nodes::control::solenoid::Solenoid;
use pingpong_nodes::control::{CalibratedMotor, GameController, SamplingClock, TickOutcome};
use pingpong_nodes::{BusMessage, ControllerSnapshot};

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SAADC => saadc::InterruptHandler;
});

type CanSpi = Spim<'static, peripherals::SPI3>;
type Bus = CanBus<'static, CanSpi, Output<'static>>;
type Carriage =
    CalibratedMotor<Twim<'static, peripherals::TWISPI0>, Output<'static>, ParallelEncoder<Delay>>;
type Controller = GameController<
    Carriage,
    ServoPwm<'static, peripherals::PWM0>,
    Output<'static>,
    &'static LightCache,
>;

static DRIVER: StaticCell<Mcp2515<CanSpi, Output<'static>>> = StaticCell::new();
static INBOX: MessageSlot = MessageSlot::new();
static LIGHT: LightCache = LightCache::new();
static CLOCK: SamplingClock = SamplingClock::new();

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

#[embassy_executor::task]
async fn receive_task(bus: Bus, mut can_int: Input<'static>) -> ! {
    loop {
        can_int.wait_for_low().await;
        if let Err(e) = bus.on_receive_interrupt() {
            warn!("CAN receive failed: {}", e);
            Timer::after_millis(1).await;
        }
    }
}

/// Raise the PID sampling flag once per sampling period.
#[embassy_executor::task]
async fn sampling_task() -> ! {
    let mut ticker = Ticker::every(Duration::from_micros(PID_SAMPLE_PERIOD_US));
    loop {
        ticker.next().await;
        CLOCK.raise();
    }
}

#[embassy_executor::task]
async fn control_task(mut bus: Bus, mut controller: Controller, mut saadc: Saadc<'static, 1>) -> ! {
    let mut delay = Delay;
    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_PERIOD_MS));
    let mut generation = bus.generation();
    let mut latest: Option<ControllerSnapshot> = None;

    loop {
        for _ in 0..GOAL_SAMPLES {
            LIGHT.refresh(&mut saadc).await;
        }

        if bus.generation() != generation {
            generation = bus.generation();
            if let Some(BusMessage::Controller(snapshot)) =
                bus.recent().and_then(|message| BusMessage::classify(&message).ok())
            {
                latest = Some(snapshot);
            }
        }

        match controller.tick(latest.as_ref(), &CLOCK, &mut bus, &mut delay) {
            Ok(TickOutcome::GameOver { sequence }) => info!("Round {} over", sequence),
            Ok(_) => {}
            Err(e) => warn!("Control tick failed: {}", e),
        }
        ticker.next().await;
    }
}

#[entry]
fn main() -> ! {
    info!("Actuation node starting");
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

    let servo = Servo::new(ServoPwm::new(SimplePwm::new_1ch(p.PWM0, p.P0_13)));
    let solenoid = match Solenoid::new(Output::new(p.P0_14, Level::High, OutputDrive::Standard)) {
        Ok(solenoid) => solenoid,
        Err(e) => {
            error!("Solenoid init failed: {}", e);
            halt();
        }
    };

    let encoder = ParallelEncoder::new(
        [
            Input::new(p.P1_01, Pull::None),
            Input::new(p.P1_02, Pull::None),
            Input::new(p.P1_03, Pull::None),
            Input::new(p.P1_04, Pull::None),
            Input::new(p.P1_05, Pull::None),
            Input::new(p.P1_06, Pull::None),
            Input::new(p.P1_07, Pull::None),
            Input::new(p.P1_08, Pull::None),
        ],
        Output::new(p.P1_10, Level::High, OutputDrive::Standard),
        Output::new(p.P1_11, Level::High, OutputDrive::Standard),
        Output::new(p.P1_12, Level::High, OutputDrive::Standard),
        Delay,
    );
    // The motor box is enabled for the node's whole lifetime.
    let _motor_enable = Output::new(p.P0_15, Level::High, OutputDrive::Standard);
    let direction = Output::new(p.P0_16, Level::High, OutputDrive::Standard);
    let dac = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());

    let motor = match Motor::new(dac, direction, encoder).calibrate(&mut delay) {
        Ok(motor) => motor,
        Err(e) => {
            error!("Motor calibration failed: {}", e);
            halt();
        }
    };

    let mut adc_config = saadc::Config::default();
    adc_config.resolution = saadc::Resolution::_10BIT;
    let saadc = Saadc::new(p.SAADC, Irqs, adc_config, [ChannelConfig::single_ended(p.P0_02)]);

    let controller = GameController::new(motor, servo, solenoid, &LIGHT);

    interrupt::EGU1_SWI1.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::EGU1_SWI1);
    unwrap!(high.spawn(receive_task(bus, Input::new(p.P0_23, Pull::Up))));
    unwrap!(high.spawn(sampling_task()));

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(spawner.spawn(control_task(bus, controller, saadc)));
    })
}
