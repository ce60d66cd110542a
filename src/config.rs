//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, protocol constants
//! and controller tuning live here so they can be tuned in one place.

// CAN bus (MCP2515 over SPI)

/// Bit timing for 125 kbit/s with a 16 MHz MCP2515 crystal.
pub const CAN_CNF1: u8 = 0x03;
pub const CAN_CNF2: u8 = 0xF0;
pub const CAN_CNF3: u8 = 0x86;

/// How many times init re-checks CANSTAT before giving up on a mode change.
pub const CAN_MODE_RETRIES: u8 = 8;

/// Maximum TXREQ polls before a send is abandoned with `Error::Timeout`.
pub const CAN_TX_READY_POLLS: u16 = 1_000;

/// Delay after the RESET instruction before the controller is usable (µs).
pub const CAN_RESET_SETTLE_US: u32 = 200;

/// SPI clock for the MCP2515 (Hz). The chip tolerates up to 10 MHz.
pub const CAN_SPI_FREQUENCY_HZ: u32 = 1_000_000;

// Message identifiers

/// Interface node → actuation node: full controller state, every cycle.
pub const MSG_ID_CONTROLLER: u16 = 0;

/// Actuation node → interface node: game-over pulse.
pub const MSG_ID_GAME_INFO: u16 = 1;

// Interface node timing

/// Period between controller snapshots (ms).
pub const SNAPSHOT_PERIOD_MS: u32 = 100;

/// Pause after re-rendering the menu before the next navigation poll (ms).
pub const MENU_POLL_MS: u32 = 500;

/// Settling time before the joystick centre is sampled at boot (ms).
pub const JOYSTICK_SETTLE_MS: u32 = 1_000;

/// Game-over banner: blink count and on/off times (ms).
pub const GAME_OVER_BLINKS: u8 = 10;
pub const GAME_OVER_ON_MS: u32 = 700;
pub const GAME_OVER_OFF_MS: u32 = 1_000;

/// Extra hold after a locally confirmed game over (ms).
pub const GAME_OVER_HOLD_MS: u32 = 5_000;

/// Game-over banner placement on the character display.
pub const GAME_OVER_LINE: u8 = 4;
pub const GAME_OVER_COL: u8 = 25;

// Input collector

/// Joystick dead zone around the calibrated centre (percent).
pub const JOYSTICK_DEAD_ZONE: i8 = 5;

/// Full-scale raw analog reading.
pub const ANALOG_FULL_SCALE: u8 = 255;

/// Joystick button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 20;

// Analog channel map of the multifunction board
//
//   Joystick X  → channel 5 (SAADC AIN5 / P0.29)
//   Joystick Y  → channel 4 (SAADC AIN4 / P0.28)
//   Slider L    → channel 6 (SAADC AIN6 / P0.30)
//   Slider R    → channel 7 (SAADC AIN7 / P0.31)

// Servo (PWM)

/// PWM period (µs); 50 Hz servo frame.
pub const SERVO_PERIOD_US: u16 = 20_000;

/// Pulse width at joystick centre (µs).
pub const SERVO_CENTER_US: u16 = 1_500;

/// Pulse width swing from centre to full deflection (µs).
pub const SERVO_HALF_RANGE_US: u16 = 500;

/// Pulses at or beyond these limits are withheld (µs).
pub const SERVO_LIMIT_LEFT_US: u16 = 900;
pub const SERVO_LIMIT_RIGHT_US: u16 = 2_100;

// Motor + encoder

/// 7-bit I²C address of the motor DAC (MAX520 at 0b0101_000x).
pub const MOTOR_DAC_ADDRESS: u8 = 0x28;

/// DAC command byte selecting output 0.
pub const MOTOR_DAC_COMMAND: u8 = 0x00;

/// Drive level used while range-finding.
pub const MOTOR_CALIBRATION_SPEED: i16 = 100;

/// Time the motor is driven against an end stop during calibration (ms).
pub const MOTOR_TRAVEL_MS: u32 = 1_000;

/// Encoder polling interval while waiting for the carriage to stop (ms).
pub const MOTOR_SETTLE_POLL_MS: u32 = 100;

/// Upper bound on settle polls before calibration is declared failed.
pub const MOTOR_SETTLE_MAX_POLLS: u16 = 50;

/// Pause between stopping the motor and zeroing the encoder (ms).
pub const MOTOR_STOP_MS: u32 = 180;

/// Hold time for the encoder reset line (µs) and byte-select settle (µs).
pub const ENCODER_RESET_US: u32 = 200;
pub const ENCODER_SELECT_US: u32 = 100;

// PID controller

/// Fixed-point scale applied to all gains.
pub const PID_SCALING_FACTOR: i32 = 128;

/// Controller output saturates at ±this value.
pub const PID_MAX_CONTROL: i16 = 1_023;

/// The integrator only accumulates while |error| is above this band.
pub const PID_ERROR_SLACK: i16 = 15;

/// Setpoints are kept this far away from the travel end stops.
pub const PID_EDGE_SLACK: u8 = 30;

/// Sampling timer period (µs); one PID step per period.
pub const PID_SAMPLE_PERIOD_US: u64 = 32_768;

/// Gains (Kp, Ki, Kd) scaled by `PID_SCALING_FACTOR`, per difficulty.
pub const PID_GAINS_EASY: (i16, i16, i16) = (128, 3, 2);
pub const PID_GAINS_MEDIUM: (i16, i16, i16) = (128, 10, 11);
pub const PID_GAINS_HARD: (i16, i16, i16) = (320, 256, 12);

// Goal sensor (IR photodiode)

/// Filtered readings below this level mean the beam is blocked.
pub const GOAL_LIGHT_THRESHOLD: u16 = 50;

/// Raw samples averaged into one filtered reading.
pub const GOAL_SAMPLES: usize = 4;

/// Debounce counter cap.
pub const GOAL_DEBOUNCE_CAP: u8 = 2;

/// Misses that end a round.
pub const MAX_MISSES: u8 = 3;

/// Pause between the over=1 and over=0 game-info frames (ms).
pub const GAME_OVER_PULSE_MS: u32 = 200;

/// Actuation node control loop period (ms).
pub const CONTROL_PERIOD_MS: u64 = 10;

// Solenoid

/// Striker pulse length (ms).
pub const SOLENOID_PULSE_MS: u32 = 300;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Interface node:
//   SPI SCK/MOSI/MISO → P0.19 / P0.20 / P0.21
//   MCP2515 CS        → P0.22
//   MCP2515 INT       → P0.23
//   Joystick button   → P0.11 (active low)
//   Touch pads L/R    → P0.12 / P0.24 (active high)
//   I²C SDA / SCL     → P0.26 / P0.27 (SSD1306)
//
// Actuation node:
//   SPI SCK/MOSI/MISO → P0.19 / P0.20 / P0.21
//   MCP2515 CS        → P0.22
//   MCP2515 INT       → P0.23
//   Servo PWM         → P0.13
//   Solenoid          → P0.14 (active low)
//   Motor enable/dir  → P0.15 / P0.16
//   I²C SDA / SCL     → P0.26 / P0.27 (motor DAC)
//   Encoder D0..D7    → P1.01..P1.08
//   Encoder SEL/OE/RST→ P1.10 / P1.11 / P1.12
//   IR photodiode     → SAADC AIN0 / P0.02
