//! Actuation-node control logic.
//!
//! ## Components
//!
//! - **Game**: per-tick round logic and the game-over pulse
//! - **PID**: fixed-point position controller for the defender motor
//! - **Servo**: joystick → pulse-width mapping with limit checks
//! - **Motor**: DAC drive, encoder feedback, end-stop calibration
//! - **Goal**: IR beam filtering and miss debounce
//! - **Solenoid**: striker pulse
//! - **Sampling**: timer-raised PID cadence flag

pub mod game;
pub mod goal;
pub mod motor;
pub mod pid;
pub mod sampling;
pub mod servo;
pub mod solenoid;

pub use game::{GameController, PlayReport, TickOutcome};
pub use motor::{CalibratedMotor, Encoder, Motor, PositionActuator};
pub use sampling::SamplingClock;
