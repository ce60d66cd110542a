//! Actuation-node game controller.
//!
//! One [`GameController::tick`] per main-loop pass, fed with the latest
//! controller snapshot from the bus cache:
//!
//! - no snapshot yet, or play = 0: idle. Goal tally and PID memory are
//!   cleared.
//! - play = 1: count misses on the IR beam; on the third, send the
//!   game-over pulse (over=1, pause, over=0) and latch. Otherwise steer
//!   the servo from joystick x, run one PID step on the motor if the
//!   sampling clock is due, and strike the solenoid if touch is held.
//!
//! After a game over the controller stays idle until it sees play = 0.
//! The interface node keeps sending play = 1 until its menu has reacted,
//! and those stale snapshots must not start counting again.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use super::goal::{filtered_level, GoalCounter, LightSensor};
use super::motor::PositionActuator;
use super::pid::Pid;
use super::sampling::SamplingClock;
use super::servo::Servo;
use super::solenoid::Solenoid;
use crate::bus::payload::{ControllerSnapshot, Difficulty, GameInfo};
use crate::bus::MessageSink;
use crate::config::{GAME_OVER_PULSE_MS, MAX_MISSES};
use crate::error::Result;

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Idle,
    /// Miss limit reached; the game-over pulse went out with this round number.
    GameOver { sequence: u8 },
    Played(PlayReport),
}

/// Details of a playing tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayReport {
    /// Misses so far this round.
    pub misses: u8,
    /// A new miss was counted on this tick.
    pub missed: bool,
    /// Servo pulse applied, or `None` if it was withheld.
    pub pulse_us: Option<u16>,
    /// PID target (after edge clamping), if the controller ran.
    pub setpoint: Option<u8>,
    /// Motor drive level, if the controller ran.
    pub control: Option<i16>,
    pub fired: bool,
}

/// Every actuator of the node plus the round state.
pub struct GameController<A, P, S, L> {
    motor: A,
    servo: Servo<P>,
    solenoid: Solenoid<S>,
    light: L,
    pid: Pid,
    goals: GoalCounter,
    difficulty: Difficulty,
    sequence: u8,
    latched: bool,
    running: bool,
}

impl<A, P, S, L> GameController<A, P, S, L>
where
    A: PositionActuator,
    P: SetDutyCycle,
    S: OutputPin,
    L: LightSensor,
{
    /// `motor` must be calibrated; see `Motor::calibrate`.
    pub fn new(motor: A, servo: Servo<P>, solenoid: Solenoid<S>, light: L) -> Self {
        Self {
            motor,
            servo,
            solenoid,
            light,
            pid: Pid::new(Difficulty::Easy),
            goals: GoalCounter::new(),
            difficulty: Difficulty::Easy,
            sequence: 0,
            latched: false,
            running: false,
        }
    }

    pub fn misses(&self) -> u8 {
        self.goals.tally()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Waiting for play = 0 after a game over.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn tick(
        &mut self,
        snapshot: Option<&ControllerSnapshot>,
        clock: &SamplingClock,
        sink: &mut impl MessageSink,
        delay: &mut impl DelayNs,
    ) -> Result<TickOutcome> {
        let sample_due = clock.take();

        let Some(snapshot) = snapshot else {
            return self.idle();
        };

        if snapshot.difficulty != self.difficulty {
            info!("Difficulty {} -> {}", self.difficulty, snapshot.difficulty);
            self.difficulty = snapshot.difficulty;
            self.pid.set_difficulty(snapshot.difficulty);
        }

        if !snapshot.play {
            self.latched = false;
            return self.idle();
        }
        if self.latched {
            return self.idle();
        }
        self.running = true;

        let missed = self.goals.update(filtered_level(&mut self.light));
        if self.goals.tally() >= MAX_MISSES {
            return self.game_over(sink, delay);
        }

        let pulse_us = self.servo.follow(snapshot.joystick_x)?;

        let (setpoint, control) = if sample_due {
            let feedback = self.motor.position()?;
            let control = self.pid.step(snapshot.slider_left, feedback);
            self.motor.drive(control)?;
            (Some(Pid::clamp_setpoint(snapshot.slider_left)), Some(control))
        } else {
            (None, None)
        };

        if snapshot.touch {
            self.solenoid.strike(delay)?;
        }

        Ok(TickOutcome::Played(PlayReport {
            misses: self.goals.tally(),
            missed,
            pulse_us,
            setpoint,
            control,
            fired: snapshot.touch,
        }))
    }

    fn idle(&mut self) -> Result<TickOutcome> {
        self.goals.reset();
        self.pid.reset();
        if self.running {
            self.running = false;
            self.motor.drive(0)?;
        }
        Ok(TickOutcome::Idle)
    }

    fn game_over(&mut self, sink: &mut impl MessageSink, delay: &mut impl DelayNs) -> Result<TickOutcome> {
        self.latched = true;
        self.running = false;
        self.goals.reset();
        self.pid.reset();
        self.sequence = self.sequence.wrapping_add(1);
        info!("Game over, round {}", self.sequence);

        self.motor.drive(0)?;

        let sequence = self.sequence;
        sink.send(
            &GameInfo {
                sequence,
                game_over: true,
            }
            .encode(),
        )?;
        delay.delay_ms(GAME_OVER_PULSE_MS);
        sink.send(
            &GameInfo {
                sequence,
                game_over: false,
            }
            .encode(),
        )?;

        Ok(TickOutcome::GameOver { sequence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::fake::RecordingSink;
    use crate::config::GOAL_LIGHT_THRESHOLD;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::pwm::ErrorType as PwmErrorType;

    const DARK: u16 = GOAL_LIGHT_THRESHOLD / 5;
    const LIGHT: u16 = GOAL_LIGHT_THRESHOLD * 8;

    #[derive(Default)]
    struct FakeMotor {
        position: u8,
        drives: Vec<i16>,
    }

    impl PositionActuator for FakeMotor {
        fn position(&mut self) -> Result<u8> {
            Ok(self.position)
        }

        fn drive(&mut self, control: i16) -> Result<()> {
            self.drives.push(control);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePwm {
        duty: Option<u16>,
    }

    impl PwmErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            20_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Infallible> {
            self.duty = Some(duty);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePin;

    impl PinErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    struct Beam(u16);

    impl LightSensor for Beam {
        fn read(&mut self) -> u16 {
            self.0
        }
    }

    #[derive(Default)]
    struct Clock {
        waits: Vec<u32>,
    }

    impl DelayNs for Clock {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.waits.push(ms);
        }
    }

    type Controller = GameController<FakeMotor, FakePwm, FakePin, Beam>;

    fn controller() -> Controller {
        GameController::new(
            FakeMotor {
                position: 128,
                drives: Vec::new(),
            },
            Servo::new(FakePwm::default()),
            Solenoid::new(FakePin::default()).unwrap(),
            Beam(LIGHT),
        )
    }

    fn playing() -> ControllerSnapshot {
        ControllerSnapshot {
            play: true,
            ..Default::default()
        }
    }

    fn miss(game: &mut Controller, snapshot: &ControllerSnapshot, sink: &mut RecordingSink, clock: &mut Clock) -> TickOutcome {
        let sampling = SamplingClock::new();
        game.light.0 = DARK;
        let outcome = game.tick(Some(snapshot), &sampling, sink, clock).unwrap();
        game.light.0 = LIGHT;
        game.tick(Some(snapshot), &sampling, sink, clock).unwrap();
        outcome
    }

    #[test]
    fn nothing_received_is_idle() {
        let mut game = controller();
        let outcome = game
            .tick(None, &SamplingClock::new(), &mut RecordingSink::default(), &mut Clock::default())
            .unwrap();
        assert_eq!(outcome, TickOutcome::Idle);
    }

    #[test]
    fn pid_runs_only_when_sampling_is_due() {
        let mut game = controller();
        let sampling = SamplingClock::new();
        let mut sink = RecordingSink::default();
        let snapshot = ControllerSnapshot {
            slider_left: 10,
            ..playing()
        };

        let TickOutcome::Played(report) = game
            .tick(Some(&snapshot), &sampling, &mut sink, &mut Clock::default())
            .unwrap()
        else {
            panic!("expected a playing tick");
        };
        assert_eq!(report.setpoint, None);
        assert!(game.motor.drives.is_empty());

        sampling.raise();
        let TickOutcome::Played(report) = game
            .tick(Some(&snapshot), &sampling, &mut sink, &mut Clock::default())
            .unwrap()
        else {
            panic!("expected a playing tick");
        };
        assert_eq!(report.setpoint, Some(30));
        assert_eq!(game.motor.drives.len(), 1);
        assert!(report.control.unwrap() < 0);
    }

    #[test]
    fn touch_strikes_once_per_tick() {
        let mut game = controller();
        let mut clock = Clock::default();
        let snapshot = ControllerSnapshot {
            touch: true,
            ..playing()
        };

        let outcome = game
            .tick(Some(&snapshot), &SamplingClock::new(), &mut RecordingSink::default(), &mut clock)
            .unwrap();

        assert!(matches!(
            outcome,
            TickOutcome::Played(PlayReport { fired: true, pulse_us: Some(1_500), .. })
        ));
        assert_eq!(game.servo_duty(), Some(1_500));
        assert_eq!(clock.waits, [crate::config::SOLENOID_PULSE_MS]);
    }

    #[test]
    fn third_miss_sends_two_message_pulse_and_latches() {
        let mut game = controller();
        let mut sink = RecordingSink::default();
        let mut clock = Clock::default();
        let snapshot = playing();

        miss(&mut game, &snapshot, &mut sink, &mut clock);
        miss(&mut game, &snapshot, &mut sink, &mut clock);
        assert!(sink.sent.is_empty());
        let outcome = miss(&mut game, &snapshot, &mut sink, &mut clock);

        assert_eq!(outcome, TickOutcome::GameOver { sequence: 1 });
        assert_eq!(
            sink.sent,
            [
                GameInfo { sequence: 1, game_over: true }.encode(),
                GameInfo { sequence: 1, game_over: false }.encode(),
            ]
        );
        assert_eq!(clock.waits, [GAME_OVER_PULSE_MS]);
        assert!(game.is_latched());
        assert_eq!(game.motor.drives.last(), Some(&0));
    }

    #[test]
    fn latch_holds_until_play_drops() {
        let mut game = controller();
        let mut sink = RecordingSink::default();
        let mut clock = Clock::default();
        let sampling = SamplingClock::new();
        let snapshot = playing();
        for _ in 0..3 {
            miss(&mut game, &snapshot, &mut sink, &mut clock);
        }

        game.light.0 = DARK;
        let stale = game.tick(Some(&snapshot), &sampling, &mut sink, &mut clock).unwrap();
        assert_eq!(stale, TickOutcome::Idle);
        assert_eq!(game.misses(), 0);

        let stopped = ControllerSnapshot::default();
        game.tick(Some(&stopped), &sampling, &mut sink, &mut clock).unwrap();
        assert!(!game.is_latched());

        let outcome = game.tick(Some(&snapshot), &sampling, &mut sink, &mut clock).unwrap();
        assert!(matches!(outcome, TickOutcome::Played(PlayReport { misses: 1, missed: true, .. })));
    }

    #[test]
    fn second_round_bumps_the_sequence() {
        let mut game = controller();
        let mut sink = RecordingSink::default();
        let mut clock = Clock::default();
        let sampling = SamplingClock::new();
        let snapshot = playing();

        for _ in 0..3 {
            miss(&mut game, &snapshot, &mut sink, &mut clock);
        }
        game.tick(Some(&ControllerSnapshot::default()), &sampling, &mut sink, &mut clock)
            .unwrap();
        for _ in 0..2 {
            miss(&mut game, &snapshot, &mut sink, &mut clock);
        }
        let outcome = miss(&mut game, &snapshot, &mut sink, &mut clock);

        assert_eq!(outcome, TickOutcome::GameOver { sequence: 2 });
        assert_eq!(sink.sent.len(), 4);
    }

    #[test]
    fn stopping_play_resets_round_and_motor() {
        let mut game = controller();
        let mut sink = RecordingSink::default();
        let mut clock = Clock::default();
        let snapshot = playing();
        miss(&mut game, &snapshot, &mut sink, &mut clock);
        assert_eq!(game.misses(), 1);

        let outcome = game
            .tick(Some(&ControllerSnapshot::default()), &SamplingClock::new(), &mut sink, &mut clock)
            .unwrap();

        assert_eq!(outcome, TickOutcome::Idle);
        assert_eq!(game.misses(), 0);
        assert_eq!(game.motor.drives, [0]);
    }

    #[test]
    fn difficulty_change_swaps_gains_and_clears_memory() {
        let mut game = controller();
        let sampling = SamplingClock::new();
        let mut sink = RecordingSink::default();
        let mut clock = Clock::default();

        sampling.raise();
        let easy = ControllerSnapshot {
            slider_left: 225,
            ..playing()
        };
        game.tick(Some(&easy), &sampling, &mut sink, &mut clock).unwrap();
        assert_ne!(game.pid().integral_term(), 0);

        let hard = ControllerSnapshot {
            difficulty: Difficulty::Hard,
            ..easy
        };
        game.tick(Some(&hard), &sampling, &mut sink, &mut clock).unwrap();

        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert_eq!(game.pid().integral_term(), 0);
    }

    impl Controller {
        fn servo_duty(&self) -> Option<u16> {
            self.servo.channel().duty
        }
    }
}
