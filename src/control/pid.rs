//! Fixed-point PID position controller for the defender motor.
//!
//! Gains are integers scaled by [`PID_SCALING_FACTOR`]; the sum of the
//! three terms is divided by the same factor and saturated to
//! ±[`PID_MAX_CONTROL`].
//!
//! Anti-windup freezes the integral inside a small error band instead of
//! clamping it afterwards: the running sum only moves while
//! |error| > [`PID_ERROR_SLACK`].

use crate::bus::payload::Difficulty;
use crate::config::{
    ANALOG_FULL_SCALE, PID_EDGE_SLACK, PID_ERROR_SLACK, PID_GAINS_EASY, PID_GAINS_HARD,
    PID_GAINS_MEDIUM, PID_MAX_CONTROL, PID_SCALING_FACTOR,
};

/// Proportional, integral and derivative gains, each ×128.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gains {
    pub kp: i16,
    pub ki: i16,
    pub kd: i16,
}

impl Gains {
    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        let (kp, ki, kd) = match difficulty {
            Difficulty::Easy => PID_GAINS_EASY,
            Difficulty::Medium => PID_GAINS_MEDIUM,
            Difficulty::Hard => PID_GAINS_HARD,
        };
        Self { kp, ki, kd }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pid {
    gains: Gains,
    error_sum: i32,
    previous_error: i16,
}

impl Pid {
    pub const fn new(difficulty: Difficulty) -> Self {
        Self {
            gains: Gains::for_difficulty(difficulty),
            error_sum: 0,
            previous_error: 0,
        }
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Switch gain set. Clears controller memory.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.gains = Gains::for_difficulty(difficulty);
        self.reset();
    }

    /// Forget the integral and the previous error.
    pub fn reset(&mut self) {
        self.error_sum = 0;
        self.previous_error = 0;
    }

    /// Current integral contribution before scaling (Ki · Σe).
    pub fn integral_term(&self) -> i64 {
        i64::from(self.gains.ki) * i64::from(self.error_sum)
    }

    /// Target position after keeping it clear of the end stops.
    pub fn clamp_setpoint(setpoint: u8) -> u8 {
        setpoint.clamp(PID_EDGE_SLACK, ANALOG_FULL_SCALE - PID_EDGE_SLACK)
    }

    /// One control step. `setpoint` and `feedback` are both 0..=255.
    pub fn step(&mut self, setpoint: u8, feedback: u8) -> i16 {
        let target = Self::clamp_setpoint(setpoint);
        let error = i16::from(target) - i16::from(feedback);

        if error.abs() > PID_ERROR_SLACK {
            self.error_sum = self.error_sum.saturating_add(i32::from(error));
        }

        let p = i64::from(self.gains.kp) * i64::from(error);
        let i = self.integral_term();
        let d = i64::from(self.gains.kd) * i64::from(error - self.previous_error);
        self.previous_error = error;

        let control = (p + i + d) / i64::from(PID_SCALING_FACTOR);
        let limit = i64::from(PID_MAX_CONTROL);
        control.clamp(-limit, limit) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_sets_per_difficulty() {
        assert_eq!(Gains::for_difficulty(Difficulty::Easy), Gains { kp: 128, ki: 3, kd: 2 });
        assert_eq!(Gains::for_difficulty(Difficulty::Medium), Gains { kp: 128, ki: 10, kd: 11 });
        assert_eq!(Gains::for_difficulty(Difficulty::Hard), Gains { kp: 320, ki: 256, kd: 12 });
    }

    #[test]
    fn setpoint_is_kept_off_the_end_stops() {
        assert_eq!(Pid::clamp_setpoint(0), 30);
        assert_eq!(Pid::clamp_setpoint(255), 225);
        assert_eq!(Pid::clamp_setpoint(200), 200);
    }

    #[test]
    fn first_step_easy() {
        let mut pid = Pid::new(Difficulty::Easy);
        // e = 100: P = 12800, I = 3·100, D = 2·100 → 13300 / 128 = 103
        assert_eq!(pid.step(200, 100), 103);
    }

    #[test]
    fn integral_grows_monotonically_outside_band() {
        for (setpoint, feedback) in [(200u8, 100u8), (40, 200)] {
            let mut pid = Pid::new(Difficulty::Medium);
            let mut previous = pid.integral_term();
            for _ in 0..20 {
                pid.step(setpoint, feedback);
                let current = pid.integral_term();
                if setpoint > feedback {
                    assert!(current > previous);
                } else {
                    assert!(current < previous);
                }
                previous = current;
            }
        }
    }

    #[test]
    fn integral_is_frozen_inside_band() {
        let mut pid = Pid::new(Difficulty::Hard);
        pid.step(200, 100);
        let frozen = pid.integral_term();
        assert_ne!(frozen, 0);

        for feedback in [185u8, 190, 200, 215, 190] {
            pid.step(200, feedback);
            assert_eq!(pid.integral_term(), frozen);
        }
    }

    #[test]
    fn output_saturates() {
        let mut pid = Pid::new(Difficulty::Hard);
        let mut control = 0;
        for _ in 0..50 {
            control = pid.step(225, 0);
        }
        assert_eq!(control, PID_MAX_CONTROL);

        let mut pid = Pid::new(Difficulty::Hard);
        for _ in 0..50 {
            control = pid.step(30, 255);
        }
        assert_eq!(control, -PID_MAX_CONTROL);
    }

    #[test]
    fn derivative_uses_previous_error() {
        let mut pid = Pid::new(Difficulty::Easy);
        pid.step(100, 100);
        // e = 10 inside the band: P = 1280, I = 0, D = 2·10 → 1300 / 128 = 10
        assert_eq!(pid.step(100, 90), 10);
        // e = 10 again: D = 0 → 1280 / 128 = 10
        assert_eq!(pid.step(100, 90), 10);
    }

    #[test]
    fn difficulty_change_resets_memory() {
        let mut pid = Pid::new(Difficulty::Easy);
        pid.step(200, 0);
        pid.set_difficulty(Difficulty::Hard);
        assert_eq!(pid.integral_term(), 0);
        assert_eq!(pid.gains(), Gains::for_difficulty(Difficulty::Hard));
    }
}
