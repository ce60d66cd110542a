//! Goal (miss) detection on the IR beam.
//!
//! A ball in the goal blocks the beam, so the photodiode level drops
//! below [`GOAL_LIGHT_THRESHOLD`]. The raw level is noisy, so each
//! reading is the mean of [`GOAL_SAMPLES`] conversions, and a small
//! debounce counter turns one blocked episode of any length into
//! exactly one tally increment.

use crate::config::{GOAL_DEBOUNCE_CAP, GOAL_LIGHT_THRESHOLD, GOAL_SAMPLES};

/// IR photodiode behind an ADC.
pub trait LightSensor {
    fn read(&mut self) -> u16;
}

/// Mean of `GOAL_SAMPLES` raw conversions.
pub fn filtered_level(sensor: &mut impl LightSensor) -> u16 {
    let sum: u32 = (0..GOAL_SAMPLES).map(|_| u32::from(sensor.read())).sum();
    (sum / GOAL_SAMPLES as u32) as u16
}

/// Debounce counter + tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GoalCounter {
    debounce: u8,
    tally: u8,
}

impl GoalCounter {
    pub const fn new() -> Self {
        Self {
            debounce: 0,
            tally: 0,
        }
    }

    pub fn tally(&self) -> u8 {
        self.tally
    }

    /// Feed one filtered level. Returns true if it counted a new goal.
    pub fn update(&mut self, level: u16) -> bool {
        if level < GOAL_LIGHT_THRESHOLD {
            if self.debounce < GOAL_DEBOUNCE_CAP {
                self.debounce += 1;
                if self.debounce == 1 {
                    self.tally = self.tally.saturating_add(1);
                    debug!("Goal {}", self.tally);
                    return true;
                }
            }
        } else if level > GOAL_LIGHT_THRESHOLD {
            self.debounce = 0;
        }
        false
    }

    /// Start a new round.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK: u16 = 10;
    const LIGHT: u16 = 400;

    struct Samples<'a>(core::slice::Iter<'a, u16>);

    impl LightSensor for Samples<'_> {
        fn read(&mut self) -> u16 {
            self.0.next().copied().unwrap_or(LIGHT)
        }
    }

    #[test]
    fn level_is_mean_of_four() {
        let raw = [40, 60, 20, 80, 999];
        let mut sensor = Samples(raw.iter());
        assert_eq!(filtered_level(&mut sensor), 50);
        assert_eq!(sensor.read(), 999);
    }

    #[test]
    fn one_episode_one_goal_regardless_of_length() {
        for length in 1..10 {
            let mut counter = GoalCounter::new();
            for _ in 0..length {
                counter.update(DARK);
            }
            counter.update(LIGHT);
            assert_eq!(counter.tally(), 1, "episode of {length}");
        }
    }

    #[test]
    fn second_episode_counts_again() {
        let mut counter = GoalCounter::new();
        for level in [DARK, DARK, DARK, LIGHT, LIGHT, DARK, LIGHT] {
            counter.update(level);
        }
        assert_eq!(counter.tally(), 2);
    }

    #[test]
    fn increment_happens_on_first_dark_reading() {
        let mut counter = GoalCounter::new();
        assert!(counter.update(DARK));
        assert!(!counter.update(DARK));
        assert!(!counter.update(DARK));
        assert!(!counter.update(LIGHT));
        assert!(counter.update(DARK));
    }

    #[test]
    fn threshold_level_changes_nothing() {
        let mut counter = GoalCounter::new();
        counter.update(DARK);
        counter.update(GOAL_LIGHT_THRESHOLD);
        counter.update(DARK);
        assert_eq!(counter.tally(), 1);
    }

    #[test]
    fn reset_clears_tally_and_debounce() {
        let mut counter = GoalCounter::new();
        counter.update(DARK);
        counter.reset();
        assert_eq!(counter.tally(), 0);
        assert!(counter.update(DARK));
    }
}
