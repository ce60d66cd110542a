//! PID sampling cadence.
//!
//! A periodic timer handler raises the flag; the control tick takes it.
//! Only the tick touches PID state, so the handler never races it.

use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct SamplingClock {
    due: AtomicBool,
}

impl SamplingClock {
    pub const fn new() -> Self {
        Self {
            due: AtomicBool::new(false),
        }
    }

    /// Timer side: a sampling period has elapsed.
    pub fn raise(&self) {
        self.due.store(true, Ordering::Release);
    }

    /// Control side: consume the flag. Several raises between two takes
    /// still mean one PID step.
    pub fn take(&self) -> bool {
        self.due.swap(false, Ordering::AcqRel)
    }
}
