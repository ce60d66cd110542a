//! Push-button and touch-pad inputs.
//!
//! The joystick button confirms menu choices. A press must count once,
//! even though the menu only polls every few hundred milliseconds, so
//! presses are latched: the GPIO task raises a [`ConfirmLatch`] and the
//! menu consumes it.
//!
//! The touch pads are plain levels sampled with each snapshot.

use core::sync::atomic::{AtomicBool, Ordering};

/// Button state as the console sees it.
pub trait ButtonPanel {
    /// Either touch pad is currently pressed.
    fn touch(&mut self) -> bool;

    /// A confirm press happened since the last call. Consumes it.
    fn take_confirm(&mut self) -> bool;
}

/// One pending confirm press, set from a handler and taken by the loop.
#[derive(Debug, Default)]
pub struct ConfirmLatch {
    pending: AtomicBool,
}

impl ConfirmLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    pub fn press(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}
