//! GPIO buttons: joystick push-button (confirm) and touch pads.
//!
//! The joystick button is active-low with an internal pull-up and is
//! handled by an async task that waits for a GPIO edge, debounces it,
//! and raises the confirm latch. The touch pads are active-high levels
//! read on demand.

use embassy_nrf::gpio::Input;
use embassy_time::{Duration, Timer};

use crate::config::BUTTON_DEBOUNCE_MS;
use crate::input::buttons::{ButtonPanel, ConfirmLatch};

/// Run the confirm button loop.
///
/// Waits for the pin to go low (pressed), debounces, latches the press,
/// then waits for release before repeating.
pub async fn watch_confirm(mut button: Input<'static>, latch: &'static ConfirmLatch) -> ! {
    loop {
        button.wait_for_falling_edge().await;

        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if button.is_low() {
            debug!("Confirm pressed");
            latch.press();

            // Wait for release to avoid repeat triggers.
            button.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}

/// Touch pads plus the confirm latch.
pub struct Buttons {
    touch_left: Input<'static>,
    touch_right: Input<'static>,
    confirm: &'static ConfirmLatch,
}

impl Buttons {
    pub fn new(
        touch_left: Input<'static>,
        touch_right: Input<'static>,
        confirm: &'static ConfirmLatch,
    ) -> Self {
        Self {
            touch_left,
            touch_right,
            confirm,
        }
    }
}

impl ButtonPanel for Buttons {
    fn touch(&mut self) -> bool {
        self.touch_left.is_high() || self.touch_right.is_high()
    }

    fn take_confirm(&mut self) -> bool {
        self.confirm.take()
    }
}
