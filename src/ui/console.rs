//! Interface-node loop body.
//!
//! [`Console::tick`] runs once per snapshot period:
//!
//! 1. React to a game over reported by the actuation node.
//! 2. Every `MENU_POLL_MS`, apply the joystick direction and any latched
//!    confirm press to the menu, then redraw it.
//! 3. Sample all inputs and send a full controller snapshot.
//!
//! Game-over banners block the loop while they play, so no snapshots go
//! out in the meantime; the actuation node is idle by then anyway.

use embedded_hal::delay::DelayNs;

use super::display::{draw_game_over, draw_menu, CharacterDisplay};
use super::menu::{Menu, MenuAction};
use crate::bus::payload::{ControllerSnapshot, GameInfo};
use crate::bus::{BusMessage, Message, MessageSink};
use crate::config::{GAME_OVER_HOLD_MS, MENU_POLL_MS, SNAPSHOT_PERIOD_MS};
use crate::error::Result;
use crate::input::buttons::ButtonPanel;
use crate::input::{AnalogSampler, InputCollector};

/// Last game-info state seen from the actuation node.
///
/// The receive cache keeps returning the same frame until a new one
/// lands, so a game over is recognised by a change, not by the flag
/// alone: a new round sequence, or the flag rising.
#[derive(Clone, Copy, Debug, Default)]
struct RemoteGameState {
    sequence: u8,
    game_over: bool,
}

impl RemoteGameState {
    fn observe(&mut self, info: GameInfo) -> bool {
        let new_round = info.sequence != self.sequence;
        let rising = info.game_over && !self.game_over;
        self.sequence = info.sequence;
        self.game_over = info.game_over;
        new_round || rising
    }
}

/// Inputs, menu and display of the interface node.
pub struct Console<S, B, D> {
    sampler: S,
    buttons: B,
    display: D,
    inputs: InputCollector,
    menu: Menu,
    remote: RemoteGameState,
    since_poll_ms: u32,
}

impl<S, B, D> Console<S, B, D>
where
    S: AnalogSampler,
    B: ButtonPanel,
    D: CharacterDisplay,
{
    /// `inputs` must already hold the boot-time joystick calibration.
    pub fn new(sampler: S, buttons: B, display: D, inputs: InputCollector) -> Self {
        Self {
            sampler,
            buttons,
            display,
            inputs,
            menu: Menu::new(),
            remote: RemoteGameState::default(),
            // Draw on the first tick.
            since_poll_ms: MENU_POLL_MS,
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// One loop cycle. `remote` is the receive cache's latest frame.
    pub fn tick(
        &mut self,
        remote: Option<Message>,
        sink: &mut impl MessageSink,
        delay: &mut impl DelayNs,
    ) -> Result<ControllerSnapshot> {
        if let Some(message) = remote {
            self.check_remote(&message, delay)?;
        }

        self.since_poll_ms = self.since_poll_ms.saturating_add(SNAPSHOT_PERIOD_MS);
        if self.since_poll_ms >= MENU_POLL_MS {
            self.since_poll_ms = 0;
            self.poll_menu(delay)?;
        }

        let snapshot = self.snapshot();
        sink.send(&snapshot.encode())?;
        Ok(snapshot)
    }

    fn check_remote(&mut self, message: &Message, delay: &mut impl DelayNs) -> Result<()> {
        match BusMessage::classify(message) {
            Ok(BusMessage::GameInfo(info)) => {
                if self.remote.observe(info) {
                    info!("Remote game over (round {})", info.sequence);
                    self.menu.force_game_over();
                    draw_game_over(&mut self.display, delay)?;
                    self.since_poll_ms = MENU_POLL_MS;
                }
            }
            Ok(BusMessage::Controller(_)) => {}
            Err(e) => debug!("Ignoring frame {=u16}: {}", message.id(), e),
        }
        Ok(())
    }

    fn poll_menu(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        let direction = self.inputs.joystick(&mut self.sampler).direction();
        let confirm = self.buttons.take_confirm();

        if let Some(MenuAction::GameEnded) = self.menu.navigate(direction, confirm) {
            draw_game_over(&mut self.display, delay)?;
            delay.delay_ms(GAME_OVER_HOLD_MS);
        }
        draw_menu(&mut self.display, &self.menu)
    }

    fn snapshot(&mut self) -> ControllerSnapshot {
        let frame = self.inputs.sample(&mut self.sampler);
        let flags = self.menu.flags();
        ControllerSnapshot {
            joystick_x: frame.joystick.x,
            joystick_y: frame.joystick.y,
            touch: self.buttons.touch(),
            slider_left: frame.sliders.left,
            slider_right: frame.sliders.right,
            play: flags.play,
            difficulty: flags.difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::fake::RecordingSink;
    use crate::bus::payload::Difficulty;
    use crate::input::fake::FixedSampler;
    use crate::input::joystick::JoystickCalibration;
    use crate::ui::display::recorder::{Op, Recorder};
    use crate::ui::menu::NodeId;

    #[derive(Default)]
    struct Buttons {
        touch: bool,
        confirms: u8,
    }

    impl ButtonPanel for Buttons {
        fn touch(&mut self) -> bool {
            self.touch
        }

        fn take_confirm(&mut self) -> bool {
            if self.confirms > 0 {
                self.confirms -= 1;
                true
            } else {
                false
            }
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestConsole = Console<FixedSampler, Buttons, Recorder>;

    fn console() -> TestConsole {
        Console::new(
            FixedSampler::centred(),
            Buttons::default(),
            Recorder::default(),
            InputCollector::with_calibration(JoystickCalibration::default()),
        )
    }

    fn ticks_per_poll() -> usize {
        (MENU_POLL_MS / SNAPSHOT_PERIOD_MS) as usize
    }

    fn banner_count(console: &TestConsole) -> usize {
        console.display().count(&Op::Print("GAME OVER".into()))
    }

    #[test]
    fn every_tick_sends_a_snapshot() {
        let mut console = console();
        let mut sink = RecordingSink::default();
        console.sampler.left = 200;
        console.sampler.right = 50;
        console.buttons.touch = true;

        for _ in 0..3 {
            console.tick(None, &mut sink, &mut NoDelay).unwrap();
        }

        assert_eq!(sink.sent.len(), 3);
        let last = ControllerSnapshot::decode(sink.sent.last().unwrap()).unwrap();
        assert_eq!(last.slider_left, 200);
        assert_eq!(last.slider_right, 50);
        assert!(last.touch);
        assert!(!last.play);
    }

    #[test]
    fn menu_polls_at_its_own_rate() {
        let mut console = console();
        let mut sink = RecordingSink::default();

        console.tick(None, &mut sink, &mut NoDelay).unwrap();
        let draws = console.display().count(&Op::Clear);
        assert_eq!(draws, 1);

        for _ in 0..ticks_per_poll() {
            console.tick(None, &mut sink, &mut NoDelay).unwrap();
        }
        assert_eq!(console.display().count(&Op::Clear), 2);
    }

    #[test]
    fn confirm_on_play_game_starts_a_round() {
        let mut console = console();
        let mut sink = RecordingSink::default();
        console.buttons.confirms = 1;

        let snapshot = console.tick(None, &mut sink, &mut NoDelay).unwrap();

        assert!(snapshot.play);
        assert_eq!(console.menu().cursor(), NodeId::EndGame);
    }

    #[test]
    fn remote_game_over_is_handled_once_per_round() {
        let mut console = console();
        let mut sink = RecordingSink::default();
        console.buttons.confirms = 1;
        console.tick(None, &mut sink, &mut NoDelay).unwrap();
        assert!(console.menu().flags().play);

        let over = GameInfo {
            sequence: 1,
            game_over: true,
        }
        .encode();
        let snapshot = console.tick(Some(over), &mut sink, &mut NoDelay).unwrap();

        assert!(!snapshot.play);
        assert_eq!(snapshot.difficulty, Difficulty::Easy);
        assert_eq!(console.menu().cursor(), NodeId::PlayGame);
        assert_eq!(banner_count(&console), 10);

        // The cache keeps serving the same frame, then the over=0 half.
        console.tick(Some(over), &mut sink, &mut NoDelay).unwrap();
        let cleared = GameInfo {
            sequence: 1,
            game_over: false,
        }
        .encode();
        console.tick(Some(cleared), &mut sink, &mut NoDelay).unwrap();
        assert_eq!(banner_count(&console), 10);
    }

    #[test]
    fn missed_rising_edge_is_caught_by_sequence() {
        let mut console = console();
        let mut sink = RecordingSink::default();

        let cleared = GameInfo {
            sequence: 3,
            game_over: false,
        }
        .encode();
        console.tick(Some(cleared), &mut sink, &mut NoDelay).unwrap();

        assert_eq!(banner_count(&console), 10);
    }

    #[test]
    fn local_game_over_plays_banner_and_resets_flags() {
        let mut console = console();
        let mut sink = RecordingSink::default();

        console.buttons.confirms = 3;
        for _ in 0..=(2 * ticks_per_poll()) {
            console.tick(None, &mut sink, &mut NoDelay).unwrap();
        }

        assert_eq!(banner_count(&console), 10);
        assert_eq!(console.menu().cursor(), NodeId::PlayGame);
        let last = ControllerSnapshot::decode(sink.sent.last().unwrap()).unwrap();
        assert!(!last.play);
    }

    #[test]
    fn unknown_frames_are_ignored() {
        let mut console = console();
        let mut sink = RecordingSink::default();
        let stray = Message::new(0x55, &[1, 2, 3]).unwrap();

        console.tick(Some(stray), &mut sink, &mut NoDelay).unwrap();

        assert_eq!(banner_count(&console), 0);
        assert_eq!(sink.sent.len(), 1);
    }
}
