//! Menu and game-over rendering on a character display.
//!
//! Rendering goes through [`CharacterDisplay`], a line/column text
//! interface. The SSD1306 OLED adapter lives in `board::display`; tests
//! use a recorder.

use embedded_hal::delay::DelayNs;
use heapless::String;

use super::menu::{Menu, NodeId};
use crate::config::{
    GAME_OVER_BLINKS, GAME_OVER_COL, GAME_OVER_LINE, GAME_OVER_OFF_MS, GAME_OVER_ON_MS,
};
use crate::error::{Error, Result};

/// First line used for menu entries (line 0 is the header).
pub const FIRST_ROW_LINE: u8 = 2;

const GAME_OVER_TEXT: &str = "GAME OVER";

/// Text-mode display primitives.
///
/// `line` counts text rows from the top; `column` is in pixels.
pub trait CharacterDisplay {
    fn position(&mut self, line: u8, column: u8) -> Result<()>;
    fn print(&mut self, text: &str) -> Result<()>;
    /// Print with inverted colours.
    fn print_highlighted(&mut self, text: &str) -> Result<()>;
    fn clear_line(&mut self, line: u8) -> Result<()>;
    fn clear(&mut self) -> Result<()>;

    /// Push buffered drawing to the panel. Unbuffered displays need not
    /// override this.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

type Row = String<24>;

fn row(prefix: &str, title: &str) -> Result<Row> {
    let mut text = Row::new();
    text.push_str(prefix).map_err(|_| Error::Display)?;
    text.push_str(title).map_err(|_| Error::Display)?;
    Ok(text)
}

/// Draw the level the cursor sits on: header, then every sibling with
/// the cursor row highlighted.
pub fn draw_menu<D: CharacterDisplay>(display: &mut D, menu: &Menu) -> Result<()> {
    let cursor = menu.cursor();
    display.clear()?;

    if cursor == NodeId::GameOver {
        return display.flush();
    }

    display.position(0, 0)?;
    let first = match cursor.parent() {
        Some(NodeId::PlayGame) => {
            display.print("  PLAYING GAME")?;
            NodeId::PlayGame.child()
        }
        Some(parent) => {
            display.print(&row("   ", parent.title())?)?;
            parent.child()
        }
        None => {
            display.print(&row("   ", cursor.title())?)?;
            Some(cursor)
        }
    };

    let mut line = FIRST_ROW_LINE;
    let mut entry = first;
    while let Some(id) = entry {
        display.position(line, 0)?;
        if id == cursor {
            display.print_highlighted(&row("o ", id.title())?)?;
        } else {
            display.print(&row("  ", id.title())?)?;
        }
        line += 1;
        entry = id.right();
    }

    display.flush()
}

/// Blink the game-over banner. Blocks for the whole sequence.
pub fn draw_game_over<D: CharacterDisplay>(display: &mut D, delay: &mut impl DelayNs) -> Result<()> {
    display.clear()?;
    for _ in 0..GAME_OVER_BLINKS {
        display.position(GAME_OVER_LINE, GAME_OVER_COL)?;
        display.print(GAME_OVER_TEXT)?;
        display.flush()?;
        delay.delay_ms(GAME_OVER_ON_MS);

        display.clear_line(GAME_OVER_LINE)?;
        display.flush()?;
        delay.delay_ms(GAME_OVER_OFF_MS);
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::recorder::{Op, Recorder};
    use super::*;
    use crate::input::joystick::Direction;

    #[derive(Default)]
    struct Clock {
        elapsed_ms: u64,
    }

    impl DelayNs for Clock {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ms += u64::from(ns) / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.elapsed_ms += u64::from(ms);
        }
    }

    #[test]
    fn top_level_lists_siblings_with_cursor_marked() {
        let mut display = Recorder::default();
        draw_menu(&mut display, &Menu::new()).unwrap();

        assert_eq!(
            display.screen(),
            ["   MAIN MENU", "[o PLAY GAME]", "  GAME SETTINGS", "  HIGHSCORES"]
        );
        assert_eq!(display.ops[1], Op::Position(0, 0));
        assert_eq!(display.ops[3], Op::Position(FIRST_ROW_LINE, 0));
        assert_eq!(display.ops.last(), Some(&Op::Flush));
    }

    #[test]
    fn play_game_level_has_its_own_header() {
        let mut menu = Menu::new();
        menu.navigate(Direction::Neutral, true);

        let mut display = Recorder::default();
        draw_menu(&mut display, &menu).unwrap();

        assert_eq!(display.screen(), ["  PLAYING GAME", "[o END GAME]"]);
    }

    #[test]
    fn nested_level_lists_from_first_child() {
        let mut menu = Menu::new();
        menu.navigate(Direction::Down, true);
        menu.navigate(Direction::Neutral, true);
        menu.navigate(Direction::Down, false);

        let mut display = Recorder::default();
        draw_menu(&mut display, &menu).unwrap();

        assert_eq!(display.screen(), ["   DIFFICULTY", "  EASY", "[o MEDIUM]", "  HARD"]);
    }

    #[test]
    fn game_over_node_blanks_the_screen() {
        let mut menu = Menu::new();
        menu.navigate(Direction::Neutral, true);
        menu.navigate(Direction::Neutral, true);

        let mut display = Recorder::default();
        draw_menu(&mut display, &menu).unwrap();

        assert_eq!(display.ops, [Op::Clear, Op::Flush]);
    }

    #[test]
    fn game_over_banner_blinks_ten_times() {
        let mut display = Recorder::default();
        let mut clock = Clock::default();

        draw_game_over(&mut display, &mut clock).unwrap();

        assert_eq!(display.count(&Op::Print("GAME OVER".into())), 10);
        assert_eq!(display.count(&Op::Position(4, 25)), 10);
        assert_eq!(display.count(&Op::ClearLine(4)), 10);
        assert_eq!(clock.elapsed_ms, 10 * (700 + 1_000));
    }
}
