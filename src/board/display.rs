//! SSD1306 OLED as a character display.
//!
//! 128×64 panel, 5×8 font: eight text lines of up to 25 characters.
//! Drawing goes to the driver's frame buffer; `flush` pushes it out.

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::error::{Error, Result};
use crate::ui::display::CharacterDisplay;

/// Type alias for the concrete display driver.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const LINE_HEIGHT: i32 = 8;
const CHAR_WIDTH: i32 = 5;
const PANEL_WIDTH: u32 = 128;

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_5X8)
        .text_color(BinaryColor::On)
        .background_color(BinaryColor::Off)
        .build()
}

fn highlight_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_5X8)
        .text_color(BinaryColor::Off)
        .background_color(BinaryColor::On)
        .build()
}

/// OLED with a text cursor.
pub struct Oled<I2C> {
    display: Display<I2C>,
    cursor: Point,
}

impl<I2C> Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and clear the screen.
    pub fn init(i2c: I2C) -> Result<Self> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| Error::Display)?;
        display.clear_buffer();
        display.flush().map_err(|_| Error::Display)?;
        Ok(Self {
            display,
            cursor: Point::zero(),
        })
    }

    fn draw(&mut self, text: &str, style: MonoTextStyle<'static, BinaryColor>) -> Result<()> {
        Text::with_baseline(text, self.cursor, style, Baseline::Top)
            .draw(&mut self.display)
            .map_err(|_| Error::Display)?;
        self.cursor.x += CHAR_WIDTH * text.len() as i32;
        Ok(())
    }
}

impl<I2C> CharacterDisplay for Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn position(&mut self, line: u8, column: u8) -> Result<()> {
        self.cursor = Point::new(i32::from(column), i32::from(line) * LINE_HEIGHT);
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.draw(text, text_style())
    }

    fn print_highlighted(&mut self, text: &str) -> Result<()> {
        self.draw(text, highlight_style())
    }

    fn clear_line(&mut self, line: u8) -> Result<()> {
        let top = i32::from(line) * LINE_HEIGHT;
        Rectangle::new(Point::new(0, top), Size::new(PANEL_WIDTH, LINE_HEIGHT as u32))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.display)
            .map_err(|_| Error::Display)
    }

    fn clear(&mut self) -> Result<()> {
        self.display.clear_buffer();
        self.cursor = Point::zero();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.display.flush().map_err(|_| Error::Display)
    }
}
