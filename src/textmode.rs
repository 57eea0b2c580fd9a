//! # Text mode of the LCD240128
//!
//! Instead of the canvas this uses the character generator of the controller: every byte
//! in the text plane is one character cell. With the 8x8 font that gives 30x16 characters.
//! The driver keeps a text cursor of its own and implements the Write trait, so the
//! writeln!() macro "just works".
//!
//! ```ignore
//! use core::fmt::Write;
//! use lcd240128::textmode::TextMode;
//!
//! lcd.init_text_mode()?;
//! writeln!(lcd, "temperature: {} C", 21)?;
//! ```
//!
//! The character generator ROM starts at the space character, so text is limited to
//! printable ASCII. Anything else shows up as `?`.

use core::fmt::Error as FmtError;
use core::fmt::Result as FmtResult;
use core::fmt::Write;

use hal::blocking::delay::DelayMs;
use hal::digital::v2::OutputPin;

use crate::{
    backend::Backend, display::LCD240128, error::Error, instructions::prelude::*, BUFFER_SIZE,
    COLUMNS, TEXT_ROWS,
};

/// first character of the character generator ROM
const CG_ROM_START: u32 = 0x20;

/// Main trait for the character console
pub trait TextMode<E> {
    /// Sets up the text plane at address 0 with a blinking block cursor, then clears it.
    /// Unlike graphics mode there is no reset first.
    fn init_text_mode(&mut self) -> Result<(), Error<E>>;

    /// Blanks every text cell and moves the text cursor to (0, 0).
    fn clear_text(&mut self) -> Result<(), Error<E>>;

    /// return (column, row) of the text cursor
    fn text_position(&self) -> (u8, u8);

    /// Moves the text cursor; out of range positions are ignored.
    fn set_text_position(&mut self, col: u8, row: u8) -> Result<(), Error<E>>;

    /// Moves the blinking hardware cursor. It is independent of the text cursor unless
    /// cursor auto moving is on.
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Error<E>>;

    /// Writes one character at the text cursor and advances it.
    fn put_char(&mut self, c: char) -> Result<(), Error<E>>;
}

/// character generator code of `c`
fn cg_code(c: char) -> u8 {
    match c as u32 {
        code @ CG_ROM_START..=0x7e => (code - CG_ROM_START) as u8,
        _ => (b'?' as u32 - CG_ROM_START) as u8,
    }
}

impl<B, RST, FS, DELAY> LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    // points the controller at the text cursor
    fn sync_address(&mut self) -> Result<(), Error<B::Error>> {
        let address = self.text_row as u16 * COLUMNS as u16 + self.text_col as u16;
        self.write_command(SetAddressPointer(address))
    }

    fn new_line(&mut self) -> Result<(), Error<B::Error>> {
        self.text_col = 0;
        self.text_row = (self.text_row + 1) % TEXT_ROWS;
        self.sync_address()
    }
}

impl<B, RST, FS, DELAY> TextMode<B::Error> for LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    fn init_text_mode(&mut self) -> Result<(), Error<B::Error>> {
        log::debug!("initializing text mode");
        self.write_command(SetTextHomeAddress(0))?;
        self.write_command(SetTextArea(COLUMNS))?;
        self.write_command(DisplayMode {
            graphics: false,
            text: true,
            cursor: true,
            blink: true,
        })?;
        self.write_command(ModeSet {
            mode: Or,
            external_cg: false,
        })?;
        self.write_command(SetCursorPointer { x: 0, y: 0 })?;
        self.write_command(CursorPattern(8))?;
        self.write_command(SetBlinkTime(2))?;
        self.write_command(SetCursorAutoMoving(true))?;
        self.write_command(SelectFont(3))?;
        self.clear_text()
    }

    fn clear_text(&mut self) -> Result<(), Error<B::Error>> {
        // counts cells of the selected font, so the 6x8 font clears further
        let cells = BUFFER_SIZE / self.font_size().cell_width();
        self.write_command(SetAddressPointer(0))?;
        for _ in 0..cells {
            self.write_command(WriteAndIncrement(0))?;
        }
        self.text_col = 0;
        self.text_row = 0;
        Ok(())
    }

    fn text_position(&self) -> (u8, u8) {
        (self.text_col, self.text_row)
    }

    fn set_text_position(&mut self, col: u8, row: u8) -> Result<(), Error<B::Error>> {
        if col < COLUMNS && row < TEXT_ROWS {
            self.text_col = col;
            self.text_row = row;
            self.sync_address()
        } else {
            // silently ignore out of bounds
            Ok(())
        }
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Error<B::Error>> {
        self.write_command(SetCursorPointer { x: col, y: row })
    }

    fn put_char(&mut self, c: char) -> Result<(), Error<B::Error>> {
        self.write_command(WriteAndIncrement(cg_code(c)))?;
        self.text_col += 1;
        if self.text_col == COLUMNS {
            self.text_col = 0;
            self.text_row = (self.text_row + 1) % TEXT_ROWS;
            // the address pointer runs on into the next row by itself, but not back to the top
            if self.text_row == 0 {
                self.sync_address()?;
            }
        }
        Ok(())
    }
}

impl<B, RST, FS, DELAY> Write for LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    fn write_str(&mut self, s: &str) -> FmtResult {
        for c in s.chars() {
            match c {
                '\r' => {
                    self.text_col = 0;
                    self.sync_address().map_err(|_| FmtError)?;
                }
                '\n' => self.new_line().map_err(|_| FmtError)?,
                _ => self.put_char(c).map_err(|_| FmtError)?,
            }
        }
        Ok(())
    }
}
