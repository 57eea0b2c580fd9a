//! # Instruction set of the T6963C-class controller
//!
//! All instructions are variants of [`Command`]. The source is written to resemble the data
//! sheet as close as possible, so the opcodes are spelled out in binary.
//!
//! Unlike SPI-style controllers, the operands of an instruction are sent *before* the
//! opcode: first up to two data bytes (C/D low), then the opcode itself (C/D high). The
//! controller only acts once the opcode arrives. Every one of those bytes has to wait for
//! the status bits STA0 and STA1, see
//! [`LCD240128::send_command`](crate::display::LCD240128::send_command).
//!
//! ## Memory layout
//! The controller has one flat display RAM. The text plane and the graphics plane each get
//! a home address and an area width (in bytes per row). This driver puts both at address 0
//! with 30 bytes per row, which matches the 240 pixel wide glass: one byte is 8 pixels in
//! graphics mode, or one character cell in text mode.
//!
//! ## Auto write
//! Writing a whole frame with `WriteAndIncrement` would need three handshakes per byte.
//! `AutoWrite` opens a window in which every data byte lands at the address pointer, which
//! then advances by itself. The controller signals readiness for the next byte on STA3
//! instead of STA0/STA1. `AutoReset` closes the window.
//!
//! ## Panel specific instructions
//! Some modules built around this controller add instructions for the blink rate, cursor
//! auto moving, font selection and reverse video (0x50, 0x60, 0x70 and 0xD0). They take a
//! single operand followed by a zero byte.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
/// How text and graphics planes are combined on the glass.
pub enum CombineMode {
    Or = 0b000,
    Xor = 0b001,
    And = 0b011,
    /// the graphics area holds attribute bytes for the text plane
    TextAttribute = 0b100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// move the hardware text cursor, in character cells
    // translates to: 0x21 with operands x, y
    SetCursorPointer { x: u8, y: u8 },

    /// upper address bits of the character generator RAM
    // translates to: 0x22 with operands offset, 0
    SetOffsetRegister(u8),

    /// set the address of the next data read or write
    // translates to: 0x24 with operands low, high
    SetAddressPointer(u16),

    // translates to: 0x40 with operands low, high
    SetTextHomeAddress(u16),

    /// number of character cells per text row
    // translates to: 0x41 with operands columns, 0
    SetTextArea(u8),

    // translates to: 0x42 with operands low, high
    SetGraphicHomeAddress(u16),

    /// number of bytes per graphics row
    // translates to: 0x43 with operands columns, 0
    SetGraphicArea(u8),

    /// blink rate of the cursor in 0..8, panel specific
    // translates to: 0x50 with operands rate, 0
    SetBlinkTime(u8),

    /// advance the cursor together with the address pointer, panel specific
    // translates to: 0x60 with operands on, 0
    SetCursorAutoMoving(bool),

    /// select the character generator font, panel specific
    // translates to: 0x70 with operands font, 0
    SelectFont(u8),

    /// combine mode of text and graphics, and whether the character generator lives in
    /// external RAM
    // translates to: 0x80 OR with CombineMode, 0x08 for external CG
    ModeSet { mode: CombineMode, external_cg: bool },

    /// switch the planes and the cursor on or off
    // translates to: 0x90 OR with graphics 0x08, text 0x04, cursor 0x02, blink 0x01
    DisplayMode {
        graphics: bool,
        text: bool,
        cursor: bool,
        blink: bool,
    },

    /// height of the cursor in lines, 1..=8
    // translates to: 0xA0 OR with lines - 1
    CursorPattern(u8),

    // translates to: 0xB0
    AutoWrite,

    // translates to: 0xB1
    AutoRead,

    /// end an auto write or auto read window
    // translates to: 0xB2
    AutoReset,

    /// write one byte at the address pointer and increment it
    // translates to: 0xC0 with operand
    WriteAndIncrement(u8),

    // translates to: 0xC1
    ReadAndIncrement,

    // translates to: 0xC2 with operand
    WriteAndDecrement(u8),

    // translates to: 0xC4 with operand
    WriteAndHold(u8),

    /// reverse video for the whole screen, panel specific
    // translates to: 0xD0 with operands on, 0
    SetReverse(bool),

    /// set or clear one bit of the byte at the address pointer
    // translates to: 0xF0 OR with set 0x08 and the bit number
    BitSet { bit: u8, set: bool },
}

use Command::*;

/// Up to two operand bytes, sent in order before the opcode.
pub type Operands = (Option<u8>, Option<u8>);

impl Command {
    /// Returns the opcode byte, sent last with C/D high.
    pub fn opcode(self) -> u8 {
        match self {
            SetCursorPointer { .. } => 0b0010_0001,
            SetOffsetRegister(_) => 0b0010_0010,
            SetAddressPointer(_) => 0b0010_0100,
            SetTextHomeAddress(_) => 0b0100_0000,
            SetTextArea(_) => 0b0100_0001,
            SetGraphicHomeAddress(_) => 0b0100_0010,
            SetGraphicArea(_) => 0b0100_0011,
            SetBlinkTime(_) => 0b0101_0000,
            SetCursorAutoMoving(_) => 0b0110_0000,
            SelectFont(_) => 0b0111_0000,
            ModeSet { mode, external_cg } => {
                0b1000_0000 | ((external_cg as u8) << 3) | mode as u8
            }
            DisplayMode {
                graphics,
                text,
                cursor,
                blink,
            } => {
                0b1001_0000
                    | ((graphics as u8) << 3)
                    | ((text as u8) << 2)
                    | ((cursor as u8) << 1)
                    | blink as u8
            }
            CursorPattern(lines) => {
                assert!((1..=8).contains(&lines));
                0b1010_0000 | (lines - 1)
            }
            AutoWrite => 0b1011_0000,
            AutoRead => 0b1011_0001,
            AutoReset => 0b1011_0010,
            WriteAndIncrement(_) => 0b1100_0000,
            ReadAndIncrement => 0b1100_0001,
            WriteAndDecrement(_) => 0b1100_0010,
            WriteAndHold(_) => 0b1100_0100,
            SetReverse(_) => 0b1101_0000,
            BitSet { bit, set } => {
                assert!(bit < 8);
                0b1111_0000 | ((set as u8) << 3) | bit
            }
        }
    }

    /// Returns the operand bytes, in wire order.
    pub fn operands(self) -> Operands {
        match self {
            SetCursorPointer { x, y } => (Some(x), Some(y)),
            SetOffsetRegister(offset) => (Some(offset), Some(0)),
            SetAddressPointer(addr) | SetTextHomeAddress(addr) | SetGraphicHomeAddress(addr) => {
                let [low, high] = addr.to_le_bytes();
                (Some(low), Some(high))
            }
            SetTextArea(columns) | SetGraphicArea(columns) => (Some(columns), Some(0)),
            SetBlinkTime(rate) => (Some(rate), Some(0)),
            SelectFont(font) => (Some(font), Some(0)),
            SetCursorAutoMoving(on) | SetReverse(on) => (Some(on as u8), Some(0)),
            WriteAndIncrement(value) | WriteAndDecrement(value) | WriteAndHold(value) => {
                (Some(value), None)
            }
            ModeSet { .. }
            | DisplayMode { .. }
            | CursorPattern(_)
            | AutoWrite
            | AutoRead
            | AutoReset
            | ReadAndIncrement
            | BitSet { .. } => (None, None),
        }
    }
}

/// A prelude for convenience, it pulls all enums into scope.
pub mod prelude {
    pub use super::{
        CombineMode,
        CombineMode::*,
        Command,
        Command::*,
    };
}
