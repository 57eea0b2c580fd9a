//! Simulated controller and bus plumbing for the unit tests.
//!
//! The controller only looks at line levels: a rising WR edge with CE low latches the data
//! lines, a falling RD edge with CE and C/D asserted is one status poll. Both the pin based
//! and the register based backend are wired to it, so they are judged by the same observer.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::v2::OutputPin;
use embedded_io::{ErrorType, Read, Seek, SeekFrom};

use crate::backend::{DataPin, Direction, GpioBackend, NoDelay};
use crate::config::Config;
use crate::display::LCD240128;
use crate::instructions::Command;
use crate::dummypins::DummyOutputPin;
use crate::port::{GpioPort, PinMap, PortBackend};
use crate::raster::{Bitmap, Font};

/// STA0, STA1 and STA3 set
pub const STATUS_IDLE: u8 = 0b0000_1011;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Command(u8),
    Data(u8),
}

/// bytes a command puts on the bus: operands first, then the opcode
pub fn wire(command: Command) -> Vec<Transfer> {
    let (data1, data2) = command.operands();
    data1
        .into_iter()
        .chain(data2)
        .map(Transfer::Data)
        .chain(Some(Transfer::Command(command.opcode())))
        .collect()
}

pub type Shared = Rc<RefCell<Controller>>;

#[derive(Debug)]
pub struct Controller {
    pub wr: bool,
    pub rd: bool,
    pub ce: bool,
    pub cd: bool,
    /// levels the host puts on DB0..DB7
    pub data: u8,
    /// data lines currently driven by the host
    pub outputs: u8,
    pub log: Vec<Transfer>,
    /// number of upcoming status polls answered with "busy"
    pub busy_polls: u32,
    pub never_ready: bool,
    /// STA3 never comes up, the other status bits behave
    pub auto_write_stuck: bool,
    pub status_reads: u32,
    /// value returned by data reads
    pub read_value: u8,
    busy: bool,
}

impl Controller {
    pub fn shared() -> Shared {
        Rc::new(RefCell::new(Controller {
            wr: true,
            rd: true,
            ce: true,
            cd: false,
            data: 0,
            outputs: 0xff,
            log: Vec::new(),
            busy_polls: 0,
            never_ready: false,
            auto_write_stuck: false,
            status_reads: 0,
            read_value: 0,
            busy: false,
        }))
    }

    pub fn set_wr(&mut self, high: bool) {
        if high && !self.wr && !self.ce {
            let value = self.data & self.outputs;
            self.log.push(if self.cd {
                Transfer::Command(value)
            } else {
                Transfer::Data(value)
            });
        }
        self.wr = high;
    }

    pub fn set_rd(&mut self, high: bool) {
        if !high && self.rd && !self.ce && self.cd {
            self.status_reads += 1;
            self.busy = if self.never_ready {
                true
            } else if self.busy_polls > 0 {
                self.busy_polls -= 1;
                true
            } else {
                false
            };
        }
        self.rd = high;
    }

    pub fn set_data_level(&mut self, bit: usize, high: bool) {
        if high {
            self.data |= 1 << bit;
        } else {
            self.data &= !(1 << bit);
        }
    }

    pub fn set_output(&mut self, bit: usize, output: bool) {
        if output {
            self.outputs |= 1 << bit;
        } else {
            self.outputs &= !(1 << bit);
        }
    }

    fn driven(&self) -> u8 {
        if self.ce || self.rd {
            0
        } else if self.cd {
            if self.busy {
                0
            } else if self.auto_write_stuck {
                STATUS_IDLE & !0b1000
            } else {
                STATUS_IDLE
            }
        } else {
            self.read_value
        }
    }

    /// level seen by the host on data line `bit`
    pub fn line(&self, bit: usize) -> bool {
        let mask = 1 << bit;
        let levels = if self.outputs & mask != 0 {
            self.data
        } else {
            self.driven()
        };
        levels & mask != 0
    }

    /// data bytes of the last auto write window
    pub fn frame(&self) -> Vec<u8> {
        let start = self
            .log
            .iter()
            .rposition(|t| *t == Transfer::Command(0xb0))
            .expect("no auto write window");
        self.log[start + 1..]
            .iter()
            .take_while(|t| **t != Transfer::Command(0xb2))
            .map(|t| match t {
                Transfer::Data(value) => *value,
                Transfer::Command(op) => panic!("command {:#x} inside auto write", op),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Line {
    Wr,
    Rd,
    Ce,
    Cd,
    Data(usize),
}

pub struct SimPin {
    ctl: Shared,
    line: Line,
}

impl SimPin {
    fn drive(&mut self, high: bool) {
        let mut ctl = self.ctl.borrow_mut();
        match self.line {
            Line::Wr => ctl.set_wr(high),
            Line::Rd => ctl.set_rd(high),
            Line::Ce => ctl.ce = high,
            Line::Cd => ctl.cd = high,
            Line::Data(bit) => ctl.set_data_level(bit, high),
        }
    }
}

impl OutputPin for SimPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

impl DataPin for SimPin {
    type Error = Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Infallible> {
        if let Line::Data(bit) = self.line {
            self.ctl
                .borrow_mut()
                .set_output(bit, direction == Direction::Output);
        }
        Ok(())
    }

    fn set_level(&mut self, high: bool) -> Result<(), Infallible> {
        self.drive(high);
        Ok(())
    }

    fn is_high(&self) -> Result<bool, Infallible> {
        match self.line {
            Line::Data(bit) => Ok(self.ctl.borrow().line(bit)),
            _ => Ok(false),
        }
    }
}

pub type SimGpioBackend = GpioBackend<SimPin, SimPin, SimPin, SimPin, SimPin, NoDelay>;

pub fn gpio_backend(ctl: &Shared) -> SimGpioBackend {
    let pin = |line| SimPin {
        ctl: ctl.clone(),
        line,
    };
    let data = [0, 1, 2, 3, 4, 5, 6, 7].map(|bit| pin(Line::Data(bit)));
    GpioBackend::new(
        pin(Line::Wr),
        pin(Line::Rd),
        pin(Line::Ce),
        pin(Line::Cd),
        data,
    )
    .unwrap()
}

/// wiring of the reference board: WR 14, RD 13, CE 12, C/D 11, DB0..DB7 on 9 down to 2
pub const TEST_PINS: PinMap = PinMap {
    wr: 14,
    rd: 13,
    ce: 12,
    cd: 11,
    data: [9, 8, 7, 6, 5, 4, 3, 2],
};

/// an unrelated output on the same port, e.g. a status LED
pub const LED_BIT: u32 = 1 << 25;

/// GPIO bank whose register writes are decoded into line levels for the controller.
pub struct SimPort {
    ctl: Shared,
    pins: PinMap,
    out: u32,
    oe: u32,
}

impl SimPort {
    pub fn new(ctl: &Shared, pins: PinMap) -> Self {
        let bit = |n: u8| 1u32 << n;
        let mut oe = LED_BIT | bit(pins.wr) | bit(pins.rd) | bit(pins.ce) | bit(pins.cd);
        for n in pins.data {
            oe |= bit(n);
        }
        SimPort {
            ctl: ctl.clone(),
            pins,
            out: LED_BIT | bit(pins.wr) | bit(pins.rd) | bit(pins.ce),
            oe,
        }
    }

    fn sync(&self) {
        let level = |n: u8| self.out & (1 << n) != 0;
        let mut ctl = self.ctl.borrow_mut();
        for (bit, n) in self.pins.data.iter().enumerate() {
            ctl.set_data_level(bit, level(*n));
        }
        ctl.cd = level(self.pins.cd);
        let ce = level(self.pins.ce);
        if !ce {
            ctl.ce = false;
        }
        ctl.set_rd(level(self.pins.rd));
        ctl.set_wr(level(self.pins.wr));
        if ce {
            ctl.ce = true;
        }
    }
}

impl GpioPort for SimPort {
    fn output(&self) -> u32 {
        self.out
    }

    fn set_output(&mut self, value: u32) {
        self.out = value;
        self.sync();
    }

    fn input(&self) -> u32 {
        let ctl = self.ctl.borrow();
        let mut value = self.out & !self.pins.data_mask();
        for (bit, n) in self.pins.data.iter().enumerate() {
            if ctl.line(bit) {
                value |= 1 << n;
            }
        }
        value
    }

    fn output_enable(&self) -> u32 {
        self.oe
    }

    fn set_output_enable(&mut self, value: u32) {
        self.oe = value;
        let mut ctl = self.ctl.borrow_mut();
        for (bit, n) in self.pins.data.iter().enumerate() {
            ctl.set_output(bit, value & (1 << n) != 0);
        }
    }
}

pub type SimPortBackend = PortBackend<SimPort, NoDelay>;

pub fn port_backend(ctl: &Shared) -> SimPortBackend {
    PortBackend::new(SimPort::new(ctl, TEST_PINS), TEST_PINS).unwrap()
}

pub type GpioDisplay = LCD240128<SimGpioBackend, DummyOutputPin, DummyOutputPin, NoDelay>;
pub type PortDisplay = LCD240128<SimPortBackend, DummyOutputPin, DummyOutputPin, NoDelay>;

pub fn gpio_display(ctl: &Shared, config: Config) -> GpioDisplay {
    LCD240128::new(
        gpio_backend(ctl),
        DummyOutputPin,
        DummyOutputPin,
        NoDelay {},
        config,
    )
    .unwrap()
}

pub fn port_display(ctl: &Shared, config: Config) -> PortDisplay {
    LCD240128::new(
        port_backend(ctl),
        DummyOutputPin,
        DummyOutputPin,
        NoDelay {},
        config,
    )
    .unwrap()
}

/// In-memory image file.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }
}

impl ErrorType for Cursor<'_> {
    type Error = Infallible;
}

impl Read for Cursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for Cursor<'_> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Infallible> {
        self.pos = match pos {
            SeekFrom::Start(offset) => offset as usize,
            SeekFrom::End(offset) => (self.data.len() as i64 + offset) as usize,
            SeekFrom::Current(offset) => (self.pos as i64 + offset) as usize,
        };
        Ok(self.pos as u64)
    }
}

/// Builds a 1 bit BMP; `rows` are in file order and get padded to the 4 byte stride.
pub fn mono_bmp(width: u32, height: i32, depth: u16, rows: &[&[u8]]) -> Vec<u8> {
    let stride = ((width as usize + 31) / 32) * 4;
    let offset: u32 = 14 + 40 + 8;
    let image_size = (stride * rows.len()) as u32;

    let mut file = Vec::new();
    file.extend_from_slice(b"BM");
    file.extend_from_slice(&(offset + image_size).to_le_bytes());
    file.extend_from_slice(&[0; 4]);
    file.extend_from_slice(&offset.to_le_bytes());
    file.extend_from_slice(&40u32.to_le_bytes());
    file.extend_from_slice(&width.to_le_bytes());
    file.extend_from_slice(&height.to_le_bytes());
    file.extend_from_slice(&1u16.to_le_bytes());
    file.extend_from_slice(&depth.to_le_bytes());
    file.extend_from_slice(&0u32.to_le_bytes());
    file.extend_from_slice(&image_size.to_le_bytes());
    file.extend_from_slice(&2835u32.to_le_bytes());
    file.extend_from_slice(&2835u32.to_le_bytes());
    file.extend_from_slice(&2u32.to_le_bytes());
    file.extend_from_slice(&0u32.to_le_bytes());
    // palette: black, white
    file.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0x00]);
    for row in rows {
        let mut padded = row.to_vec();
        padded.resize(stride, 0);
        file.extend_from_slice(&padded);
    }
    file
}

static SOLID: [u8; 64] = [0xff; 64];

/// Font whose glyphs are all solid blocks of the same size.
pub struct BlockFont {
    pub width: u32,
    pub height: u32,
}

impl Font for BlockFont {
    fn glyph(&self, _c: char) -> Bitmap<'_> {
        Bitmap::new(&SOLID, self.height, self.width)
    }
}
