//! Register based backend for MCUs where the whole bus sits on one GPIO bank.
//!
//! Toggling eight data pins one by one for each of the 3840 frame bytes is what makes
//! [`GpioBackend`](crate::backend::GpioBackend) slow. Here the bus is driven through three
//! 32-bit registers of the GPIO bank instead: output value, input value and output enable.
//! A [`ByteTable`] maps every data byte to a complete output word (data bits plus the idle
//! levels of every other pin on the bank), so putting a byte on the bus is one register
//! write and the WR strobe a second one.
//!
//! The catch: these are whole-port writes. While [`show`](crate::display::LCD240128::show)
//! runs, nothing else may change output levels or directions of other pins on the same bank,
//! they would be overwritten with the levels captured in the table.

use core::convert::Infallible;
use core::ptr;

use embedded_hal::blocking::delay::DelayUs;

use crate::backend::{Backend, NoDelay, AUTO_WRITE_LINE};
use crate::config::PollLimit;
use crate::error::Error;

/// Raw access to the registers of one GPIO bank, bit `n` being pin `n`.
pub trait GpioPort {
    fn output(&self) -> u32;
    fn set_output(&mut self, value: u32);
    fn input(&self) -> u32;
    fn output_enable(&self) -> u32;
    fn set_output_enable(&mut self, value: u32);
}

/// Addresses of the output value, input value and output enable registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRegisters {
    pub output: usize,
    pub input: usize,
    pub output_enable: usize,
}

impl PortRegisters {
    /// single-cycle IO block of the RP2040 (GPIO_OUT, GPIO_IN, GPIO_OE)
    pub const RP2040_SIO: PortRegisters = PortRegisters {
        output: 0xd000_0010,
        input: 0xd000_0004,
        output_enable: 0xd000_0020,
    };
}

/// [`GpioPort`] on memory mapped registers.
#[derive(Debug)]
pub struct MmioPort {
    regs: PortRegisters,
}

impl MmioPort {
    /// # Safety
    ///
    /// All three addresses must be valid, aligned 32-bit GPIO registers of the running chip,
    /// and the caller must own every pin of the bank that the driver writes.
    pub unsafe fn new(regs: PortRegisters) -> Self {
        MmioPort { regs }
    }
}

impl GpioPort for MmioPort {
    #[inline]
    fn output(&self) -> u32 {
        // SAFETY: address validated by the caller of `MmioPort::new`
        unsafe { ptr::read_volatile(self.regs.output as *const u32) }
    }

    #[inline]
    fn set_output(&mut self, value: u32) {
        // SAFETY: address validated by the caller of `MmioPort::new`
        unsafe { ptr::write_volatile(self.regs.output as *mut u32, value) }
    }

    #[inline]
    fn input(&self) -> u32 {
        // SAFETY: address validated by the caller of `MmioPort::new`
        unsafe { ptr::read_volatile(self.regs.input as *const u32) }
    }

    #[inline]
    fn output_enable(&self) -> u32 {
        // SAFETY: address validated by the caller of `MmioPort::new`
        unsafe { ptr::read_volatile(self.regs.output_enable as *const u32) }
    }

    #[inline]
    fn set_output_enable(&mut self, value: u32) {
        // SAFETY: address validated by the caller of `MmioPort::new`
        unsafe { ptr::write_volatile(self.regs.output_enable as *mut u32, value) }
    }
}

/// Bit positions of the bus lines within the GPIO bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub wr: u8,
    pub rd: u8,
    pub ce: u8,
    pub cd: u8,
    /// DB0..DB7
    pub data: [u8; 8],
}

#[inline]
const fn bit(n: u8) -> u32 {
    1 << n
}

impl PinMap {
    pub fn data_mask(&self) -> u32 {
        self.data.iter().fold(0, |mask, n| mask | bit(*n))
    }

    pub fn control_mask(&self) -> u32 {
        bit(self.wr) | bit(self.rd) | bit(self.ce) | bit(self.cd)
    }

    /// Spreads the bits of `value` over the data lines, bit by bit.
    pub fn encode(&self, value: u8) -> u32 {
        let mut word = 0;
        for (i, n) in self.data.iter().enumerate() {
            word |= (((value >> i) & 1) as u32) << n;
        }
        word
    }

    /// Collects the data lines of a port word back into a byte.
    pub fn decode(&self, word: u32) -> u8 {
        let mut value = 0;
        for (i, n) in self.data.iter().enumerate() {
            if word & bit(*n) != 0 {
                value |= 1 << i;
            }
        }
        value
    }

    /// every position below 32 and no pin used twice
    pub fn is_valid(&self) -> bool {
        let mut seen = 0u32;
        let lines = [self.wr, self.rd, self.ce, self.cd];
        for n in lines.iter().chain(self.data.iter()) {
            if *n > 31 || seen & bit(*n) != 0 {
                return false;
            }
            seen |= bit(*n);
        }
        true
    }

    /// Output word for the transfer loop: CE, WR and C/D low, RD high, data lines cleared,
    /// every other pin as found in `output`.
    fn transfer_idle(&self, output: u32) -> u32 {
        (output & !(self.data_mask() | bit(self.ce) | bit(self.wr) | bit(self.cd))) | bit(self.rd)
    }
}

/// Output words for all 256 byte values.
#[derive(Clone)]
pub struct ByteTable([u32; 256]);

impl ByteTable {
    pub fn build(pins: &PinMap, idle: u32) -> Self {
        let base = idle & !pins.data_mask();
        let mut table = [0u32; 256];
        for (value, word) in table.iter_mut().enumerate() {
            *word = base | pins.encode(value as u8);
        }
        ByteTable(table)
    }

    #[inline]
    pub fn word(&self, value: u8) -> u32 {
        self.0[value as usize]
    }
}

pub struct PortBackend<P, DELAY> {
    port: P,
    pins: PinMap,
    table: ByteTable,
    delay: DELAY,
    // output enable word with every data line an output, captured per frame
    all_out: u32,
    // output word while polling STA3: CE low, C/D, WR and RD high
    poll_state: u32,
}

impl<P> PortBackend<P, NoDelay>
where
    P: GpioPort,
{
    pub fn new(port: P, pins: PinMap) -> Result<Self, Error<Infallible>> {
        Self::new_with_delay(port, pins, NoDelay {})
    }
}

impl<P, DELAY> PortBackend<P, DELAY>
where
    P: GpioPort,
    DELAY: DelayUs<u8>,
{
    /// Parks the bus idle (WR, RD, CE high, C/D and data low, all lines outputs) and builds
    /// the byte table from the resulting register state. The delay is used for the settle
    /// time after STA3 turns into an input.
    pub fn new_with_delay(
        mut port: P,
        pins: PinMap,
        delay: DELAY,
    ) -> Result<Self, Error<Infallible>> {
        if !pins.is_valid() {
            return Err(Error::InvalidPinMap);
        }

        let out = (port.output() & !(pins.data_mask() | bit(pins.cd)))
            | bit(pins.wr)
            | bit(pins.rd)
            | bit(pins.ce);
        port.set_output(out);
        let oe = port.output_enable() | pins.control_mask() | pins.data_mask();
        port.set_output_enable(oe);

        let table = ByteTable::build(&pins, pins.transfer_idle(out));
        Ok(PortBackend {
            port,
            pins,
            table,
            delay,
            all_out: oe,
            poll_state: out,
        })
    }

    pub fn pins(&self) -> &PinMap {
        &self.pins
    }

    /// Switches to another wiring and rebuilds the byte table for it.
    pub fn set_pins(&mut self, pins: PinMap) -> Result<(), Error<Infallible>> {
        if !pins.is_valid() {
            return Err(Error::InvalidPinMap);
        }
        self.pins = pins;
        self.rebuild_table();
        Ok(())
    }

    /// Captures the current levels of the other pins on the bank into the byte table.
    pub fn rebuild_table(&mut self) {
        let idle = self.pins.transfer_idle(self.port.output());
        self.table = ByteTable::build(&self.pins, idle);
    }

    pub fn table(&self) -> &ByteTable {
        &self.table
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn release(self) -> P {
        self.port
    }

    #[inline]
    fn set_line(&mut self, n: u8, high: bool) {
        let out = self.port.output();
        if high {
            self.port.set_output(out | bit(n));
        } else {
            self.port.set_output(out & !bit(n));
        }
    }
}

impl<P, DELAY> Backend for PortBackend<P, DELAY>
where
    P: GpioPort,
    DELAY: DelayUs<u8>,
{
    type Error = Infallible;

    fn write_byte(&mut self, value: u8, command: bool) -> Result<(), Error<Infallible>> {
        let pins = self.pins;
        self.set_line(pins.cd, command);
        self.set_line(pins.ce, false);
        let out = self.port.output() & !pins.data_mask();
        self.port.set_output(out | pins.encode(value));
        self.set_line(pins.wr, false);
        self.set_line(pins.wr, true);
        self.set_line(pins.ce, true);
        Ok(())
    }

    fn read_byte(&mut self, status: bool) -> Result<u8, Error<Infallible>> {
        let pins = self.pins;
        let oe = self.port.output_enable();
        self.port.set_output_enable(oe & !pins.data_mask());
        self.set_line(pins.cd, status);
        self.set_line(pins.ce, false);
        self.set_line(pins.rd, false);
        let value = pins.decode(self.port.input());
        self.set_line(pins.rd, true);
        self.set_line(pins.ce, true);
        self.port.set_output_enable(oe);
        Ok(value)
    }

    fn wait_ready(&mut self, limit: PollLimit) -> Result<(), Error<Infallible>> {
        let pins = self.pins;
        let status_lines = bit(pins.data[0]) | bit(pins.data[1]);
        let oe = self.port.output_enable();
        self.port.set_output_enable(oe & !status_lines);
        self.set_line(pins.cd, true);
        self.set_line(pins.wr, true);

        let polled: Result<(), Error<Infallible>> = limit.poll(|| {
            self.set_line(pins.ce, false);
            self.set_line(pins.rd, false);
            let ready = self.port.input() & status_lines == status_lines;
            self.set_line(pins.rd, true);
            self.set_line(pins.ce, true);
            Ok(ready)
        });

        self.port.set_output_enable(oe);
        polled
    }

    fn begin_auto_write(&mut self) -> Result<(), Error<Infallible>> {
        let idle = self.pins.transfer_idle(self.port.output());
        if idle != self.table.word(0) {
            log::trace!("port levels changed since the byte table was built, rebuilding");
            self.table = ByteTable::build(&self.pins, idle);
        }
        self.all_out = self.port.output_enable() | self.pins.data_mask();
        self.poll_state = self.table.word(0) | bit(self.pins.cd) | bit(self.pins.wr);
        Ok(())
    }

    #[inline]
    fn auto_write(&mut self, value: u8, limit: PollLimit) -> Result<(), Error<Infallible>> {
        let sta3 = bit(self.pins.data[AUTO_WRITE_LINE]);
        let rd = bit(self.pins.rd);
        let wr = bit(self.pins.wr);
        let poll_state = self.poll_state;

        self.port.set_output_enable(self.all_out & !sta3);
        self.delay.delay_us(1);
        self.port.set_output(poll_state);

        let port = &mut self.port;
        let polled: Result<(), Error<Infallible>> = limit.poll(|| {
            port.set_output(poll_state & !rd);
            let ready = port.input() & sta3 != 0;
            port.set_output(poll_state);
            Ok(ready)
        });

        self.port.set_output_enable(self.all_out);
        polled?;

        let word = self.table.word(value);
        self.port.set_output(word);
        self.port.set_output(word | wr);
        Ok(())
    }

    fn end_auto_write(&mut self) -> Result<(), Error<Infallible>> {
        let ce = self.pins.ce;
        self.set_line(ce, true);
        Ok(())
    }
}
