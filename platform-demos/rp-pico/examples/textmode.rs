//! Uses the character generator of a 240x128 T6963C-class LCD as a 30x16 text console
//! This example is for the Raspberry Pico with the rp2040 chip
//!
//! Text mode needs no frame transfer, so the portable GpioBackend is fast enough here. The
//! data lines are `DynPin`s, which can change direction at run time.
//!
//! Pin layout and connection for this example
//!
//! display | Pico function  | purpose
//!  WR        GP14            write strobe, active low
//!  RD        GP13            read strobe, active low
//!  CE        GP12            chip enable, active low
//!  C/D       GP11            command/data (1 = command or status, 0 = data)
//!  RST       GP10            reset: active low to reset display
//!  FS        GP1             font select (0 = 8x8, 1 = 6x8)
//!  DB0..DB7  GP9 down to GP2 data bus

#![deny(warnings)]
#![no_std]
#![no_main]

// Imports

use panic_halt as _;                        // well. halt on panic..
use cortex_m_rt::entry;                     // the macro for our startup function
use core::fmt::Write;                       // for writeln!() macro
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_time::fixed_point::FixedPoint; // .integer() on the clock rate
use rp_pico as bsp;                         // Provide an alias for our BSP so we can switch targets quickly.
use bsp::hal::{
    gpio::dynpin::{DynPin, DynPinMode},
    pac,                                    // Peripheral Access Crate; low-level registers
    sio::Sio,                               // Single-clock IO, takes care of all GPIO stuff.
    watchdog::Watchdog,                     // we need to regularly call the watchdog or it shuts down our Pico
};

// Even for examples it's necessary to import the library
extern crate lcd240128;
use lcd240128::{Config, DataPin, Direction, GpioBackend, LCD240128, TextMode};

// A data line of the bus. The rp2040 HAL has no trait for switching direction, so this wraps
// its dynamic pin type.
struct BusPin(DynPin);

impl DataPin for BusPin {
    type Error = core::convert::Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        let mode = match direction {
            Direction::Input => DynPinMode::Input(bsp::hal::gpio::dynpin::DynInput::Floating),
            Direction::Output => DynPinMode::Output(bsp::hal::gpio::dynpin::DynOutput::PushPull),
        };
        // both modes are valid for every bank0 pin
        self.0.try_into_mode(mode).ok();
        Ok(())
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.0.set_high().ok();
        } else {
            self.0.set_low().ok();
        }
        Ok(())
    }

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high().unwrap_or(false))
    }
}

#[entry]
fn main() -> ! {

 // --------------------------------------------------------------------------
 //  First part is "boilerplate" setup stuff for Raspberry Pico
 // --------------------------------------------------------------------------

    let mut pac = pac::Peripherals::take().unwrap();   // grab singleton objects
    let core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);    // set up watchdog timer

    let clocks = bsp::hal::clocks::init_clocks_and_plls(   // configure clocks
        bsp::XOSC_CRYSTAL_FREQ,                            // default is 125mHz system clock
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = Sio::new(pac.SIO);
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

 // --------------------------------------------------------------------------
 //  Now we configure all our pins to do the proper thing.
 // --------------------------------------------------------------------------

    let data = [
        BusPin(pins.gpio9.into_push_pull_output().into()),
        BusPin(pins.gpio8.into_push_pull_output().into()),
        BusPin(pins.gpio7.into_push_pull_output().into()),
        BusPin(pins.gpio6.into_push_pull_output().into()),
        BusPin(pins.gpio5.into_push_pull_output().into()),
        BusPin(pins.gpio4.into_push_pull_output().into()),
        BusPin(pins.gpio3.into_push_pull_output().into()),
        BusPin(pins.gpio2.into_push_pull_output().into()),
    ];
    let backend = GpioBackend::new(
        pins.gpio14.into_push_pull_output(),
        pins.gpio13.into_push_pull_output(),
        pins.gpio12.into_push_pull_output(),
        pins.gpio11.into_push_pull_output(),
        data,
    )
    .unwrap();

    let lcd_rst = pins.gpio10.into_push_pull_output();
    let lcd_fs = pins.gpio1.into_push_pull_output();
    let mut pico_led = pins.led.into_push_pull_output();

    let sys_hz = clocks.system_clock.freq().integer();
    let delay = cortex_m::delay::Delay::new(core.SYST, sys_hz);

 // --------------------------------------------------------------------------
 //  End Boilerplate and Setup, let's initialize the screen
 // --------------------------------------------------------------------------

    let mut lcd = LCD240128::new(backend, lcd_rst, lcd_fs, delay, Config::default()).unwrap();
    lcd.init_text_mode().unwrap();

    pico_led.set_high().unwrap();

    let mut count: u32 = 0;
    loop {
        lcd.set_text_position(0, 0).unwrap();
        writeln!(lcd, "LCD240128 text console").unwrap();
        writeln!(lcd, "30 columns, 16 rows").unwrap();
        writeln!(lcd).unwrap();
        write!(lcd, "uptime: {} s   ", count).unwrap();

        count += 1;
        // the SysTick delay belongs to the driver now, so just burn cycles
        cortex_m::asm::delay(sys_hz);
    }
}

// End of file
