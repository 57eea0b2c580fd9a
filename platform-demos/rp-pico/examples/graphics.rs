//! Bounces a ball over a 240x128 LCD with a T6963C-class controller
//! This example is for the Raspberry Pico with the rp2040 chip
//!
//! The bus is driven through the SIO registers of the rp2040 with the PortBackend, so a full
//! frame goes out fast enough for a smooth animation.
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
//!
//! Most modules run on 5V. The controller accepts the 3.3V levels of the Pico on its inputs,
//! but check the datasheet of your module (or use level shifters) before connecting it.

#![deny(warnings)]
#![no_std]
#![no_main]

// Imports

use panic_halt as _;                        // well. halt on panic..
use cortex_m_rt::entry;                     // the macro for our startup function
use embedded_hal::digital::v2::OutputPin;   // GPIO output pin trait
use embedded_time::fixed_point::FixedPoint; // .integer() on the clock rate
use rp_pico as bsp;                         // Provide an alias for our BSP so we can switch targets quickly.
use bsp::hal::{
    prelude::*,                             // pull in any important traits
    pac,                                    // Peripheral Access Crate; low-level registers
    sio::Sio,                               // the SIO manages al the pins and their modes
    watchdog::Watchdog,                     // we need to regularly call the watchdog or it shuts down our Pico
};

use embedded_graphics::{
    prelude::*,
    pixelcolor::BinaryColor,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    mono_font::{ascii::FONT_6X9, MonoTextStyle},
    text::Text,
};

// Even for examples it's necessary to import the library
extern crate lcd240128;
use lcd240128::{Config, LCD240128, MmioPort, PinMap, PortBackend, PortRegisters};
use lcd240128::{WIDTH, HEIGHT};

const RADIUS: i32 = 4;

// the wiring from the table above, as bit positions in the SIO registers
const PINS: PinMap = PinMap {
    wr: 14,
    rd: 13,
    ce: 12,
    cd: 11,
    data: [9, 8, 7, 6, 5, 4, 3, 2],
};

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
 //  The bus pins only need to be handed to the SIO. After that the PortBackend
 //  drives them through the registers, so we keep the typed pins just to own them.
 // --------------------------------------------------------------------------

    let _bus = (
        pins.gpio14.into_push_pull_output(),
        pins.gpio13.into_push_pull_output(),
        pins.gpio12.into_push_pull_output(),
        pins.gpio11.into_push_pull_output(),
        pins.gpio9.into_push_pull_output(),
        pins.gpio8.into_push_pull_output(),
        pins.gpio7.into_push_pull_output(),
        pins.gpio6.into_push_pull_output(),
        pins.gpio5.into_push_pull_output(),
        pins.gpio4.into_push_pull_output(),
        pins.gpio3.into_push_pull_output(),
        pins.gpio2.into_push_pull_output(),
    );
    let lcd_rst = pins.gpio10.into_push_pull_output();
    let lcd_fs = pins.gpio1.into_push_pull_output();

    // set led pin to output
    let mut pico_led = pins.led.into_push_pull_output();

    let delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().integer());

    // Safety: the addresses are the SIO registers of the rp2040, and we own all bus pins
    let port = unsafe { MmioPort::new(PortRegisters::RP2040_SIO) };
    let backend = PortBackend::new(port, PINS).unwrap();

 // --------------------------------------------------------------------------
 //  End Boilerplate and Setup, let's initialize the screen
 // --------------------------------------------------------------------------

    let mut lcd = LCD240128::new(backend, lcd_rst, lcd_fs, delay, Config::default()).unwrap();

    // Set onboard LED to on to show we are in business
    pico_led.set_high().unwrap();

    let style = MonoTextStyle::new(&FONT_6X9, BinaryColor::On);
    let frame = Rectangle::new(Point::zero(), Size::new(WIDTH as u32, HEIGHT as u32))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1));

    let (mut x, mut y) = (RADIUS + 1, RADIUS + 1);
    let (mut dx, mut dy) = (2, 2);

    loop {
        lcd.clear(BinaryColor::Off).unwrap();
        frame.draw(&mut lcd).unwrap();
        Text::new("LCD240128", Point::new(8, 12), style).draw(&mut lcd).unwrap();

        Circle::with_center(Point::new(x, y), 2 * RADIUS as u32 + 1)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut lcd)
            .unwrap();

        // copy the canvas to the display memory
        lcd.show().unwrap();

        x += dx;
        y += dy;
        if x + RADIUS >= WIDTH as i32 - 1 || x - RADIUS <= 0 {
            dx = -dx;
        }
        if y + RADIUS >= HEIGHT as i32 - 1 || y - RADIUS <= 0 {
            dy = -dy;
        }
    }
}

// End of file
