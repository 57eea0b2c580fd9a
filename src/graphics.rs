//! Graphics mode of the LCD240128
//!
//! It implements all necessary traits to be able to use the embedded_graphics library on
//! the driver, so all circle/ellipse/text/rectangle/image functions are available. Next to
//! that there are helpers for packed bitmaps, bitmap fonts and monochrome BMP files.
//!
//! Drawing only touches the in-memory [`Canvas`](crate::canvas::Canvas). The typical
//! workflow for (animated) graphics is:
//!  - clear the canvas with `LCD240128.clear()`
//!  - draw "stuff" into the canvas
//!  - `LCD240128.show()` the canvas, it now gets visible
//!  - rinse and repeat
//!
//! `show()` always streams the complete frame (3840 bytes) through the controller's auto
//! write mode. That takes a while with [`GpioBackend`](crate::backend::GpioBackend), which
//! is what [`PortBackend`](crate::port::PortBackend) is for.
//!
//!  The embedded_graphics library is well documented. Please look there for all the juicyness of
//!  graphics functions it provides.
//!  <https://docs.rs/embedded-graphics/latest/embedded_graphics/>

use core::convert::Infallible;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    Pixel,
};
use embedded_io::{Read, Seek};
use hal::blocking::delay::DelayMs;
use hal::digital::v2::OutputPin;

use crate::{
    backend::Backend,
    bmp::{self, BmpHeader},
    config::Rotation,
    display::LCD240128,
    error::Error,
    instructions::prelude::*,
    raster::{self, Bitmap, Font, Palette},
    COLUMNS,
};

impl<B, RST, FS, DELAY> LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    /// Resets the controller and maps the graphics plane to address 0, one byte per 8 pixels
    /// and 30 bytes per row, with the text plane off.
    pub fn init_graphics_mode(&mut self) -> Result<(), Error<B::Error>> {
        log::debug!("initializing graphics mode");
        self.reset()?;
        self.write_command(SetGraphicHomeAddress(0))?;
        self.write_command(SetGraphicArea(COLUMNS))?;
        self.write_command(DisplayMode {
            graphics: true,
            text: false,
            cursor: false,
            blink: false,
        })?;
        self.write_command(ModeSet {
            mode: Or,
            external_cg: false,
        })
    }

    /// Write the canvas to the graphics memory of the controller.
    ///
    /// With `Rotation::Rotate180` the frame is sent last byte first.
    pub fn show(&mut self) -> Result<(), Error<B::Error>> {
        self.write_command(SetAddressPointer(0))?;
        self.write_command(AutoWrite)?;

        let LCD240128 {
            backend,
            canvas,
            config,
            ..
        } = self;
        log::trace!("sending frame, rotation {:?}", config.rotation);

        let limit = config.ready_poll_limit;
        let frame = canvas.as_bytes();
        backend.begin_auto_write()?;
        let sent = match config.rotation {
            Rotation::Normal => frame
                .iter()
                .try_for_each(|byte| backend.auto_write(*byte, limit)),
            Rotation::Rotate180 => frame
                .iter()
                .rev()
                .try_for_each(|byte| backend.auto_write(*byte, limit)),
        };
        backend.end_auto_write()?;
        sent?;

        self.write_command(AutoReset)
    }

    /// Set the font for [`draw_text`](Self::draw_text).
    pub fn set_font(&mut self, font: &'static dyn Font) {
        self.font = Some(font);
    }

    /// With wrapping on, text that reaches the right edge continues one line further down.
    pub fn set_text_wrap(&mut self, on: bool) {
        self.text_wrap = on;
    }

    /// Draws `text` with the font set by `set_font()` and returns the position after the last
    /// glyph. `BinaryColor::Off` draws inverse text.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        color: BinaryColor,
    ) -> Result<Point, Error<B::Error>> {
        raster::draw_text(
            &mut self.canvas,
            self.font,
            text,
            Point::new(x, y),
            color,
            self.text_wrap,
        )
    }

    /// Draws the set bits of `bitmap` at `(x, y)`, everything else stays as it is.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32, color: BinaryColor) {
        raster::draw_bitmap(&mut self.canvas, bitmap, Point::new(x, y), color);
    }

    /// Copies `bitmap` to `(x, y)`, overwriting the background too.
    pub fn blit(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32, palette: Palette) {
        raster::blit(&mut self.canvas, bitmap, Point::new(x, y), palette);
    }

    /// Loads a monochrome BMP into the canvas at `(x, y)`, see [`bmp::load`].
    pub fn load_bmp<R>(
        &mut self,
        reader: &mut R,
        x: i32,
        y: i32,
        color: BinaryColor,
    ) -> Result<BmpHeader, Error<B::Error>>
    where
        R: Read + Seek,
    {
        bmp::load(&mut self.canvas, reader, Point::new(x, y), color)
    }
}

// By implementing these few functions, we get the complete power of the embedded_graphics
// library for free.
impl<B, RST, FS, DELAY> DrawTarget for LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.canvas.draw_iter(pixels)
    }

    fn clear(&mut self, color: BinaryColor) -> Result<(), Self::Error> {
        self.canvas.clear(color)
    }
}

impl<B, RST, FS, DELAY> OriginDimensions for LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    fn size(&self) -> Size {
        self.canvas.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PollLimit};
    use crate::testing::{
        gpio_display, mono_bmp, port_display, wire, BlockFont, Controller, Cursor, Transfer,
    };
    use crate::BUFFER_SIZE;
    use embedded_graphics_core::{primitives::Rectangle, Drawable};

    static BLOCKS: BlockFont = BlockFont {
        width: 8,
        height: 8,
    };

    fn pattern(bytes: &mut [u8]) {
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (i * 7 % 251) as u8;
        }
    }

    #[test]
    fn init_sends_the_graphics_setup() {
        let ctl = Controller::shared();
        let _lcd = gpio_display(&ctl, Config::default());
        assert_eq!(
            ctl.borrow().log,
            vec![
                Transfer::Data(0x00),
                Transfer::Data(0x00),
                Transfer::Command(0x42),
                Transfer::Data(30),
                Transfer::Data(0x00),
                Transfer::Command(0x43),
                Transfer::Command(0x98),
                Transfer::Command(0x80),
            ]
        );
    }

    #[test]
    fn show_streams_the_canvas() {
        let ctl = Controller::shared();
        let mut lcd = gpio_display(&ctl, Config::default());
        pattern(lcd.canvas_mut().as_bytes_mut());
        ctl.borrow_mut().log.clear();

        lcd.show().unwrap();

        let ctl = ctl.borrow();
        let mut expected = wire(SetAddressPointer(0));
        expected.push(Transfer::Command(0xb0));
        assert_eq!(&ctl.log[..expected.len()], &expected[..]);
        assert_eq!(ctl.frame(), lcd.canvas().as_bytes());
        assert_eq!(ctl.log.last(), Some(&Transfer::Command(0xb2)));
        assert_eq!(ctl.log.len(), expected.len() + BUFFER_SIZE + 1);
        assert!(ctl.ce, "CE released after the frame");
    }

    #[test]
    fn show_twice_sends_the_same_bytes() {
        let ctl = Controller::shared();
        let mut lcd = port_display(&ctl, Config::default());
        lcd.fill_solid(
            &Rectangle::new(Point::new(10, 10), Size::new(100, 50)),
            BinaryColor::On,
        )
        .unwrap();
        ctl.borrow_mut().log.clear();

        lcd.show().unwrap();
        let first = core::mem::take(&mut ctl.borrow_mut().log);
        lcd.show().unwrap();
        assert_eq!(ctl.borrow().log, first);
    }

    #[test]
    fn rotated_frame_is_sent_backwards() {
        let normal = Controller::shared();
        let rotated = Controller::shared();
        let mut a = gpio_display(&normal, Config::default());
        let mut b = gpio_display(
            &rotated,
            Config::default().with_rotation(Rotation::Rotate180),
        );
        pattern(a.canvas_mut().as_bytes_mut());
        pattern(b.canvas_mut().as_bytes_mut());
        a.show().unwrap();
        b.show().unwrap();

        let mut reversed = normal.borrow().frame();
        reversed.reverse();
        assert_eq!(rotated.borrow().frame(), reversed);
    }

    #[test]
    fn rotated_pixel_lands_in_the_last_byte() {
        let ctl = Controller::shared();
        let mut lcd = port_display(&ctl, Config::default().with_rotation(Rotation::Rotate180));
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut lcd).unwrap();
        lcd.show().unwrap();
        let frame = ctl.borrow().frame();
        // top left of the picture is the bottom right of the glass
        assert_eq!(frame[BUFFER_SIZE - 1], 0x01);
        assert!(frame[..BUFFER_SIZE - 1].iter().all(|b| *b == 0));
    }

    #[test]
    fn both_backends_look_the_same_to_the_controller() {
        let slow = Controller::shared();
        let fast = Controller::shared();
        let mut a = gpio_display(&slow, Config::default());
        let mut b = port_display(&fast, Config::default());
        for lcd_canvas in [a.canvas_mut(), b.canvas_mut()] {
            pattern(lcd_canvas.as_bytes_mut());
        }
        slow.borrow_mut().busy_polls = 3;
        fast.borrow_mut().busy_polls = 3;

        a.show().unwrap();
        a.set_inversion(false).unwrap();
        b.show().unwrap();
        b.set_inversion(false).unwrap();

        assert_eq!(slow.borrow().log, fast.borrow().log);
        assert_eq!(slow.borrow().status_reads, fast.borrow().status_reads);
        assert_eq!(fast.borrow().outputs, 0xff);
    }

    #[test]
    fn stuck_auto_write_is_reported() {
        let ctl = Controller::shared();
        let config = Config::default().with_ready_poll_limit(PollLimit::Attempts(50));
        let mut lcd = port_display(&ctl, config);
        ctl.borrow_mut().log.clear();
        ctl.borrow_mut().auto_write_stuck = true;
        assert_eq!(lcd.show(), Err(Error::DeviceNotResponding));

        let ctl = ctl.borrow();
        let mut expected = wire(SetAddressPointer(0));
        expected.push(Transfer::Command(0xb0));
        assert_eq!(ctl.log, expected, "no frame byte and no AutoReset");
        assert!(ctl.ce, "CE released after a failed frame");
        assert_eq!(ctl.outputs, 0xff);
    }

    #[test]
    fn text_needs_a_font() {
        let ctl = Controller::shared();
        let mut lcd = gpio_display(&ctl, Config::default());
        assert_eq!(
            lcd.draw_text("no font", 0, 0, BinaryColor::On),
            Err(Error::MissingFont)
        );

        lcd.set_font(&BLOCKS);
        lcd.set_text_wrap(true);
        let end = lcd.draw_text("abcd", 224, 0, BinaryColor::On).unwrap();
        assert_eq!(end, Point::new(240, 8));
        assert_eq!(lcd.canvas().as_bytes()[28], 0xff);
        assert_eq!(lcd.canvas().as_bytes()[29], 0xff);
        assert_eq!(lcd.canvas().as_bytes()[8 * 30 + 28], 0xff);
    }

    #[test]
    fn bitmaps_and_images_end_up_in_the_frame() {
        let ctl = Controller::shared();
        let mut lcd = gpio_display(&ctl, Config::default());
        let icon = [0xf0, 0x0f];
        lcd.draw_bitmap(&Bitmap::new(&icon, 2, 8), 8, 0, BinaryColor::On);
        lcd.blit(&Bitmap::new(&icon, 2, 8), 16, 0, Palette::default().inverted());

        let rows: [&[u8]; 1] = [&[0x3c]];
        let file = mono_bmp(8, 1, 1, &rows);
        let header = lcd
            .load_bmp(&mut Cursor::new(&file), 24, 1, BinaryColor::Off)
            .unwrap();
        assert_eq!(header.width, 8);

        lcd.show().unwrap();
        let frame = ctl.borrow().frame();
        assert_eq!(&frame[..4], &[0x00, 0xf0, 0x0f, 0x00]);
        assert_eq!(&frame[30..34], &[0x00, 0x0f, 0xf0, 0x3c]);
    }

    #[test]
    fn driver_reports_panel_size() {
        let ctl = Controller::shared();
        let lcd = gpio_display(&ctl, Config::default());
        assert_eq!(lcd.size(), Size::new(240, 128));
    }
}
