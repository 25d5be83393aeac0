//! [`DisplaySink`] for any `embedded-graphics` RGB565 target.
//!
//! The 128×64 layout is drawn at an integer scale from an origin, so the same
//! screens fit the badge's 320×170 ST7789 (scale 2, centred) and small test
//! targets alike. With the `board` feature this module also brings up the
//! ST7789 over SPI with DMA.

use embedded_graphics::{
    mono_font::{
        MonoFont,
        MonoTextStyle,
        ascii::{
            FONT_6X10,
            FONT_10X20,
        },
    },
    prelude::*,
    pixelcolor::Rgb565,
    primitives::{
        Circle,
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Baseline,
        Text,
    },
};

use crate::{
    grid::{
        CellKind,
        Grid,
    },
    render::{
        DisplaySink,
        HEIGHT,
        Icon,
        WIDTH,
    },
};

const FOREGROUND: Rgb565 = Rgb565::WHITE;
const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Top of the grid area, under the status line.
const GRID_TOP: i32 = 12;
/// The status line separator.
const RULE_Y: i32 = 9;

pub struct GraphicsDisplay<D> {
    target: D,
    scale: i32,
    origin: Point,
}

impl<D> GraphicsDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Draws 1:1 from the target's top-left corner.
    pub const fn new(target: D) -> Self {
        Self {
            target,
            scale: 1,
            origin: Point::zero(),
        }
    }

    /// Largest integer scale that fits `target`, centred.
    pub fn fit(target: D) -> Self {
        let area = target.bounding_box();
        let width = area.size.width as i32;
        let height = area.size.height as i32;
        let scale = (width / WIDTH).min(height / HEIGHT).max(1);
        let origin = area.top_left
            + Point::new(
                ((width - WIDTH * scale) / 2).max(0),
                ((height - HEIGHT * scale) / 2).max(0),
            );
        Self {
            target,
            scale,
            origin,
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: u8) -> Self {
        self.scale = i32::from(scale.max(1));
        self
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub const fn scale(&self) -> i32 {
        self.scale
    }

    pub const fn origin(&self) -> Point {
        self.origin
    }

    pub const fn target(&self) -> &D {
        &self.target
    }

    pub fn release(self) -> D {
        self.target
    }

    fn font(&self) -> &'static MonoFont<'static> {
        if self.scale == 1 {
            &FONT_6X10
        } else {
            &FONT_10X20
        }
    }

    fn map(&self, x: i32, y: i32) -> Point {
        self.origin + Point::new(x * self.scale, y * self.scale)
    }

    // Primitives in logical pixels.

    fn fill(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<(), D::Error> {
        let scale = self.scale as u32;
        Rectangle::new(self.map(x, y), Size::new(w * scale, h * scale))
            .into_styled(PrimitiveStyle::with_fill(FOREGROUND))
            .draw(&mut self.target)
    }

    fn hline(&mut self, x: i32, y: i32, w: u32) -> Result<(), D::Error> {
        self.fill(x, y, w, 1)
    }

    fn pixel(&mut self, x: i32, y: i32) -> Result<(), D::Error> {
        self.fill(x, y, 1, 1)
    }

    fn outline(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<(), D::Error> {
        let right = x + w as i32 - 1;
        let bottom = y + h as i32 - 1;
        self.hline(x, y, w)?;
        self.hline(x, bottom, w)?;
        self.fill(x, y, 1, h)?;
        self.fill(right, y, 1, h)
    }

    fn chest(&mut self, x: i32, y: i32, open: bool) -> Result<(), D::Error> {
        self.outline(x, y + 4, 16, 8)?;
        self.hline(x + 4, y + 8, 8)?;
        self.fill(x + 6, y + 6, 4, 3)?;
        if open {
            self.hline(x + 2, y, 12)?;
            self.hline(x + 1, y + 1, 14)?;
            self.outline(x, y + 2, 16, 3)?;
            for i in 0..3 {
                self.pixel(x + 8, y - 2 - i)?;
            }
            self.pixel(x + 6, y - 1)?;
            self.pixel(x + 10, y - 1)
        } else {
            self.outline(x, y, 16, 5)?;
            self.hline(x + 4, y + 2, 8)
        }
    }

    /// Lid lifted a little, one spark escaping.
    fn chest_ajar(&mut self, x: i32, y: i32) -> Result<(), D::Error> {
        self.outline(x, y + 4, 16, 8)?;
        self.hline(x + 4, y + 8, 8)?;
        self.fill(x + 6, y + 6, 4, 3)?;
        self.hline(x + 2, y + 1, 12)?;
        self.outline(x, y + 2, 16, 3)?;
        self.pixel(x + 8, y - 1)
    }

    fn bomb(&mut self, x: i32, y: i32) -> Result<(), D::Error> {
        Circle::new(self.map(x + 2, y + 6), 9 * self.scale as u32)
            .into_styled(PrimitiveStyle::with_fill(FOREGROUND))
            .draw(&mut self.target)?;
        self.fill(x + 4, y + 3, 4, 4)?;
        self.pixel(x + 6, y + 2)?;
        self.pixel(x + 7, y + 1)?;
        self.pixel(x + 8, y)?;
        self.pixel(x + 9, y)?;
        self.pixel(x + 8, y - 1)
    }
}

impl<D> DisplaySink for GraphicsDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn clear(&mut self) -> Result<(), D::Error> {
        self.target.clear(BACKGROUND)
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), D::Error> {
        let style = MonoTextStyle::new(self.font(), FOREGROUND);
        Text::with_baseline(text, self.map(x, y), style, Baseline::Top)
            .draw(&mut self.target)
            .map(drop)
    }

    /// Cells shrink to fit: at most 12 logical pixels, centred horizontally.
    fn draw_grid(&mut self, grid: &Grid) -> Result<(), D::Error> {
        self.hline(0, RULE_Y, WIDTH as u32)?;

        let cols = i32::from(grid.width());
        let rows = i32::from(grid.height());
        let size = 12.min((HEIGHT - GRID_TOP - 6) / rows).min((WIDTH - 8) / cols);
        let left = (WIDTH - cols * size) / 2;

        for (index, cell) in grid.cells().iter().enumerate() {
            let position = grid.position_of(index);
            let x = left + i32::from(position.x) * size;
            let y = GRID_TOP + i32::from(position.y) * size;
            self.outline(x, y, size as u32, size as u32)?;

            if index == grid.cursor_index() {
                self.fill(x + 2, y + 2, (size - 4) as u32, (size - 4) as u32)?;
            } else {
                let glyph = match (cell.revealed, cell.kind) {
                    (false, _) => "?",
                    (true, CellKind::Treasure) => "T",
                    (true, CellKind::Bomb) => "X",
                    (true, CellKind::Empty) => continue,
                };
                self.draw_text(x + 3, y + 2, glyph)?;
            }
        }
        Ok(())
    }

    fn draw_icon(&mut self, icon: Icon, x: i32, y: i32) -> Result<(), D::Error> {
        match icon {
            Icon::ChestClosed => self.chest(x, y, false),
            Icon::ChestAjar => self.chest_ajar(x, y),
            Icon::ChestOpen => self.chest(x, y, true),
            Icon::Bomb => self.bomb(x, y),
        }
    }

    /// Direct-drawing targets have nothing to flush.
    fn present(&mut self) -> Result<(), D::Error> {
        Ok(())
    }
}

#[cfg(feature = "board")]
pub use st7789::Display;

#[cfg(feature = "board")]
mod st7789 {
    use embedded_hal_bus::spi::ExclusiveDevice;
    use esp_hal::{
        Async,
        dma::{
            DmaRxBuf,
            DmaTxBuf,
        },
        dma_buffers,
        gpio::{
            Level,
            Output,
            OutputConfig,
        },
        spi::master::Spi,
        time::Rate,
    };

    use crate::board::DisplayResources;

    type SpiInterface<'a> = mipidsi::interface::SpiInterface<
        'a,
        ExclusiveDevice<esp_hal::spi::master::SpiDmaBus<'a, Async>, Output<'a>, esp_hal::delay::Delay>,
        Output<'a>,
    >;

    /// The badge's 320×170 ST7789 panel.
    pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, mipidsi::models::ST7789, Output<'a>>;

    /// Panel pixels buffered per SPI transfer.
    const BUFFER: usize = 32000;

    impl From<DisplayResources<'static>> for Display<'static> {
        fn from(res: DisplayResources<'static>) -> Self {
            let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(BUFFER);
            let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).expect("display rx buffer");
            let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).expect("display tx buffer");

            let mut delay = esp_hal::delay::Delay::new();

            let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
            let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
            rst.set_high();

            let spi = Spi::new(
                res.spi,
                esp_hal::spi::master::Config::default().with_frequency(Rate::from_mhz(80)),
            )
            .expect("display SPI config")
            .with_sck(res.sck)
            .with_mosi(res.mosi)
            .with_miso(res.miso)
            .with_dma(res.dma)
            .with_buffers(dma_rx_buf, dma_tx_buf)
            .into_async();

            let cs = Output::new(res.cs, Level::High, OutputConfig::default());
            let spi_device = ExclusiveDevice::new(spi, cs, delay).expect("display chip select");

            let buffer = crate::mk_static!([u8; BUFFER], [0_u8; BUFFER]);
            let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

            let display = mipidsi::Builder::new(mipidsi::models::ST7789, di)
                .reset_pin(rst)
                .display_size(170, 320)
                .invert_colors(mipidsi::options::ColorInversion::Inverted)
                .orientation(
                    mipidsi::options::Orientation::new().rotate(mipidsi::options::Rotation::Deg90),
                )
                .display_offset(35, 0)
                .init(&mut delay)
                .expect("ST7789 init");
            info!("display ready");
            display
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_graphics::mock_display::MockDisplay;

    use super::*;
    use crate::config::LevelConfig;

    /// Counts lit pixels on a target of any size.
    struct Canvas {
        size: Size,
        lit: usize,
    }

    impl Canvas {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: Size::new(width, height),
                lit: 0,
            }
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for Canvas {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Infallible>
        where
            I: IntoIterator<Item = Pixel<Rgb565>>,
        {
            self.lit += pixels
                .into_iter()
                .filter(|Pixel(_, color)| *color == FOREGROUND)
                .count();
            Ok(())
        }
    }

    fn mock() -> MockDisplay<Rgb565> {
        let mut display = MockDisplay::new();
        display.set_allow_out_of_bounds_drawing(true);
        display.set_allow_overdraw(true);
        display
    }

    #[test]
    fn fit_centres_layout_on_badge_panel() {
        let display = GraphicsDisplay::fit(Canvas::new(320, 170));
        assert_eq!(display.scale(), 2);
        assert_eq!(display.origin(), Point::new(32, 21));

        let small = GraphicsDisplay::fit(Canvas::new(64, 64));
        assert_eq!(small.scale(), 1);
        assert_eq!(small.origin(), Point::zero());
    }

    #[test]
    fn text_lands_at_mapped_position() {
        let mut display = GraphicsDisplay::new(mock()).with_origin(Point::new(4, 2));
        display.draw_text(10, 5, "T").unwrap();

        let area = display.target().affected_area();
        assert!(area.top_left.x >= 14);
        assert!(area.top_left.y >= 7);
        assert!(area.size.width <= 6 && area.size.height <= 10);
    }

    #[test]
    fn icons_scale_with_the_layout() {
        let mut small = GraphicsDisplay::new(Canvas::new(128, 64));
        small.draw_icon(Icon::ChestClosed, 0, 0).unwrap();
        let mut large = GraphicsDisplay::new(Canvas::new(256, 128)).with_scale(2);
        large.draw_icon(Icon::ChestClosed, 0, 0).unwrap();

        assert!(small.target().lit > 0);
        assert!(large.target().lit > 3 * small.target().lit);
    }

    #[test]
    fn chest_frames_differ() {
        let lit = |icon| {
            let mut display = GraphicsDisplay::new(Canvas::new(128, 64));
            display.draw_icon(icon, 20, 20).unwrap();
            display.target().lit
        };
        let frames = [Icon::ChestClosed, Icon::ChestAjar, Icon::ChestOpen].map(lit);
        assert_ne!(frames[0], frames[1]);
        assert_ne!(frames[1], frames[2]);
    }

    #[test]
    fn clear_paints_background() {
        let mut display = GraphicsDisplay::new(mock());
        display.draw_icon(Icon::Bomb, 0, 0).unwrap();
        display.clear().unwrap();
        assert_eq!(display.target().get_pixel(Point::new(6, 10)), Some(BACKGROUND));
    }

    #[test]
    fn cursor_cell_is_filled() {
        let grid = Grid::generate(&LevelConfig::new(2, 2, 1, 1, 1), 5).unwrap();
        let mut display = GraphicsDisplay::new(mock());
        display.draw_grid(&grid).unwrap();

        // 2x2 at 12px cells starts at x = 52; the cursor sits on the first cell.
        let target = display.target();
        assert_eq!(target.get_pixel(Point::new(57, 17)), Some(FOREGROUND));
        assert_eq!(target.get_pixel(Point::new(53, 13)), None);
    }
}
