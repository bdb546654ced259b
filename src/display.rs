//! The chained matrix display.
//!
//! [`MatrixDisplay`] ties a [`Canvas`] to a [`ChainInterface`]. Application
//! code draws on the canvas, directly or through a registered writer or a set
//! of static pages, and a scheduler calls [`MatrixDisplay::refresh`] at the
//! configured interval to push the canvas out to the chips.
//!
//! # Example
//! ```rust
//! use core::convert::Infallible;
//!
//! use embassy_time::Instant;
//! use embedded_graphics::prelude::*;
//! use max72xx_matrix::canvas::Canvas;
//! use max72xx_matrix::chain::{ChainDirection, Orientation, Topology};
//! use max72xx_matrix::command::Burst;
//! use max72xx_matrix::display::{MatrixDisplay, RefreshStatus};
//! use max72xx_matrix::interface::ChainInterface;
//!
//! struct NullInterface;
//!
//! impl ChainInterface for NullInterface {
//!     type Error = Infallible;
//!
//!     fn write_burst<const N: usize>(&mut self, _burst: &Burst<'_, N>) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//! }
//!
//! fn blink(canvas: &mut Canvas<4>, now: Instant) {
//!     canvas.fill(now.as_secs() % 2 == 0);
//! }
//!
//! let topology = Topology::new(4, ChainDirection::Left, Orientation::default()).unwrap();
//! let mut display = MatrixDisplay::<_, 4>::new(NullInterface, topology).unwrap();
//! display.init().unwrap();
//! display.set_intensity(8).unwrap();
//! display.set_writer(blink);
//!
//! assert_eq!(display.refresh(Instant::from_secs(0)), RefreshStatus::Updated);
//! assert!(display.canvas().pixel(Point::new(31, 7)));
//! ```

use core::convert::Infallible;

use embassy_time::{Duration, Instant};
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};
use heapless::Vec;

use crate::canvas::Canvas;
use crate::chain::Topology;
use crate::command::{Burst, Command, Register};
use crate::config::Settings;
use crate::error::{ConfigurationError, Error};
use crate::interface::ChainInterface;
use crate::transform::PhysicalFrame;
use crate::{DEFAULT_UPDATE_INTERVAL, MAX_INTENSITY, MAX_PAGES, ROWS_PER_CHIP};

/// Draws onto the canvas once per refresh.
///
/// Implemented for every `FnMut(&mut Canvas<N>, Instant)`, so closures that
/// own their state (a sensor reading, a scroll offset) work as writers. The
/// canvas keeps its contents between calls.
pub trait Writer<const N: usize> {
    /// Draw the frame for refresh time `now`.
    fn draw(&mut self, canvas: &mut Canvas<N>, now: Instant);
}

impl<const N: usize, F> Writer<N> for F
where
    F: FnMut(&mut Canvas<N>, Instant),
{
    fn draw(&mut self, canvas: &mut Canvas<N>, now: Instant) {
        self(canvas, now);
    }
}

/// Plain function writer, the writer type of a display built with
/// [`MatrixDisplay::new`].
pub type WriterFn<const N: usize> = fn(&mut Canvas<N>, Instant);

/// Pre-drawn pages, one of which is shown at a time.
#[derive(Debug, Clone)]
pub struct Pages<const N: usize> {
    pages: Vec<Canvas<N>, MAX_PAGES>,
    current: usize,
}

impl<const N: usize> Pages<N> {
    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// `true` if there are no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Index of the page being shown.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The page being shown.
    #[must_use]
    pub fn current(&self) -> Option<&Canvas<N>> {
        self.pages.get(self.current)
    }
}

/// What fills the canvas at each refresh.
#[derive(Clone)]
pub enum DrawMode<const N: usize, W = WriterFn<N>> {
    /// Nothing; the canvas only changes through direct drawing
    Blank,
    /// The current static page is copied onto the canvas
    Pages(Pages<N>),
    /// The writer draws onto the canvas
    Writer(W),
}

impl<const N: usize, W> core::fmt::Debug for DrawMode<N, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Blank => f.write_str("Blank"),
            Self::Pages(pages) => f.debug_tuple("Pages").field(pages).finish(),
            Self::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshStatus {
    /// The frame was sent to every chip
    Updated,
    /// The transport failed; the cycle was dropped
    Skipped,
}

/// A chain of MAX7219/MAX7221 8x8 matrices driven as one display.
///
/// # Type Parameters
/// - `I` - The transport, see [`crate::interface`]
/// - `N` - Maximum number of chips; the actual count comes from the
///   [`Topology`] and may be smaller
/// - `W` - The [`Writer`]; a plain function unless replaced with
///   [`MatrixDisplay::with_writer`]
pub struct MatrixDisplay<I, const N: usize, W = WriterFn<N>> {
    interface: I,
    topology: Topology,
    canvas: Canvas<N>,
    mode: DrawMode<N, W>,
    intensity: u8,
    intensity_pending: bool,
    update_interval: Duration,
    skipped: u32,
}

impl<I: ChainInterface, const N: usize> MatrixDisplay<I, N> {
    /// Create a display for `topology`. Nothing is sent until [`Self::init`].
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ChipCount`] if the topology has more than `N`
    /// chips.
    pub fn new(interface: I, topology: Topology) -> Result<Self, ConfigurationError> {
        let canvas = Canvas::new(&topology)?;
        Ok(Self {
            interface,
            topology,
            canvas,
            mode: DrawMode::Blank,
            intensity: MAX_INTENSITY,
            intensity_pending: false,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            skipped: 0,
        })
    }

    /// Create a display from validated configuration.
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn from_settings(interface: I, settings: &Settings) -> Result<Self, ConfigurationError> {
        let mut display = Self::new(interface, settings.topology)?;
        if let Some(level) = settings.intensity {
            display.set_intensity(level)?;
        }
        display.set_update_interval(settings.update_interval)?;
        Ok(display)
    }
}

impl<I: ChainInterface, const N: usize, W: Writer<N>> MatrixDisplay<I, N, W> {
    /// Switch to a writer of another type, such as a closure that owns
    /// state. Replaces any previous writer or pages.
    ///
    /// Annotate the closure's arguments so it is generic over the canvas
    /// borrow: `|canvas: &mut Canvas<N>, now: Instant| ...`.
    pub fn with_writer<V: Writer<N>>(self, writer: V) -> MatrixDisplay<I, N, V> {
        MatrixDisplay {
            interface: self.interface,
            topology: self.topology,
            canvas: self.canvas,
            mode: DrawMode::Writer(writer),
            intensity: self.intensity,
            intensity_pending: self.intensity_pending,
            update_interval: self.update_interval,
            skipped: self.skipped,
        }
    }

    /// Give the transport back.
    pub fn release(self) -> I {
        self.interface
    }

    /// Chip topology.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Logical width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.topology.width()
    }

    /// Logical height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.topology.height()
    }

    /// The canvas as it will be sent on the next refresh (before the draw
    /// mode runs).
    #[must_use]
    pub fn canvas(&self) -> &Canvas<N> {
        &self.canvas
    }

    /// Mutable access to the canvas.
    pub fn canvas_mut(&mut self) -> &mut Canvas<N> {
        &mut self.canvas
    }

    /// Set or clear one pixel. Off-canvas points are ignored.
    pub fn set_pixel(&mut self, p: Point, on: bool) {
        self.canvas.set_pixel(p, on);
    }

    /// Set every pixel to `on`.
    pub fn fill(&mut self, on: bool) {
        self.canvas.fill(on);
    }

    /// Turn every pixel off.
    pub fn erase(&mut self) {
        self.canvas.erase();
    }

    /// Current intensity.
    #[must_use]
    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Set the brightness of every chip, 0 to 15. Sent with the next refresh.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::Intensity`] if `level` is above 15.
    pub fn set_intensity(&mut self, level: u8) -> Result<(), ConfigurationError> {
        if level > MAX_INTENSITY {
            return Err(ConfigurationError::Intensity);
        }
        self.intensity = level;
        self.intensity_pending = true;
        Ok(())
    }

    /// `true` while an intensity change waits for the next refresh.
    #[must_use]
    pub fn intensity_pending(&self) -> bool {
        self.intensity_pending
    }

    /// How often the scheduler should call [`Self::refresh`].
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Change the refresh interval.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UpdateInterval`] for a zero interval.
    pub fn set_update_interval(&mut self, interval: Duration) -> Result<(), ConfigurationError> {
        if interval == Duration::from_ticks(0) {
            return Err(ConfigurationError::UpdateInterval);
        }
        self.update_interval = interval;
        Ok(())
    }

    /// Active draw mode.
    #[must_use]
    pub fn draw_mode(&self) -> &DrawMode<N, W> {
        &self.mode
    }

    /// Register the writer, replacing any previous writer or pages.
    pub fn set_writer(&mut self, writer: W) {
        self.mode = DrawMode::Writer(writer);
    }

    /// Drop the writer or pages; the canvas is left as it is.
    pub fn clear_draw_mode(&mut self) {
        self.mode = DrawMode::Blank;
    }

    /// A blank canvas sized for this display, for building pages.
    #[must_use]
    pub fn new_page(&self) -> Canvas<N> {
        let mut page = self.canvas.clone();
        page.erase();
        page
    }

    /// Show static pages, replacing any writer. The first page is shown.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::PageCount`] for no pages or more than
    /// [`MAX_PAGES`], [`ConfigurationError::PageTopology`] for a page built
    /// for another chain.
    pub fn set_pages<P>(&mut self, pages: P) -> Result<(), ConfigurationError>
    where
        P: IntoIterator<Item = Canvas<N>>,
    {
        let mut collected = Vec::new();
        for page in pages {
            if page.topology() != &self.topology {
                return Err(ConfigurationError::PageTopology);
            }
            collected
                .push(page)
                .map_err(|_| ConfigurationError::PageCount)?;
        }
        if collected.is_empty() {
            return Err(ConfigurationError::PageCount);
        }
        self.mode = DrawMode::Pages(Pages {
            pages: collected,
            current: 0,
        });
        Ok(())
    }

    /// Switch to page `index`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::PageCount`] if no pages are set or `index` is out
    /// of range.
    pub fn show_page(&mut self, index: usize) -> Result<(), ConfigurationError> {
        match &mut self.mode {
            DrawMode::Pages(pages) if index < pages.len() => {
                pages.current = index;
                Ok(())
            }
            _ => Err(ConfigurationError::PageCount),
        }
    }

    /// Advance to the next page, wrapping after the last.
    pub fn next_page(&mut self) {
        if let DrawMode::Pages(pages) = &mut self.mode {
            pages.current = (pages.current + 1) % pages.len();
        }
    }

    /// Go back one page, wrapping before the first.
    pub fn previous_page(&mut self) {
        if let DrawMode::Pages(pages) = &mut self.mode {
            pages.current = (pages.current + pages.len() - 1) % pages.len();
        }
    }

    /// Index of the page being shown, if pages are set.
    #[must_use]
    pub fn current_page(&self) -> Option<usize> {
        match &self.mode {
            DrawMode::Pages(pages) => Some(pages.current_index()),
            _ => None,
        }
    }

    /// The bytes every chip would receive for the current canvas.
    #[must_use]
    pub fn frame(&self) -> PhysicalFrame<N> {
        PhysicalFrame::render(&self.canvas)
    }

    /// Number of refreshes skipped in a row because the transport failed.
    #[must_use]
    pub fn skipped_refreshes(&self) -> u32 {
        self.skipped
    }

    /// Put every chip into matrix mode and blank the display.
    ///
    /// Scan limit 7, display test off, no decode, the current intensity, an
    /// empty frame, then leave shutdown. The canvas is erased.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] if the transport fails.
    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!("max72xx: setting up {} chips", self.topology.chip_count());
        let setup = [
            Command::new(Register::ScanLimit, (ROWS_PER_CHIP - 1) as u8),
            Command::new(Register::DisplayTest, 0),
            Command::new(Register::DecodeMode, 0),
            Command::new(Register::Intensity, self.intensity),
        ];
        let power_up = [Command::new(Register::Shutdown, 1)];

        self.canvas.erase();
        let frame = self.frame();
        let burst = Burst::new(self.topology.chip_count())
            .with_commands(&setup)
            .with_frame(&frame)
            .with_trailer(&power_up);
        self.interface
            .write_burst(&burst)
            .map_err(Error::Transport)?;
        self.intensity_pending = false;
        Ok(())
    }

    /// Run one refresh cycle: let the draw mode fill the canvas, then send
    /// the frame (and any pending intensity) to every chip as one burst.
    ///
    /// A transport failure is logged and the cycle is dropped; the next call
    /// starts over with the state left intact.
    pub fn refresh(&mut self, now: Instant) -> RefreshStatus {
        match &mut self.mode {
            DrawMode::Blank => {}
            DrawMode::Writer(writer) => writer.draw(&mut self.canvas, now),
            DrawMode::Pages(pages) => {
                if let Some(page) = pages.current() {
                    self.canvas.clone_from(page);
                }
            }
        }

        let frame = self.frame();
        let intensity = [Command::new(Register::Intensity, self.intensity)];
        let commands: &[Command] = if self.intensity_pending {
            &intensity
        } else {
            &[]
        };
        let burst = Burst::new(self.topology.chip_count())
            .with_commands(commands)
            .with_frame(&frame);

        match self.interface.write_burst(&burst) {
            Ok(()) => {
                self.intensity_pending = false;
                self.skipped = 0;
                RefreshStatus::Updated
            }
            Err(_err) => {
                self.skipped = self.skipped.saturating_add(1);
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "max72xx: refresh skipped ({} in a row): {}",
                    self.skipped,
                    defmt::Debug2Format(&_err)
                );
                RefreshStatus::Skipped
            }
        }
    }

    /// Log the display configuration.
    pub fn log_config(&self) {
        #[cfg(feature = "defmt")]
        {
            let orientation = self.topology.orientation();
            defmt::info!("MAX72XX:");
            defmt::info!("  Number of Chips: {}", self.topology.chip_count());
            defmt::info!("  Intensity: {}", self.intensity);
            defmt::info!("  Chain direction: {}", self.topology.direction().as_str());
            defmt::info!("  Chip order: {}", self.topology.chip_order());
            defmt::info!("  Swap column/rows: {}", orientation.row_column_swapped);
            defmt::info!("  Reverse rows: {}", orientation.reverse_rows);
            defmt::info!("  Reverse columns: {}", orientation.reverse_columns);
            defmt::info!("  Update interval: {} ms", self.update_interval.as_millis());
        }
    }
}

impl<I, const N: usize, W> OriginDimensions for MatrixDisplay<I, N, W> {
    fn size(&self) -> Size {
        self.canvas.size()
    }
}

impl<I, const N: usize, W> DrawTarget for MatrixDisplay<I, N, W> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), Self::Error>
    where
        P: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        self.canvas.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.canvas.clear(color)
    }
}

impl<I, const N: usize, W> core::fmt::Debug for MatrixDisplay<I, N, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MatrixDisplay")
            .field("topology", &self.topology)
            .field("intensity", &self.intensity)
            .field("intensity_pending", &self.intensity_pending)
            .field("update_interval_ms", &self.update_interval.as_millis())
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}
