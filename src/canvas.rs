//! The logical canvas drawn on by application code.
//!
//! The canvas is stored as one 8x8 block per chip, in logical order along the
//! chain axis. Row `y` of a block is one byte whose bit `x` is the pixel in
//! column `x` (bit 0 is the leftmost column). How blocks end up on the chips
//! is decided at refresh time by [`crate::transform`].
//!
//! [`Canvas`] implements the `embedded-graphics` [`DrawTarget`], so lines,
//! shapes and text can be drawn onto it directly:
//!
//! ```rust
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{Line, PrimitiveStyle};
//! use max72xx_matrix::canvas::Canvas;
//! use max72xx_matrix::chain::{ChainDirection, Orientation, Topology};
//!
//! let topology = Topology::new(4, ChainDirection::Left, Orientation::default()).unwrap();
//! let mut canvas = Canvas::<4>::new(&topology).unwrap();
//!
//! Line::new(Point::new(0, 0), Point::new(31, 7))
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!     .draw(&mut canvas)
//!     .unwrap();
//!
//! assert!(canvas.pixel(Point::new(0, 0)));
//! ```

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};
use heapless::Vec;

use crate::chain::Topology;
use crate::error::ConfigurationError;
use crate::ROWS_PER_CHIP;

/// One 8x8 block, a byte per row.
pub type Block = [u8; ROWS_PER_CHIP];

/// Logical pixel buffer for a chain of up to `N` chips.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas<const N: usize> {
    topology: Topology,
    blocks: Vec<Block, N>,
}

impl<const N: usize> Canvas<N> {
    /// Create a blank canvas sized for `topology`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ChipCount`] if the topology has more than `N`
    /// chips.
    pub fn new(topology: &Topology) -> Result<Self, ConfigurationError> {
        let mut blocks = Vec::new();
        blocks
            .resize(topology.chip_count(), [0; ROWS_PER_CHIP])
            .map_err(|()| ConfigurationError::ChipCount)?;
        Ok(Self {
            topology: *topology,
            blocks,
        })
    }

    /// Topology this canvas was sized for.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.topology.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.topology.height()
    }

    /// Set or clear a pixel. Points off the canvas are ignored, so drawing
    /// may run past the edges while scrolling.
    #[inline]
    pub fn set_pixel(&mut self, p: Point, on: bool) {
        let Some(at) = self.topology.locate(p.x, p.y) else {
            return;
        };
        let row = &mut self.blocks[at.block][at.y];
        if on {
            *row |= 1 << at.x;
        } else {
            *row &= !(1 << at.x);
        }
    }

    /// State of a pixel; `false` off the canvas.
    #[must_use]
    pub fn pixel(&self, p: Point) -> bool {
        self.topology
            .locate(p.x, p.y)
            .is_some_and(|at| self.blocks[at.block][at.y] & (1 << at.x) != 0)
    }

    /// Set every pixel to `on`.
    pub fn fill(&mut self, on: bool) {
        let value = if on { 0xFF } else { 0x00 };
        for block in &mut self.blocks {
            *block = [value; ROWS_PER_CHIP];
        }
    }

    /// Turn every pixel off.
    pub fn erase(&mut self) {
        self.fill(false);
    }

    /// The block at logical position `index` along the chain.
    #[must_use]
    pub fn block(&self, index: usize) -> &Block {
        &self.blocks[index]
    }

    /// All blocks in logical order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

impl<const N: usize> OriginDimensions for Canvas<N> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<const N: usize> DrawTarget for Canvas<N> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            self.set_pixel(pixel.0, pixel.1.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.is_on());
        Ok(())
    }
}

impl<const N: usize> core::fmt::Debug for Canvas<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("blocks", &self.blocks.as_slice())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for Canvas<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Canvas<{}> {}x{} chips: {}",
            N,
            self.width(),
            self.height(),
            self.blocks.len()
        );
    }
}
