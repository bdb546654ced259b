//! Chip topology of a chained display.
//!
//! A chain is a row (or column) of identical 8x8 chips that together form one
//! logical canvas. The [`Topology`] describes which way the chain extends,
//! which end of it is chip 0, and how each chip's matrix is wired relative to
//! the logical canvas. It is fixed once the display is built.

use crate::error::ConfigurationError;
use crate::{MAX_CHIPS, ROWS_PER_CHIP};

/// Direction in which successive chips of the chain extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChainDirection {
    /// Next chip is above the previous one
    Up,
    /// Next chip is below the previous one
    Down,
    /// Next chip is to the left of the previous one
    #[default]
    Left,
    /// Next chip is to the right of the previous one
    Right,
}

impl ChainDirection {
    /// `true` when the chips are stacked vertically.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// The chip order this direction implies when no override is given.
    ///
    /// `Left` and `Up` put chip 0 at the logical origin, `Right` and `Down`
    /// put it at the far end of the canvas.
    #[must_use]
    pub const fn default_chip_order(self) -> ChipOrder {
        match self {
            Self::Left | Self::Up => ChipOrder::Forward,
            Self::Right | Self::Down => ChipOrder::Reversed,
        }
    }

    /// Upper-case name, as used in configuration dumps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

impl core::str::FromStr for ChainDirection {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("up") {
            Ok(Self::Up)
        } else if s.eq_ignore_ascii_case("down") {
            Ok(Self::Down)
        } else if s.eq_ignore_ascii_case("left") {
            Ok(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Self::Right)
        } else {
            Err(ConfigurationError::ChainDirection)
        }
    }
}

/// How chip indices are laid out along the logical canvas.
///
/// Chips are numbered in shift order: chip `0` is shifted out first and sits
/// farthest from the controller, the last chip is wired to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipOrder {
    /// Chip `c` drives logical block `c`
    Forward,
    /// Chip `c` drives logical block `chip_count - 1 - c`
    Reversed,
}

/// Per-chip wiring quirks, applied to every chip of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Orientation {
    /// Hardware rows and columns are transposed
    pub row_column_swapped: bool,
    /// Hardware row order is mirrored
    pub reverse_rows: bool,
    /// Hardware column order is mirrored
    pub reverse_columns: bool,
}

/// Immutable description of a chain of 8x8 chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Topology {
    chip_count: u8,
    direction: ChainDirection,
    orientation: Orientation,
    order: ChipOrder,
}

/// A logical pixel resolved to the 8x8 block that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPoint {
    /// Block index along the chain axis, counted from the logical origin
    pub block: usize,
    /// Column inside the block (0..8)
    pub x: usize,
    /// Row inside the block (0..8)
    pub y: usize,
}

impl Topology {
    /// Describe a chain of `chip_count` chips.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ChipCount`] unless `chip_count` is in `1..=255`.
    pub fn new(
        chip_count: usize,
        direction: ChainDirection,
        orientation: Orientation,
    ) -> Result<Self, ConfigurationError> {
        if chip_count == 0 || chip_count > MAX_CHIPS {
            return Err(ConfigurationError::ChipCount);
        }
        Ok(Self {
            chip_count: chip_count as u8,
            direction,
            orientation,
            order: direction.default_chip_order(),
        })
    }

    /// Override which end of the canvas chip 0 sits at.
    ///
    /// Wiring varies between modules, so the default derived from the chain
    /// direction is not always right.
    #[must_use]
    pub const fn with_chip_order(mut self, order: ChipOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of chips in the chain.
    #[must_use]
    pub const fn chip_count(&self) -> usize {
        self.chip_count as usize
    }

    /// Direction the chain extends in.
    #[must_use]
    pub const fn direction(&self) -> ChainDirection {
        self.direction
    }

    /// Per-chip wiring flags.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Chip order along the canvas.
    #[must_use]
    pub const fn chip_order(&self) -> ChipOrder {
        self.order
    }

    /// Logical width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        if self.direction.is_vertical() {
            ROWS_PER_CHIP
        } else {
            ROWS_PER_CHIP * self.chip_count()
        }
    }

    /// Logical height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        if self.direction.is_vertical() {
            ROWS_PER_CHIP * self.chip_count()
        } else {
            ROWS_PER_CHIP
        }
    }

    /// Resolve a logical pixel to its block, or `None` when it is off the
    /// canvas.
    #[must_use]
    pub fn locate(&self, x: i32, y: i32) -> Option<BlockPoint> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let along = if self.direction.is_vertical() { y } else { x };
        Some(BlockPoint {
            block: along / ROWS_PER_CHIP,
            x: x % ROWS_PER_CHIP,
            y: y % ROWS_PER_CHIP,
        })
    }

    /// Logical block driven by `chip`.
    #[must_use]
    pub const fn block_of_chip(&self, chip: usize) -> usize {
        match self.order {
            ChipOrder::Forward => chip,
            ChipOrder::Reversed => self.chip_count() - 1 - chip,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use proptest::prelude::*;

    use super::*;

    fn topology(chips: usize, direction: ChainDirection) -> Topology {
        Topology::new(chips, direction, Orientation::default()).unwrap()
    }

    #[test]
    fn test_chip_count_bounds() {
        assert_eq!(
            Topology::new(0, ChainDirection::Left, Orientation::default()),
            Err(ConfigurationError::ChipCount)
        );
        assert_eq!(
            Topology::new(256, ChainDirection::Left, Orientation::default()),
            Err(ConfigurationError::ChipCount)
        );
        assert_eq!(topology(1, ChainDirection::Left).chip_count(), 1);
        assert_eq!(topology(255, ChainDirection::Left).chip_count(), 255);
    }

    #[test]
    fn test_dimensions_follow_direction() {
        let horizontal = topology(4, ChainDirection::Left);
        assert_eq!((horizontal.width(), horizontal.height()), (32, 8));

        let horizontal = topology(4, ChainDirection::Right);
        assert_eq!((horizontal.width(), horizontal.height()), (32, 8));

        let vertical = topology(4, ChainDirection::Up);
        assert_eq!((vertical.width(), vertical.height()), (8, 32));

        let vertical = topology(4, ChainDirection::Down);
        assert_eq!((vertical.width(), vertical.height()), (8, 32));
    }

    #[test]
    fn test_locate_horizontal() {
        let t = topology(3, ChainDirection::Left);
        assert_eq!(t.locate(0, 0), Some(BlockPoint { block: 0, x: 0, y: 0 }));
        assert_eq!(t.locate(9, 3), Some(BlockPoint { block: 1, x: 1, y: 3 }));
        assert_eq!(t.locate(23, 7), Some(BlockPoint { block: 2, x: 7, y: 7 }));
    }

    #[test]
    fn test_locate_vertical() {
        let t = topology(3, ChainDirection::Down);
        assert_eq!(t.locate(2, 17), Some(BlockPoint { block: 2, x: 2, y: 1 }));
    }

    #[test]
    fn test_locate_off_canvas() {
        let t = topology(3, ChainDirection::Left);
        assert_eq!(t.locate(-1, 0), None);
        assert_eq!(t.locate(0, -1), None);
        assert_eq!(t.locate(24, 0), None);
        assert_eq!(t.locate(0, 8), None);
    }

    #[test]
    fn test_default_chip_order() {
        let left = topology(3, ChainDirection::Left);
        assert_eq!(left.block_of_chip(0), 0);
        assert_eq!(left.block_of_chip(2), 2);

        let right = topology(3, ChainDirection::Right);
        assert_eq!(right.block_of_chip(0), 2);
        assert_eq!(right.block_of_chip(1), 1);
        assert_eq!(right.block_of_chip(2), 0);

        assert_eq!(topology(2, ChainDirection::Up).chip_order(), ChipOrder::Forward);
        assert_eq!(topology(2, ChainDirection::Down).chip_order(), ChipOrder::Reversed);
    }

    #[test]
    fn test_chip_order_override() {
        let t = topology(4, ChainDirection::Left).with_chip_order(ChipOrder::Reversed);
        assert_eq!(t.block_of_chip(0), 3);
        assert_eq!(t.direction(), ChainDirection::Left);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("left".parse(), Ok(ChainDirection::Left));
        assert_eq!("RIGHT".parse(), Ok(ChainDirection::Right));
        assert_eq!("Up".parse(), Ok(ChainDirection::Up));
        assert_eq!("down".parse(), Ok(ChainDirection::Down));
        assert_eq!(
            "sideways".parse::<ChainDirection>(),
            Err(ConfigurationError::ChainDirection)
        );
    }

    proptest! {
        #[test]
        fn block_of_chip_is_a_permutation(chips in 1usize..=255, reversed in any::<bool>()) {
            let order = if reversed { ChipOrder::Reversed } else { ChipOrder::Forward };
            let t = topology(chips, ChainDirection::Left).with_chip_order(order);
            let mut seen = std::vec![false; chips];
            for chip in 0..chips {
                let block = t.block_of_chip(chip);
                prop_assert!(block < chips);
                prop_assert!(!seen[block]);
                seen[block] = true;
            }
        }

        #[test]
        fn every_on_canvas_pixel_lands_in_a_block(
            chips in 1usize..=16,
            vertical in any::<bool>(),
            x in 0i32..128,
            y in 0i32..128,
        ) {
            let direction = if vertical { ChainDirection::Up } else { ChainDirection::Left };
            let t = topology(chips, direction);
            let on_canvas = (x as usize) < t.width() && (y as usize) < t.height();
            match t.locate(x, y) {
                Some(p) => {
                    prop_assert!(on_canvas);
                    prop_assert!(p.block < chips);
                    prop_assert!(p.x < ROWS_PER_CHIP && p.y < ROWS_PER_CHIP);
                }
                None => prop_assert!(!on_canvas),
            }
        }
    }
}
