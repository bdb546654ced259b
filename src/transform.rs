//! Logical-to-physical conversion.
//!
//! [`chip_rows`] is the whole per-chip wiring model: it takes one 8x8 logical
//! block and the chain's [`Orientation`] and returns the eight row bytes the
//! chip expects. [`PhysicalFrame::render`] applies it to every chip of a
//! canvas, using the canvas's [`Topology`] to pick each chip's block.
//!
//! [`Topology`]: crate::chain::Topology

use heapless::Vec;

use crate::canvas::{Block, Canvas};
use crate::chain::Orientation;
use crate::ROWS_PER_CHIP;

/// Swap rows and columns of a block.
#[must_use]
pub fn transpose(block: &Block) -> Block {
    let mut out = [0u8; ROWS_PER_CHIP];
    for (row, bits) in block.iter().enumerate() {
        for (col, out_row) in out.iter_mut().enumerate() {
            if bits & (1 << col) != 0 {
                *out_row |= 1 << row;
            }
        }
    }
    out
}

/// Convert a logical block into the row bytes for one chip.
///
/// Applied in order: transpose when `row_column_swapped`, mirror the row
/// order when `reverse_rows`, mirror the bits of every row when
/// `reverse_columns`.
#[must_use]
pub fn chip_rows(block: &Block, orientation: Orientation) -> Block {
    let mut rows = if orientation.row_column_swapped {
        transpose(block)
    } else {
        *block
    };
    if orientation.reverse_rows {
        rows.reverse();
    }
    if orientation.reverse_columns {
        for row in &mut rows {
            *row = row.reverse_bits();
        }
    }
    rows
}

/// Row bytes for every chip, indexed by chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalFrame<const N: usize> {
    chips: Vec<Block, N>,
}

impl<const N: usize> PhysicalFrame<N> {
    /// Render `canvas` for the chips of the chain it was sized for.
    #[must_use]
    pub fn render(canvas: &Canvas<N>) -> Self {
        let topology = canvas.topology();
        let orientation = topology.orientation();
        let chips = (0..topology.chip_count())
            .map(|chip| chip_rows(canvas.block(topology.block_of_chip(chip)), orientation))
            .collect();
        Self { chips }
    }

    /// Number of chips in the frame.
    #[must_use]
    pub fn chip_count(&self) -> usize {
        self.chips.len()
    }

    /// The eight row bytes for `chip`.
    #[must_use]
    pub fn chip(&self, chip: usize) -> &Block {
        &self.chips[chip]
    }

    /// Byte for hardware `row` of `chip`.
    #[must_use]
    pub fn row(&self, chip: usize, row: usize) -> u8 {
        self.chips[chip][row]
    }
}
