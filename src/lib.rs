//! Driver for chained MAX7219/MAX7221 8x8 LED matrix displays.
//!
//! ## How MAX72xx Chains Work
//!
//! A MAX7219 (or the SPI-compatible MAX7221) drives one 8x8 LED matrix. It scans the
//! matrix itself, so unlike a multiplexed panel it only needs data when the picture changes.
//! Several modules are commonly daisy-chained into a strip that acts as one long display.
//!
//! ### Signal names
//! - **DIN** – Serial data into the first chip of the chain
//! - **CLK** – Shift clock; each rising edge shifts one bit into every chip's 16-bit register
//! - **LOAD / CS** – Latch; on the rising edge every chip applies the 16 bits it currently holds
//! - **DOUT** – Serial data out of a chip, wired to DIN of the next one
//!
//! ### Shifting through the chain
//! 1. Each chip takes a 16-bit packet: the register address in bits 11-8 and the data in
//!    bits 7-0, most significant bit first.
//! 2. While LOAD is low, whatever falls out of one chip's shift register moves on to the next
//!    chip. Shifting `n` packets into an `n`-chip chain therefore leaves the *first* packet
//!    in the chip *farthest* from the controller.
//! 3. Raising LOAD applies every chip's packet at the same time. One such strobe is called
//!    a latch in this crate.
//! 4. To address a single chip, the others get a no-op packet (register `0x00`).
//!
//! ### Registers used
//! - **Digit 0-7** (`0x01`-`0x08`) – One byte per matrix row
//! - **Decode mode** (`0x09`) – BCD decoding; always `0` for matrices
//! - **Intensity** (`0x0A`) – PWM brightness, `0` to `15`
//! - **Scan limit** (`0x0B`) – Number of scanned rows minus one; always `7`
//! - **Shutdown** (`0x0C`) – `0` blanks the chip, `1` is normal operation
//! - **Display test** (`0x0F`) – `1` lights every LED
//!
//! A full frame is eight latches, one per row register, each carrying one byte per chip.
//!
//! ## Crate Layout
//!
//! - [`canvas::Canvas`] is the logical pixel buffer. It implements the `embedded-graphics`
//!   `DrawTarget`, so shapes, images and text can be drawn onto it.
//! - [`chain::Topology`] describes the chain: chip count, direction, which end chip 0 sits at,
//!   and the per-chip wiring flags.
//! - [`transform`] turns the logical canvas into the bytes each chip expects.
//! - [`command`] frames those bytes into latches and bursts.
//! - [`interface`] sends bursts over an `embedded-hal` SPI bus or device.
//! - [`display::MatrixDisplay`] ties it all together and is what an application refreshes
//!   periodically.
//! - [`config::DisplayConfig`] loads the display description with `serde`.
//!
//! ```rust
//! use core::convert::Infallible;
//!
//! use embassy_time::Instant;
//! use embedded_graphics::mono_font::ascii::FONT_5X8;
//! use embedded_graphics::mono_font::MonoTextStyle;
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::text::{Baseline, Text};
//! use max72xx_matrix::command::Burst;
//! use max72xx_matrix::config::DisplayConfig;
//! use max72xx_matrix::interface::ChainInterface;
//! use max72xx_matrix::MatrixDisplay;
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
//! let config = DisplayConfig {
//!     num_chips: 4,
//!     ..DisplayConfig::default()
//! };
//! let settings = config.validate().unwrap();
//! let mut display = MatrixDisplay::<_, 8>::from_settings(NullInterface, &settings).unwrap();
//! display.init().unwrap();
//!
//! let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
//! Text::with_baseline("12:34", Point::zero(), style, Baseline::Top)
//!     .draw(&mut display)
//!     .unwrap();
//! display.refresh(Instant::from_millis(0));
//! ```
//!
//! ## Chip Order
//!
//! Chips are numbered in shift order: chip 0's packet is shifted out first, so it ends up in
//! the chip farthest from the controller. A `Left` chain grows leftwards from the controller,
//! so that chip is the leftmost one and drives the first 8x8 block of the canvas, as does the
//! topmost chip of an `Up` chain. With `Right` or `Down`, chip 0 sits at the far end of the
//! canvas and drives the last block. Modules are not wired consistently, so the order can be
//! overridden with [`chain::Topology::with_chip_order`].
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and logs initialization, skipped refreshes
//! and [`MatrixDisplay::log_config`] output through `defmt`. Without it, logging compiles to
//! nothing.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use embassy_time::Duration;

pub mod canvas;
pub mod chain;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod interface;
pub mod transform;

pub use canvas::Canvas;
pub use chain::{ChainDirection, ChipOrder, Orientation, Topology};
pub use display::{MatrixDisplay, RefreshStatus};
pub use error::{ConfigurationError, Error};

/// Rows (and columns) of one chip's matrix.
pub const ROWS_PER_CHIP: usize = 8;

/// Longest supported chain.
pub const MAX_CHIPS: usize = 255;

/// Highest intensity level.
pub const MAX_INTENSITY: u8 = 15;

/// Most static pages a display can hold.
pub const MAX_PAGES: usize = 8;

/// Refresh period used when none is configured.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(1);
