//! Display configuration.
//!
//! [`DisplayConfig`] is the user-facing description of a display, loadable
//! with `serde` from any self-describing format. Every field has a default,
//! so an empty document describes a single chip chained to the left.
//!
//! ```rust
//! use max72xx_matrix::config::DisplayConfig;
//!
//! let config = DisplayConfig {
//!     num_chips: 4,
//!     intensity: Some(3),
//!     ..DisplayConfig::default()
//! };
//! let settings = config.validate().unwrap();
//! assert_eq!(settings.topology.width(), 32);
//! ```
//!
//! Writer and page names are only carried through; binding a name to a
//! [`crate::display::Writer`] or to drawn pages is up to the application.

use core::fmt;

use embassy_time::Duration;
use heapless::{String, Vec};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;

use crate::chain::{ChainDirection, Orientation, Topology};
use crate::error::ConfigurationError;
use crate::{MAX_INTENSITY, MAX_PAGES};

/// Longest writer or page name.
pub const MAX_NAME_LEN: usize = 32;

/// A writer or page name.
pub type Name = String<MAX_NAME_LEN>;

/// Serialized display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Number of chips in the chain
    pub num_chips: u16,
    /// Direction the chain extends in
    pub chain_direction: ChainDirection,
    /// Hardware rows and columns are transposed
    pub row_column_swapped: bool,
    /// Hardware row order is mirrored
    pub reverse_rows: bool,
    /// Hardware column order is mirrored
    pub reverse_columns: bool,
    /// Initial brightness, 0 to 15; full brightness when absent
    pub intensity: Option<u8>,
    /// Refresh period in milliseconds
    pub update_interval_ms: u32,
    /// Name of the writer to draw with
    pub lambda: Option<Name>,
    /// Names of static pages to cycle through
    pub pages: Vec<Name, MAX_PAGES>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            num_chips: 1,
            chain_direction: ChainDirection::Left,
            row_column_swapped: false,
            reverse_rows: false,
            reverse_columns: false,
            intensity: None,
            update_interval_ms: 1000,
            lambda: None,
            pages: Vec::new(),
        }
    }
}

/// Where the canvas content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawSource {
    /// Direct drawing only
    Blank,
    /// The named writer
    Writer(Name),
    /// The named pages, in order
    Pages(Vec<Name, MAX_PAGES>),
}

/// Validated configuration, ready for
/// [`MatrixDisplay::from_settings`](crate::display::MatrixDisplay::from_settings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Chip topology
    pub topology: Topology,
    /// Initial intensity, if configured
    pub intensity: Option<u8>,
    /// Refresh period
    pub update_interval: Duration,
    /// Draw mode to bind
    pub draw: DrawSource,
}

impl DisplayConfig {
    /// Check every field and resolve the configuration.
    ///
    /// # Errors
    ///
    /// The first [`ConfigurationError`] found: chip count outside `1..=255`,
    /// intensity above 15, a zero update interval, or both a writer and pages.
    pub fn validate(&self) -> Result<Settings, ConfigurationError> {
        let orientation = Orientation {
            row_column_swapped: self.row_column_swapped,
            reverse_rows: self.reverse_rows,
            reverse_columns: self.reverse_columns,
        };
        let topology = Topology::new(
            usize::from(self.num_chips),
            self.chain_direction,
            orientation,
        )?;

        if self.intensity.is_some_and(|level| level > MAX_INTENSITY) {
            return Err(ConfigurationError::Intensity);
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigurationError::UpdateInterval);
        }

        let draw = match (&self.lambda, self.pages.is_empty()) {
            (Some(_), false) => return Err(ConfigurationError::ConflictingDrawModes),
            (Some(name), true) => DrawSource::Writer(name.clone()),
            (None, false) => DrawSource::Pages(self.pages.clone()),
            (None, true) => DrawSource::Blank,
        };

        Ok(Settings {
            topology,
            intensity: self.intensity,
            update_interval: Duration::from_millis(u64::from(self.update_interval_ms)),
            draw,
        })
    }
}

impl<'de> Deserialize<'de> for ChainDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectionVisitor;

        impl Visitor<'_> for DirectionVisitor {
            type Value = ChainDirection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("one of UP, DOWN, LEFT or RIGHT")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ChainDirection, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(DirectionVisitor)
    }
}
