//! Error types.

use core::fmt;

/// Configuration rejected before the display ever runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Chip count outside `1..=255` or above the display's capacity
    ChipCount,
    /// Intensity above 15
    Intensity,
    /// Both a writer and static pages were configured
    ConflictingDrawModes,
    /// More pages than the display can hold, or a page index out of range
    PageCount,
    /// A page was sized for a different chain than the display
    PageTopology,
    /// Update interval of zero
    UpdateInterval,
    /// Unknown chain direction name
    ChainDirection,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChipCount => f.write_str("chip count must be between 1 and 255"),
            Self::Intensity => f.write_str("intensity must be between 0 and 15"),
            Self::ConflictingDrawModes => {
                f.write_str("a writer and static pages cannot both be configured")
            }
            Self::PageCount => f.write_str("page count or page index out of range"),
            Self::PageTopology => f.write_str("page was built for a different chain"),
            Self::UpdateInterval => f.write_str("update interval must be greater than zero"),
            Self::ChainDirection => f.write_str("chain direction must be UP, DOWN, LEFT or RIGHT"),
        }
    }
}

impl core::error::Error for ConfigurationError {}

/// Errors returned by operations that talk to the chain directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport failed
    Transport(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
