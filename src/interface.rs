//! Transports that carry bursts to the chain.
//!
//! [`ChainInterface`] is the only thing the display needs from the bus. Two
//! `embedded-hal` implementations are provided:
//!
//! - [`SpiInterface`] owns an [`SpiBus`] and the chip-select pin outright, so
//!   nothing else can use the bus in the middle of a burst.
//! - [`DeviceInterface`] wraps an [`SpiDevice`], for buses shared through
//!   something like `embedded-hal-bus`. Every latch is one transaction, and
//!   the device implementation drives chip select. A burst is *not*
//!   exclusive on this transport: other devices on the bus may run between
//!   two latches. The chips keep their registers in the meantime, so the
//!   frame still arrives whole.
//!
//! Both always release chip select after a latch, including when the bus
//! reports an error part way through.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiBus, SpiDevice};
use heapless::Vec;

use crate::command::{Burst, Latch, Packet};

/// A transport that can send a burst of latches to the chain.
pub trait ChainInterface {
    /// Transport error.
    type Error: fmt::Debug;

    /// Send every latch of `burst`, in order.
    ///
    /// # Errors
    ///
    /// Any bus failure. The transport must leave the bus released.
    fn write_burst<const N: usize>(&mut self, burst: &Burst<'_, N>) -> Result<(), Self::Error>;
}

impl<T: ChainInterface> ChainInterface for &mut T {
    type Error = T::Error;

    fn write_burst<const N: usize>(&mut self, burst: &Burst<'_, N>) -> Result<(), Self::Error> {
        (**self).write_burst(burst)
    }
}

/// Errors from [`SpiInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError<S, P> {
    /// The SPI bus failed
    Spi(S),
    /// The chip-select pin failed
    Pin(P),
}

impl<S: fmt::Debug, P: fmt::Debug> fmt::Display for SpiError<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI bus error: {e:?}"),
            Self::Pin(e) => write!(f, "chip select error: {e:?}"),
        }
    }
}

impl<S: fmt::Debug, P: fmt::Debug> core::error::Error for SpiError<S, P> {}

/// Chain on an SPI bus owned by the driver, with a dedicated chip-select
/// (LOAD) pin.
///
/// The bus must be configured for mode 0, MSB first, at 10 MHz or less.
#[derive(Debug)]
pub struct SpiInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Take ownership of the bus and chip-select pin.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Give the bus and pin back.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn shift<const N: usize>(&mut self, latch: &Latch<'_, N>) -> Result<(), SPI::Error> {
        for packet in latch.shift_order() {
            self.spi.write(&packet.to_bytes())?;
        }
        // every bit must be out before the strobe
        self.spi.flush()
    }
}

impl<SPI, CS> ChainInterface for SpiInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = SpiError<SPI::Error, CS::Error>;

    fn write_burst<const N: usize>(&mut self, burst: &Burst<'_, N>) -> Result<(), Self::Error> {
        for latch in burst.latches() {
            self.cs.set_low().map_err(SpiError::Pin)?;
            let shifted = self.shift(&latch).map_err(SpiError::Spi);
            let released = self.cs.set_high().map_err(SpiError::Pin);
            shifted?;
            released?;
        }
        Ok(())
    }
}

/// Chain behind an [`SpiDevice`], which manages chip select itself.
///
/// Each latch is its own transaction, so the bus can be taken by another
/// device between latches of a burst. Use [`SpiInterface`] when the burst
/// must hold the bus throughout. Operations for one latch are collected on
/// the stack; a [`Burst`] never carries more than `N` chips.
#[derive(Debug)]
pub struct DeviceInterface<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> DeviceInterface<SPI> {
    /// Wrap an SPI device.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give the device back.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> ChainInterface for DeviceInterface<SPI> {
    type Error = SPI::Error;

    fn write_burst<const N: usize>(&mut self, burst: &Burst<'_, N>) -> Result<(), Self::Error> {
        for latch in burst.latches() {
            let words: Vec<[u8; 2], N> = latch.shift_order().map(Packet::to_bytes).collect();
            let mut operations: Vec<Operation<'_, u8>, N> = words
                .iter()
                .map(|word| Operation::Write(word.as_slice()))
                .collect();
            self.spi.transaction(&mut operations)?;
        }
        Ok(())
    }
}
