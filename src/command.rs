//! Command framing for a chain of MAX7219/MAX7221 chips.
//!
//! Every chip takes 16-bit packets: the register address in bits 11-8 and
//! the data in bits 7-0, shifted in MSB first. Chips pass what falls out of
//! their shift register on to the next chip, so one packet per chip is shifted
//! through the chain and all of them are applied together on the rising edge
//! of chip select. That one strobe is a [`Latch`].
//!
//! Chips are numbered in shift order: chip 0's packet goes out first and so
//! ends up in the chip farthest from the controller.
//!
//! A [`Burst`] is everything one operation sends: optional broadcast
//! commands, the eight row latches of a [`PhysicalFrame`], and more broadcast
//! commands. It borrows its data, so building one never allocates.

use bitfield::bitfield;

use crate::transform::PhysicalFrame;
use crate::ROWS_PER_CHIP;

/// Chip register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// No-op, used to skip a chip
    Noop = 0x00,
    /// Row 0
    Digit0 = 0x01,
    /// Row 1
    Digit1 = 0x02,
    /// Row 2
    Digit2 = 0x03,
    /// Row 3
    Digit3 = 0x04,
    /// Row 4
    Digit4 = 0x05,
    /// Row 5
    Digit5 = 0x06,
    /// Row 6
    Digit6 = 0x07,
    /// Row 7
    Digit7 = 0x08,
    /// BCD decode per digit; 0 for raw matrix data
    DecodeMode = 0x09,
    /// Brightness, 0 (min) to 15 (max)
    Intensity = 0x0A,
    /// Number of scanned digits minus one
    ScanLimit = 0x0B,
    /// 0 shuts the chip down, 1 is normal operation
    Shutdown = 0x0C,
    /// 1 lights every LED
    DisplayTest = 0x0F,
}

impl Register {
    const DIGITS: [Self; ROWS_PER_CHIP] = [
        Self::Digit0,
        Self::Digit1,
        Self::Digit2,
        Self::Digit3,
        Self::Digit4,
        Self::Digit5,
        Self::Digit6,
        Self::Digit7,
    ];

    /// Register holding hardware row `row` (0..8).
    #[must_use]
    pub const fn digit(row: usize) -> Self {
        Self::DIGITS[row]
    }

    /// Register address.
    #[must_use]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

bitfield! {
    /// One 16-bit word shifted into a chip.
    ///
    /// The bit layout is as follows:
    /// - Bits 15-12: don't care
    /// - Bits 11-8: Register address
    /// - Bits 7-0: Data
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Packet(u16);
    impl Debug;
    pub u8, register, set_register: 11, 8;
    pub u8, data, set_data: 7, 0;
}

impl Packet {
    /// Packet writing `data` to `register`.
    #[must_use]
    pub fn new(register: Register, data: u8) -> Self {
        let mut packet = Self(0);
        packet.set_register(register.addr());
        packet.set_data(data);
        packet
    }

    /// Wire bytes, register first.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Packet {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Packet({=u8:#x}, {=u8:#x})", self.register(), self.data());
    }
}

/// The same register and value sent to every chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// Register to write
    pub register: Register,
    /// Value written to every chip
    pub value: u8,
}

impl Command {
    /// Broadcast `value` to `register`.
    #[must_use]
    pub const fn new(register: Register, value: u8) -> Self {
        Self { register, value }
    }
}

#[derive(Debug, Clone, Copy)]
enum Source<'a, const N: usize> {
    Broadcast(u8),
    Row(&'a PhysicalFrame<N>, usize),
}

/// One strobe of chip select: a packet for every chip in the chain, all
/// targeting the same register.
#[derive(Debug, Clone, Copy)]
pub struct Latch<'a, const N: usize> {
    register: Register,
    chip_count: usize,
    source: Source<'a, N>,
}

impl<'a, const N: usize> Latch<'a, N> {
    /// Register every chip receives.
    #[must_use]
    pub fn register(&self) -> Register {
        self.register
    }

    /// Number of packets in the latch.
    #[must_use]
    pub fn chip_count(&self) -> usize {
        self.chip_count
    }

    /// Data byte for `chip`.
    #[must_use]
    pub fn data(&self, chip: usize) -> u8 {
        match self.source {
            Source::Broadcast(value) => value,
            Source::Row(frame, row) => frame.row(chip, row),
        }
    }

    /// Packet addressed to `chip`.
    #[must_use]
    pub fn packet(&self, chip: usize) -> Packet {
        Packet::new(self.register, self.data(chip))
    }

    /// Packets in chip order, chip 0 first.
    pub fn packets(&self) -> impl DoubleEndedIterator<Item = Packet> + 'a {
        let latch = *self;
        (0..self.chip_count).map(move |chip| latch.packet(chip))
    }

    /// Packets in the order they must be shifted out. Chip 0 goes first, so
    /// its packet travels to the far end of the chain.
    pub fn shift_order(&self) -> impl Iterator<Item = Packet> + 'a {
        self.packets()
    }
}

/// Every latch of one bus transaction, in send order.
#[derive(Debug, Clone, Copy)]
pub struct Burst<'a, const N: usize> {
    chip_count: usize,
    before: &'a [Command],
    frame: Option<&'a PhysicalFrame<N>>,
    after: &'a [Command],
}

impl<'a, const N: usize> Burst<'a, N> {
    /// Empty burst for a chain of `chip_count` chips, capped at `N`.
    #[must_use]
    pub const fn new(chip_count: usize) -> Self {
        Self {
            chip_count: if chip_count > N { N } else { chip_count },
            before: &[],
            frame: None,
            after: &[],
        }
    }

    /// Broadcast commands sent before the frame.
    #[must_use]
    pub const fn with_commands(mut self, commands: &'a [Command]) -> Self {
        self.before = commands;
        self
    }

    /// Row data for every chip. The chip count becomes the frame's.
    #[must_use]
    pub fn with_frame(mut self, frame: &'a PhysicalFrame<N>) -> Self {
        self.chip_count = frame.chip_count();
        self.frame = Some(frame);
        self
    }

    /// Broadcast commands sent after the frame.
    #[must_use]
    pub const fn with_trailer(mut self, commands: &'a [Command]) -> Self {
        self.after = commands;
        self
    }

    /// Number of chips every latch addresses.
    #[must_use]
    pub const fn chip_count(&self) -> usize {
        self.chip_count
    }

    /// Number of latches in the burst.
    #[must_use]
    pub fn len(&self) -> usize {
        let rows = if self.frame.is_some() { ROWS_PER_CHIP } else { 0 };
        self.before.len() + rows + self.after.len()
    }

    /// `true` when the burst sends nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latches in send order.
    pub fn latches(&self) -> impl Iterator<Item = Latch<'a, N>> + 'a {
        let Self {
            chip_count,
            before,
            frame,
            after,
        } = *self;
        let broadcast = move |command: &Command| Latch {
            register: command.register,
            chip_count,
            source: Source::Broadcast(command.value),
        };
        let rows = frame.into_iter().flat_map(move |frame| {
            (0..ROWS_PER_CHIP).map(move |row| Latch {
                register: Register::digit(row),
                chip_count,
                source: Source::Row(frame, row),
            })
        });
        before
            .iter()
            .map(broadcast)
            .chain(rows)
            .chain(after.iter().map(broadcast))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;
    use std::vec::Vec;

    use embedded_graphics::prelude::Point;

    use super::*;
    use crate::canvas::Canvas;
    use crate::chain::{ChainDirection, Orientation, Topology};

    #[test]
    fn test_register_addresses() {
        assert_eq!(Register::Noop.addr(), 0x00);
        assert_eq!(Register::digit(0).addr(), 0x01);
        assert_eq!(Register::digit(7).addr(), 0x08);
        assert_eq!(Register::DecodeMode.addr(), 0x09);
        assert_eq!(Register::Intensity.addr(), 0x0A);
        assert_eq!(Register::ScanLimit.addr(), 0x0B);
        assert_eq!(Register::Shutdown.addr(), 0x0C);
        assert_eq!(Register::DisplayTest.addr(), 0x0F);
    }

    #[test]
    fn test_packet_layout() {
        let packet = Packet::new(Register::Intensity, 0x0F);
        assert_eq!(packet.0, 0x0A0F);
        assert_eq!(packet.register(), 0x0A);
        assert_eq!(packet.data(), 0x0F);
        assert_eq!(packet.to_bytes(), [0x0A, 0x0F]);
    }

    #[test]
    fn test_packet_field_isolation() {
        let mut packet = Packet::default();
        packet.set_data(0xFF);
        packet.set_register(0x0C);
        assert_eq!(packet.data(), 0xFF);
        assert_eq!(packet.register(), 0x0C);
        assert_eq!(packet.0 & 0xF000, 0);
    }

    #[test]
    fn test_packet_debug() {
        let debug = format!("{:?}", Packet::new(Register::Digit0, 0x81));
        assert!(debug.contains("register: 1"));
        assert!(debug.contains("data: 129"));
    }

    #[test]
    fn test_empty_burst() {
        let burst = Burst::<4>::new(4);
        assert!(burst.is_empty());
        assert_eq!(burst.latches().count(), 0);
    }

    #[test]
    fn test_broadcast_latches() {
        let commands = [
            Command::new(Register::ScanLimit, 7),
            Command::new(Register::Intensity, 3),
        ];
        let burst = Burst::<4>::new(3).with_commands(&commands);
        let latches: Vec<_> = burst.latches().collect();
        assert_eq!(latches.len(), 2);
        assert_eq!(latches[0].register(), Register::ScanLimit);
        assert_eq!(latches[1].chip_count(), 3);
        let packets: Vec<_> = latches[1].packets().collect();
        assert_eq!(packets, std::vec![Packet::new(Register::Intensity, 3); 3]);
    }

    #[test]
    fn test_frame_latches_in_row_order() {
        let topology = Topology::new(2, ChainDirection::Left, Orientation::default()).unwrap();
        let mut canvas = Canvas::<2>::new(&topology).unwrap();
        canvas.set_pixel(Point::new(8, 5), true);
        let frame = PhysicalFrame::render(&canvas);

        let trailer = [Command::new(Register::Shutdown, 1)];
        let burst = Burst::new(2).with_frame(&frame).with_trailer(&trailer);
        assert_eq!(burst.len(), 9);

        let latches: Vec<_> = burst.latches().collect();
        for (row, latch) in latches[..8].iter().enumerate() {
            assert_eq!(latch.register(), Register::digit(row));
        }
        assert_eq!(latches[5].data(0), 0x00);
        assert_eq!(latches[5].data(1), 0x01);
        assert_eq!(latches[8].register(), Register::Shutdown);
    }

    #[test]
    fn test_shift_order_starts_with_chip_zero() {
        let topology = Topology::new(3, ChainDirection::Left, Orientation::default()).unwrap();
        let mut canvas = Canvas::<3>::new(&topology).unwrap();
        canvas.set_pixel(Point::new(0, 0), true);
        let frame = PhysicalFrame::render(&canvas);
        let burst = Burst::new(3).with_frame(&frame);

        let first = burst.latches().next().unwrap();
        let wire: Vec<_> = first.shift_order().map(|p| p.data()).collect();
        assert_eq!(wire, std::vec![0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_burst_chip_count_capped_at_capacity() {
        let commands = [Command::new(Register::Shutdown, 1)];
        let burst = Burst::<2>::new(5).with_commands(&commands);
        assert_eq!(burst.chip_count(), 2);
        assert_eq!(burst.latches().next().unwrap().packets().count(), 2);
    }

    #[test]
    fn test_burst_chip_count_follows_frame() {
        let topology = Topology::new(2, ChainDirection::Left, Orientation::default()).unwrap();
        let canvas = Canvas::<4>::new(&topology).unwrap();
        let frame = PhysicalFrame::render(&canvas);

        // a larger count must not index past the frame
        let burst = Burst::new(4).with_frame(&frame);
        assert_eq!(burst.chip_count(), 2);
        for latch in burst.latches() {
            assert_eq!(latch.packets().count(), 2);
        }
    }
}
