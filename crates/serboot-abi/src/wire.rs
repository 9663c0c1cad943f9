// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Packet framing for the serial download protocol.
//!
//! # Packet Layout
//!
//! ```text
//! +----------+-----------+-----------+-------------------+
//! | magic    | length    | address   | payload           |
//! | 4 bytes  | 1 word    | 1 word    | `length` bytes    |
//! +----------+-----------+-----------+-------------------+
//! ```
//!
//! The magic, length and address use the target byte order. The device
//! answers every packet with the complemented CRC32 of all bytes above,
//! sent as 4 bytes least-significant first on every target.
//!
//! A packet with `length == 0` carries no payload. Its address is the
//! entry point of the downloaded program and ends the transfer.

use core::mem::size_of;

/// Start-of-packet marker.
pub const MAGIC: u32 = 0x55AA_55AA;

/// Size of the start-of-packet marker in bytes.
pub const MAGIC_LEN: usize = 4;

/// Size of the checksum reply in bytes.
pub const ACK_LEN: usize = 4;

/// Length field value marking the entrypoint packet.
pub const ENTRY_PACKET_LEN: u64 = 0;

/// Largest payload the sender puts into a single packet.
pub const MAX_PACKET_LEN: usize = 1024;

/// Number of times the sender transmits a packet before giving up.
pub const MAX_SEND_TRIES: usize = 10;

/// Byte order of the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least-significant byte first.
    Little,
    /// Most-significant byte first.
    Big,
}

impl ByteOrder {
    /// Byte order of the machine this code is compiled for.
    pub const NATIVE: Self = if cfg!(target_endian = "big") {
        Self::Big
    } else {
        Self::Little
    };

    /// Returns a human-readable name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Little => "little endian",
            Self::Big => "big endian",
        }
    }
}

/// Width of a target machine word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WordWidth {
    /// 32-bit target.
    W32 = 4,
    /// 64-bit target.
    W64 = 8,
}

impl WordWidth {
    /// Word width of the machine this code is compiled for.
    pub const NATIVE: Self = if size_of::<usize>() == 8 {
        Self::W64
    } else {
        Self::W32
    };

    /// Number of bytes in a word.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Mask selecting the bits of a `u64` that fit into one word.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u64 {
        match self {
            Self::W32 => 0xFFFF_FFFF,
            Self::W64 => u64::MAX,
        }
    }

    /// Number of hex digits needed to print a full word.
    #[inline]
    #[must_use]
    pub const fn hex_digits(self) -> usize {
        self.bytes() * 2
    }
}

/// Layout of a target word on the wire and in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordFormat {
    /// Word width.
    pub width: WordWidth,
    /// Byte order.
    pub order: ByteOrder,
}

impl WordFormat {
    /// Word format of the machine this code is compiled for.
    pub const NATIVE: Self = Self::new(WordWidth::NATIVE, ByteOrder::NATIVE);

    /// Creates a word format.
    #[inline]
    #[must_use]
    pub const fn new(width: WordWidth, order: ByteOrder) -> Self {
        Self { width, order }
    }

    /// Number of bytes in a word.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        self.width.bytes()
    }

    /// Mask selecting the position of a byte index within a word.
    #[inline]
    #[must_use]
    pub const fn position_mask(self) -> u64 {
        (self.size() - 1) as u64
    }

    /// Bit shift of the byte at `pos` (0-based, wire order) within a word.
    ///
    /// `pos` must be smaller than [`Self::size`].
    #[inline]
    #[must_use]
    pub const fn shift(self, pos: usize) -> u32 {
        let lane = match self.order {
            ByteOrder::Little => pos,
            ByteOrder::Big => self.size() - 1 - pos,
        };
        (lane * 8) as u32
    }

    /// Merges `byte` into `word` at wire position `pos`.
    #[inline]
    #[must_use]
    pub const fn place(self, word: u64, byte: u8, pos: usize) -> u64 {
        word | ((byte as u64) << self.shift(pos))
    }

    /// Extracts the byte at wire position `pos` from `word`.
    #[inline]
    #[must_use]
    pub const fn byte_at(self, word: u64, pos: usize) -> u8 {
        ((word >> self.shift(pos)) & 0xFF) as u8
    }

    /// Writes `value` as one word in wire order into `out[..self.size()]`.
    ///
    /// Bits above the word width are dropped.
    pub fn encode(self, value: u64, out: &mut [u8]) {
        for (pos, slot) in out.iter_mut().take(self.size()).enumerate() {
            *slot = self.byte_at(value, pos);
        }
    }

    /// Reads one word in wire order from `bytes[..self.size()]`.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .take(self.size())
            .enumerate()
            .fold(0, |word, (pos, &byte)| self.place(word, byte, pos))
    }

    /// The start-of-packet marker as it appears on the wire.
    #[inline]
    #[must_use]
    pub const fn magic_bytes(self) -> [u8; MAGIC_LEN] {
        match self.order {
            ByteOrder::Little => MAGIC.to_le_bytes(),
            ByteOrder::Big => MAGIC.to_be_bytes(),
        }
    }

    /// Size of magic plus the two header words.
    #[inline]
    #[must_use]
    pub const fn header_len(self) -> usize {
        MAGIC_LEN + 2 * self.size()
    }
}

impl Default for WordFormat {
    fn default() -> Self {
        Self::NATIVE
    }
}

// Compile-time verification of the framing constants
const _: () = {
    assert!(WordWidth::W32.bytes() == 4);
    assert!(WordWidth::W64.bytes() == 8);
    assert!(MAGIC_LEN == size_of::<u32>());
    assert!(ACK_LEN == size_of::<u32>());
    assert!(MAX_PACKET_LEN > 0);
};

#[cfg(test)]
mod tests {
    use super::*;

    const LE32: WordFormat = WordFormat::new(WordWidth::W32, ByteOrder::Little);
    const BE32: WordFormat = WordFormat::new(WordWidth::W32, ByteOrder::Big);
    const LE64: WordFormat = WordFormat::new(WordWidth::W64, ByteOrder::Little);
    const BE64: WordFormat = WordFormat::new(WordWidth::W64, ByteOrder::Big);

    #[test]
    fn magic_wire_bytes_follow_byte_order() {
        assert_eq!(LE32.magic_bytes(), [0xAA, 0x55, 0xAA, 0x55]);
        assert_eq!(BE32.magic_bytes(), [0x55, 0xAA, 0x55, 0xAA]);
        // The marker is always four bytes, even on 64-bit targets
        assert_eq!(LE64.magic_bytes(), LE32.magic_bytes());
    }

    #[test]
    fn little_endian_shifts() {
        assert_eq!(LE32.shift(0), 0);
        assert_eq!(LE32.shift(3), 24);
        assert_eq!(LE64.shift(7), 56);
    }

    #[test]
    fn big_endian_shifts() {
        assert_eq!(BE32.shift(0), 24);
        assert_eq!(BE32.shift(3), 0);
        assert_eq!(BE64.shift(0), 56);
    }

    #[test]
    fn decode_assembles_words() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(LE32.decode(&bytes), 0x0403_0201);
        assert_eq!(BE32.decode(&bytes), 0x0102_0304);
        assert_eq!(LE64.decode(&bytes), 0x0807_0605_0403_0201);
        assert_eq!(BE64.decode(&bytes), 0x0102_0304_0506_0708);
    }

    #[test]
    fn decode_short_input_leaves_missing_bytes_zero() {
        assert_eq!(LE32.decode(&[0xAB, 0xCD]), 0x0000_CDAB);
        assert_eq!(BE32.decode(&[0xAB, 0xCD]), 0xABCD_0000);
    }

    #[test]
    fn encode_drops_bits_above_width() {
        let mut out = [0u8; 4];
        LE32.encode(0x1_2345_6789, &mut out);
        assert_eq!(out, [0x89, 0x67, 0x45, 0x23]);

        BE32.encode(0x1_2345_6789, &mut out);
        assert_eq!(out, [0x23, 0x45, 0x67, 0x89]);
    }

    #[test]
    fn header_len_depends_on_width() {
        assert_eq!(LE32.header_len(), 12);
        assert_eq!(BE64.header_len(), 20);
    }

    #[test]
    fn word_width_helpers() {
        assert_eq!(WordWidth::W32.mask(), 0xFFFF_FFFF);
        assert_eq!(WordWidth::W64.hex_digits(), 16);
        assert_eq!(LE64.position_mask(), 7);
    }

    #[test]
    fn native_format_matches_host() {
        assert_eq!(WordFormat::NATIVE.size(), size_of::<usize>());
        let decoded = WordFormat::NATIVE.decode(&1usize.to_ne_bytes());
        assert_eq!(decoded, 1);
    }
}
