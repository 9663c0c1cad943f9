// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Bitwise CRC-32 (ISO-HDLC, the checksum used by zlib).
//!
//! The device and the sender both run this over every packet, so it must
//! match the standard algorithm bit for bit. The device has no room for a
//! lookup table in its boot region, hence the bit-at-a-time form.

/// Reversed CRC-32 polynomial.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Accumulator value at the start of every packet.
pub const INITIAL: u32 = 0xFFFF_FFFF;

/// Feeds one byte into a raw accumulator.
#[inline]
#[must_use]
pub const fn update(state: u32, byte: u8) -> u32 {
    let mut crc = state ^ (byte as u32);
    let mut bit = 0;
    while bit < 8 {
        crc = if crc & 1 != 0 {
            (crc >> 1) ^ POLYNOMIAL
        } else {
            crc >> 1
        };
        bit += 1;
    }
    crc
}

/// Computes the finished checksum of `bytes`.
#[must_use]
pub const fn checksum(bytes: &[u8]) -> u32 {
    let mut state = INITIAL;
    let mut index = 0;
    while index < bytes.len() {
        state = update(state, bytes[index]);
        index += 1;
    }
    !state
}

/// Running CRC-32 over a byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    /// Creates an accumulator in its initial all-ones state.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { state: INITIAL }
    }

    /// Feeds one byte.
    #[inline]
    pub const fn update(&mut self, byte: u8) {
        self.state = update(self.state, byte);
    }

    /// Feeds a slice of bytes.
    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    /// Returns the raw accumulator.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Returns the finished checksum (complement of the accumulator).
    #[inline]
    #[must_use]
    pub const fn finalize(self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

// The standard check value for CRC-32/ISO-HDLC
const _: () = assert!(checksum(b"123456789") == 0xCBF4_3926);
