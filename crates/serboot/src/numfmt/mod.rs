// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Integer to text conversion into caller-provided buffers.
//!
//! The trap handler cannot use `core::fmt` machinery from its tiny boot
//! region, so it formats numbers digit by digit. Digits above 9 are
//! uppercase letters. Supported bases are 2 through 35; any other base
//! yields an empty string.

#[cfg(test)]
mod numfmt_test;

use core::fmt;

/// Smallest supported base.
pub const MIN_BASE: u32 = 2;

/// Largest supported base.
pub const MAX_BASE: u32 = 35;

/// Most digits a `u64` can need (base 2).
pub const MAX_DIGITS: usize = 64;

/// Buffer size that fits any formatted `u64` or `i64` including the sign.
pub const NUM_BUF_LEN: usize = MAX_DIGITS + 1;

/// Errors that can occur while formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The caller buffer cannot hold the digits, padding and sign.
    BufferTooSmall,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small for formatted number"),
        }
    }
}

/// Returns the ASCII character for a single digit.
const fn digit_char(digit: u8) -> u8 {
    if digit < 10 {
        b'0' + digit
    } else {
        b'A' + (digit - 10)
    }
}

/// Returns true if `base` is supported.
#[inline]
#[must_use]
pub const fn is_valid_base(base: u32) -> bool {
    base >= MIN_BASE && base <= MAX_BASE
}

/// Views ASCII digits as a string.
fn as_str(bytes: &[u8]) -> &str {
    core::str::from_utf8(bytes).unwrap_or_default()
}

/// Formats `value` in `base`, left-padded with zeros to at least `zero` digits.
///
/// Digits are produced least-significant first, padded, then reversed in
/// place. Returns the formatted text, which borrows the front of `buf`.
///
/// # Errors
///
/// Returns [`FormatError::BufferTooSmall`] if `buf` cannot hold the result.
pub fn ultoa(value: u64, buf: &mut [u8], base: u32, zero: usize) -> Result<&str, FormatError> {
    if !is_valid_base(base) {
        return Ok("");
    }
    let base = u64::from(base);
    let mut remaining = value;
    let mut len = 0;

    loop {
        #[allow(clippy::cast_possible_truncation, reason = "digit is below base <= 35")]
        let digit = (remaining % base) as u8;
        *buf.get_mut(len).ok_or(FormatError::BufferTooSmall)? = digit_char(digit);
        len += 1;
        remaining /= base;
        if remaining == 0 {
            break;
        }
    }

    while len < zero {
        *buf.get_mut(len).ok_or(FormatError::BufferTooSmall)? = b'0';
        len += 1;
    }

    buf[..len].reverse();
    Ok(as_str(&buf[..len]))
}

/// Formats a signed `value` in `base`, with a leading `-` for negatives.
///
/// Padding applies to the digits only, so `-5` padded to 3 is `-005`.
///
/// # Errors
///
/// Returns [`FormatError::BufferTooSmall`] if `buf` cannot hold the result.
pub fn sltoa(value: i64, buf: &mut [u8], base: u32, zero: usize) -> Result<&str, FormatError> {
    if value >= 0 || !is_valid_base(base) {
        return ultoa(value.unsigned_abs(), buf, base, zero);
    }
    let (sign, digits) = buf
        .split_first_mut()
        .ok_or(FormatError::BufferTooSmall)?;
    *sign = b'-';
    let len = ultoa(value.unsigned_abs(), digits, base, zero)?.len();
    Ok(as_str(&buf[..=len]))
}

/// Stack buffer large enough for any formatted 64-bit integer.
///
/// Its methods cannot fail: padding is capped at [`MAX_DIGITS`].
pub struct NumBuf {
    bytes: [u8; NUM_BUF_LEN],
}

impl NumBuf {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; NUM_BUF_LEN],
        }
    }

    /// Formats an unsigned value.
    pub fn unsigned(&mut self, value: u64, base: u32, zero: usize) -> &str {
        ultoa(value, &mut self.bytes, base, zero.min(MAX_DIGITS)).unwrap_or_default()
    }

    /// Formats a signed value.
    pub fn signed(&mut self, value: i64, base: u32, zero: usize) -> &str {
        sltoa(value, &mut self.bytes, base, zero.min(MAX_DIGITS)).unwrap_or_default()
    }

    /// Formats an unsigned value as uppercase hex padded to `digits`.
    pub fn hex(&mut self, value: u64, digits: usize) -> &str {
        self.unsigned(value, 16, digits)
    }

    /// Formats an unsigned value in decimal.
    pub fn decimal(&mut self, value: u64) -> &str {
        self.unsigned(value, 10, 0)
    }
}

impl Default for NumBuf {
    fn default() -> Self {
        Self::new()
    }
}
