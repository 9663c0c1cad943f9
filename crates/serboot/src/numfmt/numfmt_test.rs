// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for numeric formatting.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use proptest::prelude::*;
use std::format;

#[test]
fn ultoa_hex_with_padding() {
    let mut buf = [0u8; 16];
    assert_eq!(ultoa(255, &mut buf, 16, 4).unwrap(), "00FF");
}

#[test]
fn ultoa_binary_without_padding() {
    let mut buf = [0u8; 16];
    assert_eq!(ultoa(10, &mut buf, 2, 0).unwrap(), "1010");
}

#[test]
fn ultoa_zero_is_single_digit() {
    let mut buf = [0u8; 4];
    assert_eq!(ultoa(0, &mut buf, 10, 0).unwrap(), "0");
    assert_eq!(ultoa(0, &mut buf, 16, 3).unwrap(), "000");
}

#[test]
fn ultoa_padding_shorter_than_digits_is_ignored() {
    let mut buf = [0u8; 16];
    assert_eq!(ultoa(0x12345, &mut buf, 16, 2).unwrap(), "12345");
}

#[test]
fn ultoa_largest_base_uses_letters() {
    let mut buf = [0u8; 16];
    assert_eq!(ultoa(34, &mut buf, 35, 0).unwrap(), "Y");
    assert_eq!(ultoa(35, &mut buf, 35, 0).unwrap(), "10");
}

#[test]
fn ultoa_invalid_base_is_empty() {
    let mut buf = [0u8; 16];
    assert_eq!(ultoa(42, &mut buf, 1, 0).unwrap(), "");
    assert_eq!(ultoa(42, &mut buf, 36, 0).unwrap(), "");
    assert_eq!(ultoa(42, &mut buf, 0, 8).unwrap(), "");
}

#[test]
fn ultoa_full_width_binary() {
    let mut buf = [0u8; NUM_BUF_LEN];
    let text = ultoa(u64::MAX, &mut buf, 2, 0).unwrap();
    assert_eq!(text.len(), 64);
    assert!(text.bytes().all(|b| b == b'1'));
}

#[test]
fn ultoa_reports_small_buffer() {
    let mut buf = [0u8; 2];
    assert_eq!(ultoa(1000, &mut buf, 10, 0), Err(FormatError::BufferTooSmall));
    assert_eq!(ultoa(1, &mut buf, 10, 3), Err(FormatError::BufferTooSmall));
}

#[test]
fn sltoa_positive_matches_ultoa() {
    let mut buf = [0u8; 16];
    assert_eq!(sltoa(42, &mut buf, 10, 0).unwrap(), "42");
}

#[test]
fn sltoa_negative_keeps_magnitude() {
    // Regression: negatives must format their absolute value, not zero
    let mut buf = [0u8; 16];
    assert_eq!(sltoa(-42, &mut buf, 10, 0).unwrap(), "-42");
    assert_eq!(sltoa(-1, &mut buf, 16, 0).unwrap(), "-1");
    assert_eq!(sltoa(-255, &mut buf, 16, 4).unwrap(), "-00FF");
}

#[test]
fn sltoa_most_negative_value() {
    let mut buf = [0u8; NUM_BUF_LEN];
    assert_eq!(
        sltoa(i64::MIN, &mut buf, 10, 0).unwrap(),
        "-9223372036854775808"
    );
    let binary = sltoa(i64::MIN, &mut buf, 2, 0).unwrap();
    assert_eq!(binary.len(), 65);
}

#[test]
fn sltoa_reports_small_buffer() {
    let mut empty: [u8; 0] = [];
    assert_eq!(sltoa(-1, &mut empty, 10, 0), Err(FormatError::BufferTooSmall));
    let mut buf = [0u8; 2];
    assert_eq!(sltoa(-10, &mut buf, 10, 0), Err(FormatError::BufferTooSmall));
}

#[test]
fn num_buf_helpers() {
    let mut buf = NumBuf::new();
    assert_eq!(buf.hex(0x1000, 8), "00001000");
    assert_eq!(buf.decimal(1234), "1234");
    assert_eq!(buf.signed(-7, 10, 0), "-7");
}

#[test]
fn num_buf_caps_padding() {
    let mut buf = NumBuf::default();
    assert_eq!(buf.unsigned(1, 10, 500).len(), MAX_DIGITS);
    assert_eq!(buf.signed(-1, 10, 500).len(), MAX_DIGITS + 1);
}

#[test]
fn format_error_display() {
    assert_eq!(
        format!("{}", FormatError::BufferTooSmall),
        "buffer too small for formatted number"
    );
}

proptest! {
    #[test]
    fn ultoa_parses_back(value: u64, base in MIN_BASE..=MAX_BASE) {
        let mut buf = [0u8; NUM_BUF_LEN];
        let text = ultoa(value, &mut buf, base, 0).unwrap();
        prop_assert_eq!(u64::from_str_radix(text, base).unwrap(), value);
    }

    #[test]
    fn ultoa_hex_matches_core_fmt(value: u64, zero in 0usize..20) {
        let mut buf = [0u8; NUM_BUF_LEN];
        let expected = format!("{value:0zero$X}");
        prop_assert_eq!(ultoa(value, &mut buf, 16, zero).unwrap(), expected.as_str());
    }

    #[test]
    fn sltoa_decimal_matches_core_fmt(value: i64) {
        let mut buf = [0u8; NUM_BUF_LEN];
        let expected = format!("{value}");
        prop_assert_eq!(sltoa(value, &mut buf, 10, 0).unwrap(), expected.as_str());
    }
}
