// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Packet framing.
//!
//! A packet is the start-of-packet marker, two header words (payload length
//! and load address) and the payload, all in the target's word format. A
//! packet with length zero carries the entry point and ends the transfer.

use serboot_abi::crc32;
use serboot_abi::wire::ENTRY_PACKET_LEN;
use serboot_abi::WordFormat;

/// Appends one framed packet to `out`.
///
/// Header values wider than the target word are truncated; callers check
/// addresses against [`fits`] first.
pub fn encode_packet(format: WordFormat, address: u64, payload: &[u8], out: &mut Vec<u8>) {
    out.reserve(format.header_len() + payload.len());
    out.extend_from_slice(&format.magic_bytes());
    push_word(format, payload.len() as u64, out);
    push_word(format, address, out);
    out.extend_from_slice(payload);
}

/// Returns the packet that tells the board to jump to `entry`.
#[must_use]
pub fn entry_packet(format: WordFormat, entry: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(format.header_len());
    out.extend_from_slice(&format.magic_bytes());
    push_word(format, ENTRY_PACKET_LEN, &mut out);
    push_word(format, entry, &mut out);
    out
}

/// The acknowledgment the board sends for a correctly received `frame`.
#[must_use]
pub fn expected_ack(frame: &[u8]) -> u32 {
    crc32::checksum(frame)
}

/// Returns true if `value` is representable as a target word.
#[must_use]
pub const fn fits(format: WordFormat, value: u64) -> bool {
    value & !format.width.mask() == 0
}

fn push_word(format: WordFormat, value: u64, out: &mut Vec<u8>) {
    let mut word = [0u8; 8];
    format.encode(value, &mut word);
    out.extend_from_slice(&word[..format.size()]);
}
