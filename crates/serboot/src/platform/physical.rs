// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Direct access to the board's flat physical memory.

#![allow(unsafe_code)] // Raw memory access is the whole point of this module

use core::ptr::{read_volatile, write_volatile};

use serboot_abi::{Paddr, WordFormat, WordWidth};

use super::traits::MemorySpace;

/// The board's physical address space, starting at address 0.
///
/// Every access goes straight to the given address. Nothing is checked:
/// a bad packet address or a corrupted frame chain touches arbitrary
/// memory. Aligned words use a single volatile access, unaligned words
/// fall back to byte accesses in native order.
pub struct PhysicalMemory;

impl PhysicalMemory {
    /// Native layout of a word of the given width.
    const fn format(width: WordWidth) -> WordFormat {
        WordFormat::new(width, WordFormat::NATIVE.order)
    }
}

impl MemorySpace for PhysicalMemory {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "the store width selects the low bits of the word"
    )]
    fn write_word(&mut self, addr: Paddr, value: u64, width: WordWidth) {
        let ptr = addr.as_u64() as usize;
        // SAFETY: the caller owns the physical address space; see type docs
        unsafe {
            match (width, addr.is_aligned(width.bytes() as u64)) {
                (WordWidth::W32, Some(true)) => write_volatile(ptr as *mut u32, value as u32),
                (WordWidth::W64, Some(true)) => write_volatile(ptr as *mut u64, value),
                _ => {
                    let format = Self::format(width);
                    for pos in 0..width.bytes() {
                        write_volatile((ptr + pos) as *mut u8, format.byte_at(value, pos));
                    }
                }
            }
        }
    }

    fn read_word(&self, addr: Paddr, width: WordWidth) -> u64 {
        let ptr = addr.as_u64() as usize;
        // SAFETY: the caller owns the physical address space; see type docs
        unsafe {
            match (width, addr.is_aligned(width.bytes() as u64)) {
                (WordWidth::W32, Some(true)) => u64::from(read_volatile(ptr as *const u32)),
                (WordWidth::W64, Some(true)) => read_volatile(ptr as *const u64),
                _ => {
                    let format = Self::format(width);
                    (0..width.bytes()).fold(0, |word, pos| {
                        format.place(word, read_volatile((ptr + pos) as *const u8), pos)
                    })
                }
            }
        }
    }
}
