// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock platform implementation for testing.
//!
//! This module provides a mock memory image backed by a heap-allocated
//! buffer, allowing the download engine and the backtrace walker to be
//! tested without a board.

#![allow(clippy::panic)] // Test infrastructure - panicking on invalid input is correct

use serboot_abi::{ByteOrder, Paddr, WordFormat, WordWidth};

use crate::platform::traits::MemorySpace;

use std::boxed::Box;
use std::vec;
use std::vec::Vec;

/// One recorded word store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordWrite {
    /// Destination address.
    pub addr: Paddr,
    /// Stored value.
    pub value: u64,
    /// Store width.
    pub width: WordWidth,
}

/// A mock memory image backed by a heap-allocated buffer.
///
/// The mock simulates a contiguous region of memory starting at a
/// configurable base address, stores words in a configurable byte order,
/// and records every word store in order so tests can assert on them.
pub struct MockMemory {
    memory: Box<[u8]>,
    base: Paddr,
    order: ByteOrder,
    writes: Vec<WordWrite>,
}

impl MockMemory {
    /// Create a new mock memory with the given size, base address and byte order.
    #[must_use]
    pub fn new(size: usize, base: Paddr, order: ByteOrder) -> Self {
        Self {
            memory: vec![0u8; size].into_boxed_slice(),
            base,
            order,
            writes: Vec::new(),
        }
    }

    /// Create a new mock memory using the host byte order.
    #[must_use]
    pub fn native(size: usize, base: Paddr) -> Self {
        Self::new(size, base, ByteOrder::NATIVE)
    }

    /// Get the base address of this memory.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> Paddr {
        self.base
    }

    /// Get the size of this memory in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.memory.len()
    }

    /// Get the end address (exclusive) of this memory.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Paddr {
        self.base.add(self.memory.len() as u64)
    }

    /// Check if an address is within this memory.
    #[inline]
    #[must_use]
    pub fn contains(&self, addr: Paddr) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// Every word store performed so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[WordWrite] {
        &self.writes
    }

    /// Forget the recorded word stores.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Get `len` bytes starting at `addr`.
    #[must_use]
    pub fn bytes(&self, addr: Paddr, len: usize) -> &[u8] {
        let offset = self.checked_range(addr, len);
        &self.memory[offset..offset + len]
    }

    /// Convert an address to an offset, asserting `len` bytes fit.
    fn checked_range(&self, addr: Paddr, len: usize) -> usize {
        assert!(
            addr >= self.base,
            "address {addr} is below base {}",
            self.base
        );
        let offset = addr.diff(self.base);
        let offset_usize = usize::try_from(offset)
            .unwrap_or_else(|_| panic!("address {addr} exceeds usize::MAX on this platform"));
        assert!(
            offset_usize
                .checked_add(len)
                .is_some_and(|end| end <= self.memory.len()),
            "access of {len} bytes at {addr} would exceed memory end {}",
            self.end()
        );
        offset_usize
    }
}

impl MemorySpace for MockMemory {
    fn write_word(&mut self, addr: Paddr, value: u64, width: WordWidth) {
        let len = width.bytes();
        let offset = self.checked_range(addr, len);
        WordFormat::new(width, self.order).encode(value, &mut self.memory[offset..offset + len]);
        self.writes.push(WordWrite {
            addr,
            value: value & width.mask(),
            width,
        });
    }

    fn read_word(&self, addr: Paddr, width: WordWidth) -> u64 {
        let len = width.bytes();
        let offset = self.checked_range(addr, len);
        WordFormat::new(width, self.order).decode(&self.memory[offset..offset + len])
    }
}
