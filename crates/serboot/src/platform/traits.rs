// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform abstraction traits.

use serboot_abi::{Paddr, WordWidth};

/// Word-granular access to the flat physical address space.
///
/// Implementations perform no ownership or bounds checks on behalf of the
/// caller: the download engine writes wherever the sender asks, and the
/// backtrace walker reads wherever the frame chain points. A word value is
/// carried in a `u64` and stored in the implementation's byte order.
pub trait MemorySpace {
    /// Store the low `width` bytes of `value` at `addr`.
    fn write_word(&mut self, addr: Paddr, value: u64, width: WordWidth);

    /// Load one word from `addr`, zero-extended to `u64`.
    fn read_word(&self, addr: Paddr, width: WordWidth) -> u64;
}
