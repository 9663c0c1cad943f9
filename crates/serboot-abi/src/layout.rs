// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Board address layout.
//!
//! The boot monitor runs on a flat physical address space without an MMU.
//! It lives in a small boot region at the bottom of memory; downloaded
//! programs are placed above it by the sender.
//!
//! # Physical Layout
//!
//! ```text
//! 0x0000_0000  Boot region (monitor code, rodata, data)
//! 0x0000_1000  Program image (downloaded)
//!      ...     Program stack (grows down from STACK_CEILING)
//! 0x0010_0000  Stack ceiling
//! 0x8000_0000  UART data register
//! 0x8000_0004  UART status register
//! ```

use crate::types::Paddr;

/// One kilobyte in bytes.
const KB: u64 = 1024;

/// One megabyte in bytes.
const MB: u64 = 1024 * KB;

/// Base of the flat memory image written by the downloader.
pub const MEMORY_BASE: Paddr = Paddr::new(0);

/// Size of the boot region reserved for the monitor itself.
///
/// The sender never transmits segments placed at address 0.
pub const BOOT_REGION_SIZE: u64 = 4 * KB;

/// Highest address a valid stack frame may occupy.
///
/// The backtrace walker stops as soon as a frame pointer exceeds it.
pub const STACK_CEILING: Paddr = Paddr::new(MB);

/// UART data register. Reading pops the receive FIFO, writing pushes the
/// transmit FIFO.
pub const UART_DATA_ADDR: Paddr = Paddr::new(0x8000_0000);

/// UART status register.
pub const UART_STATUS_ADDR: Paddr = Paddr::new(0x8000_0004);

/// Status bit: receive FIFO holds at least one byte.
pub const UART_STATUS_RX_VALID: u32 = 1 << 0;

/// Status bit: transmit FIFO is full.
pub const UART_STATUS_TX_FULL: u32 = 1 << 1;

// Compile-time verification of the layout
const _: () = {
    assert!(MEMORY_BASE.as_u64() + BOOT_REGION_SIZE < STACK_CEILING.as_u64());
    assert!(STACK_CEILING.as_u64() < UART_DATA_ADDR.as_u64());
    assert!(UART_DATA_ADDR.as_u64() < UART_STATUS_ADDR.as_u64());
    assert!(UART_STATUS_RX_VALID & UART_STATUS_TX_FULL == 0);
};
