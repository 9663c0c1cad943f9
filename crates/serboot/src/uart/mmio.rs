// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Memory-mapped board UART driver.
//!
//! The board UART exposes two 32-bit registers: a data register that pops
//! the receive FIFO on read and pushes the transmit FIFO on write, and a
//! status register with "receive valid" and "transmit full" bits. The
//! register addresses are passed to [`init`] once at boot.

#![allow(unsafe_code)] // UART I/O requires unsafe MMIO access

use core::cell::UnsafeCell;
use core::ptr::{read_volatile, write_volatile};

use serboot_abi::Paddr;
use serboot_abi::layout::{UART_STATUS_RX_VALID, UART_STATUS_TX_FULL};

use super::Uart;

/// Register pointers of an initialised UART.
struct MmioInner {
    /// Data register.
    data: *mut u32,
    /// Status register.
    status: *const u32,
}

impl MmioInner {
    /// Read the status register.
    fn status(&self) -> u32 {
        // SAFETY: status points to the mapped status register after init
        unsafe { read_volatile(self.status) }
    }

    /// Check if the transmit FIFO has space.
    fn can_write(&self) -> bool {
        self.status() & UART_STATUS_TX_FULL == 0
    }

    /// Check if the receive FIFO holds data.
    fn can_read(&self) -> bool {
        self.status() & UART_STATUS_RX_VALID != 0
    }

    /// Spin until the transmit FIFO has space, then push `byte`.
    fn write_byte(&self, byte: u8) {
        while !self.can_write() {
            core::hint::spin_loop();
        }
        // SAFETY: data points to the mapped data register after init
        unsafe { write_volatile(self.data, u32::from(byte)) }
    }

    /// Spin until the receive FIFO holds data, then pop one byte.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "intentional u8 extraction from 32-bit UART data register"
    )]
    fn read_byte(&self) -> u8 {
        while !self.can_read() {
            core::hint::spin_loop();
        }
        // SAFETY: data points to the mapped data register after init
        let value = unsafe { read_volatile(self.data) };
        value as u8
    }
}

/// Global UART driver state.
struct UartDriver {
    inner: UnsafeCell<Option<MmioInner>>,
}

// SAFETY: The boot monitor has exactly one hardware thread.
unsafe impl Sync for UartDriver {}

static UART_DRIVER: UartDriver = UartDriver {
    inner: UnsafeCell::new(None),
};

/// Initialize the global UART driver with its register addresses.
///
/// Must be called before using `MmioUart`.
///
/// # Safety
///
/// - `data` and `status` must be the board's UART registers
/// - Must be called in single-threaded context, before traps are enabled
pub unsafe fn init(data: Paddr, status: Paddr) {
    let inner = MmioInner {
        data: data.as_u64() as usize as *mut u32,
        status: status.as_u64() as usize as *const u32,
    };
    // SAFETY: Single-threaded initialization
    unsafe {
        *UART_DRIVER.inner.get() = Some(inner);
    }
}

/// Board UART handle.
///
/// This is a zero-sized type that provides access to the global UART driver.
/// The download engine and the trap handler each create their own handle.
pub struct MmioUart;

impl MmioUart {
    /// Create a new UART handle.
    ///
    /// The global driver must be initialized with `init()` first.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Get a reference to the initialized driver.
    fn driver(&self) -> Option<&MmioInner> {
        // SAFETY: Single-threaded access
        unsafe { (*UART_DRIVER.inner.get()).as_ref() }
    }
}

impl Default for MmioUart {
    fn default() -> Self {
        Self::new()
    }
}

impl Uart for MmioUart {
    fn write_byte(&mut self, byte: u8) {
        if let Some(inner) = self.driver() {
            inner.write_byte(byte);
        }
    }

    fn read_byte(&mut self) -> u8 {
        self.driver().map_or(0, MmioInner::read_byte)
    }

    fn can_read(&self) -> bool {
        self.driver().is_some_and(MmioInner::can_read)
    }

    fn can_write(&self) -> bool {
        self.driver().is_some_and(MmioInner::can_write)
    }
}
