// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! UART abstraction for the boot monitor.
//!
//! Provides a trait-based interface for UART communication, allowing
//! both the board driver and a scripted serial line for host tests.
//! The same UART carries the download protocol and the diagnostic text.


#[cfg(any(test, feature = "std"))]
mod mock;
#[cfg(feature = "board")]
mod mmio;

#[cfg(feature = "board")]
pub use mmio::{MmioUart, init};
#[cfg(any(test, feature = "std"))]
pub use mock::{LinkStalled, MockUart, until_stalled};

/// UART interface for byte-level I/O.
pub trait Uart {
    /// Write a single byte. Blocks until the transmit FIFO has space.
    fn write_byte(&mut self, byte: u8);

    /// Read a single byte. Blocks until data is available, with no timeout.
    fn read_byte(&mut self) -> u8;

    /// Check if data is available to read.
    fn can_read(&self) -> bool;

    /// Check if the transmit buffer has space.
    fn can_write(&self) -> bool;
}

/// Extension trait providing higher-level string operations.
pub trait UartExt: Uart {
    /// Write raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Write a string.
    fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Write a string followed by a newline.
    fn write_line(&mut self, s: &str) {
        self.write_str(s);
        self.write_byte(b'\n');
    }
}

// Blanket implementation for all Uart types
impl<T: Uart + ?Sized> UartExt for T {}
