// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Boot monitor loop.
//!
//! Downloads a program, enters it, reports how it exited, and starts over.


use serboot_abi::{Paddr, WordFormat};

use crate::download::Downloader;
use crate::platform::MemorySpace;
use crate::uart::{Uart, UartExt};

/// Printed after the program returned zero.
pub const MSG_SUCCESS: &str = "Program exited normally";

/// Printed after the program returned anything else.
pub const MSG_FAILURE: &str = "Program exited with error status";

/// Transfers control to a downloaded program.
pub trait Launcher {
    /// Calls the program at `entry` and returns its exit status.
    ///
    /// # Safety
    ///
    /// `entry` must point to valid code for this machine that follows the
    /// platform calling convention and eventually returns.
    unsafe fn enter(&mut self, entry: Paddr) -> i32;
}

/// The resident monitor, owning its UART, memory and launcher.
pub struct Monitor<U: Uart, M: MemorySpace, L: Launcher> {
    uart: U,
    memory: M,
    launcher: L,
    format: WordFormat,
}

impl<U: Uart, M: MemorySpace, L: Launcher> Monitor<U, M, L> {
    /// Creates a monitor for a target with the given word format.
    pub const fn new(uart: U, memory: M, launcher: L, format: WordFormat) -> Self {
        Self {
            uart,
            memory,
            launcher,
            format,
        }
    }

    /// Downloads and runs one program, returning its exit status.
    ///
    /// # Safety
    ///
    /// Whatever the sender transmits is executed. The caller must trust the
    /// link, and the downloaded image must not overwrite the monitor.
    pub unsafe fn run_once(&mut self) -> i32 {
        let entry = Downloader::new(&mut self.uart, &mut self.memory, self.format).download();

        // SAFETY: the caller vouches for the downloaded image.
        let status = unsafe { self.launcher.enter(entry) };

        self.uart.write_line(if status == 0 {
            MSG_SUCCESS
        } else {
            MSG_FAILURE
        });
        status
    }

    /// Runs programs forever.
    ///
    /// # Safety
    ///
    /// Same as [`Monitor::run_once`].
    pub unsafe fn run(&mut self) -> ! {
        loop {
            // SAFETY: forwarded from the caller.
            unsafe { self.run_once() };
        }
    }
}
