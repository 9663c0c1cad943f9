// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # serboot
//!
//! Resident boot monitor for bare-metal RISC-V boards.
//!
//! This crate provides:
//! - The serial download engine that streams packets into memory
//! - Trap diagnostics with frame-pointer backtraces
//! - Numeric formatting for the diagnostic output
//! - UART and physical memory capabilities, with mocks for host testing
//! - The boot monitor loop that downloads and enters programs
//!
//! Nothing in here allocates. All I/O goes through the [`uart::Uart`] and
//! [`platform::MemorySpace`] traits, so the engine and the trap handler run
//! unchanged against in-memory mocks.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod backtrace;
pub mod download;
pub mod monitor;
pub mod numfmt;
pub mod platform;
pub mod trap;
pub mod uart;

// Re-export commonly used types at crate root
pub use serboot_abi::{Paddr, WordFormat};
