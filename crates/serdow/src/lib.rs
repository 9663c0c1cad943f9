// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # serdow
//!
//! Host side of the serboot serial download protocol.
//!
//! This crate provides:
//! - A minimal ELF reader for 32- and 64-bit, little- and big-endian images
//! - Packet framing in the target's word format
//! - A sender that waits for each checksum acknowledgment and retransmits
//! - Serial device access with a reply timeout
//! - A console relay for the program's output once it runs
//!
//! The sender works over any [`Link`], so tests drive the real board engine
//! through an in-process channel.

pub mod console;
pub mod elf;
mod error;
pub mod packet;
pub mod send;
pub mod serial;

pub use elf::{Elf, ElfError, Segment};
pub use error::Error;
pub use send::{Link, SendError, Sender, Transfer};
pub use serial::SerialPort;
