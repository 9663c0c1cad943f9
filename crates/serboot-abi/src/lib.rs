// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared definitions between the serboot boot monitor and the serdow sender.
//!
//! This crate defines the contract between the device and the host tool:
//! - The packet framing constants and the target word format
//! - The CRC32 both sides compute over every packet
//! - The trap cause table used by the diagnostic handler
//! - Fixed board addresses (memory base, stack ceiling, UART registers)
//!
//! # Design Principles
//!
//! - **No dependencies**: Pure data types, 100% host-testable
//! - **Width agnostic**: Words travel as `u64` and are described by a
//!   [`WordFormat`], so 32- and 64-bit targets share one implementation
//!
//! # Modules
//!
//! - [`types`]: Physical address type
//! - [`wire`]: Packet framing and word layout
//! - [`crc32`]: Bitwise CRC-32 (ISO-HDLC)
//! - [`trap`]: Trap cause classification
//! - [`layout`]: Board address constants

#![no_std]

pub mod crc32;
pub mod layout;
pub mod trap;
pub mod types;
pub mod wire;

// Re-export commonly used types at crate root
pub use crc32::Crc32;
pub use trap::{AuxKind, TrapCause};
pub use types::Paddr;
pub use wire::{ByteOrder, MAGIC, WordFormat, WordWidth};
