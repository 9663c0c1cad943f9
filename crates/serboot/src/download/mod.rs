// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Serial download engine.
//!
//! Receives a program image as a stream of packets (see
//! [`serboot_abi::wire`]) and writes it straight into memory.
//!
//! # States
//!
//! ```text
//!          +------+  magic   +--------+  length != 0  +-------------+
//!  start ->| Seek |--------->| Packet |-------------->| Chain check |
//!          +------+          +--------+               +-------------+
//!             ^                  | length == 0          |  magic  | other
//!             |                  v                      |         |
//!             |              entry point    Packet <----+         |
//!             +-------------------------------------------------------+
//! ```
//!
//! - **Seek** slides a 4-byte window over the input until it holds the
//!   magic. It consumes any amount of noise.
//! - **Packet** reads the header and payload, storing full words as they
//!   complete, and answers with the CRC32 of everything since the magic.
//! - **Chain check** expects the next magic right away. Anything else means
//!   synchronization was lost; those 4 bytes seed the Seek window so a
//!   marker that starts a few bytes late is still found.
//!
//! Nothing else is ever written to the UART during a download. Errors are
//! never reported: the sender notices a wrong checksum and retransmits.


use serboot_abi::wire::{ENTRY_PACKET_LEN, MAGIC, MAGIC_LEN};
use serboot_abi::{ByteOrder, Crc32, Paddr, WordFormat};

use crate::platform::MemorySpace;
use crate::uart::Uart;

/// Header of a received packet.
///
/// The payload is never buffered; it has already been written to memory
/// by the time a `Packet` exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Payload size in bytes.
    pub length: u64,
    /// Payload destination, or the entry point for the last packet.
    pub address: Paddr,
}

impl Packet {
    /// Returns true if this packet ends the transfer.
    #[inline]
    #[must_use]
    pub const fn is_entry(&self) -> bool {
        self.length == ENTRY_PACKET_LEN
    }
}

/// Sliding window over the last four received bytes.
#[derive(Clone, Copy, Debug)]
struct SyncWindow {
    value: u32,
    order: ByteOrder,
}

impl SyncWindow {
    /// Creates an empty window.
    const fn new(order: ByteOrder) -> Self {
        Self { value: 0, order }
    }

    /// Shifts one received byte into the window.
    const fn push(&mut self, byte: u8) {
        self.value = match self.order {
            ByteOrder::Little => (self.value >> 8) | ((byte as u32) << 24),
            ByteOrder::Big => (self.value << 8) | byte as u32,
        };
    }

    /// Returns true if the last four bytes were the start-of-packet marker.
    const fn is_magic(&self) -> bool {
        self.value == MAGIC
    }
}

/// Download engine bound to a UART and a memory image.
pub struct Downloader<'a, U: Uart + ?Sized, M: MemorySpace + ?Sized> {
    uart: &'a mut U,
    memory: &'a mut M,
    format: WordFormat,
}

impl<'a, U: Uart + ?Sized, M: MemorySpace + ?Sized> Downloader<'a, U, M> {
    /// Creates an engine for a target with the given word format.
    #[must_use]
    pub fn new(uart: &'a mut U, memory: &'a mut M, format: WordFormat) -> Self {
        Self {
            uart,
            memory,
            format,
        }
    }

    /// Receives packets until the entrypoint packet arrives.
    ///
    /// Blocks for as long as the UART does. Returns the entry point
    /// exactly as sent.
    pub fn download(&mut self) -> Paddr {
        let mut window = SyncWindow::new(self.format.order);
        loop {
            self.seek(&mut window);

            loop {
                let packet = self.receive_packet();
                if packet.is_entry() {
                    return packet.address;
                }

                window = SyncWindow::new(self.format.order);
                for _ in 0..MAGIC_LEN {
                    window.push(self.uart.read_byte());
                }
                if !window.is_magic() {
                    // Sync lost, rescan starting from what was just read
                    break;
                }
            }
        }
    }

    /// Consumes input until the window holds the magic.
    fn seek(&mut self, window: &mut SyncWindow) {
        while !window.is_magic() {
            window.push(self.uart.read_byte());
        }
    }

    /// Receives one packet whose magic has just been consumed.
    fn receive_packet(&mut self) -> Packet {
        let mut crc = Crc32::new();
        crc.update_slice(&self.format.magic_bytes());

        let length = self.read_word(&mut crc);
        let address = Paddr::new(self.read_word(&mut crc));
        self.receive_payload(address, length, &mut crc);
        self.acknowledge(crc.finalize());

        Packet { length, address }
    }

    /// Reads one header word in wire order.
    fn read_word(&mut self, crc: &mut Crc32) -> u64 {
        let mut word = 0;
        for pos in 0..self.format.size() {
            let byte = self.uart.read_byte();
            crc.update(byte);
            word = self.format.place(word, byte, pos);
        }
        word
    }

    /// Streams `length` payload bytes into memory, one word at a time.
    ///
    /// A trailing partial word is stored with its missing bytes zeroed.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "a masked position is below the word size"
    )]
    fn receive_payload(&mut self, address: Paddr, length: u64, crc: &mut Crc32) {
        let mask = self.format.position_mask();
        let mut target = address;
        let mut word = 0;

        for index in 0..length {
            let pos = index & mask;
            let byte = self.uart.read_byte();
            crc.update(byte);
            word = self.format.place(word, byte, pos as usize);

            if pos == mask {
                self.memory.write_word(target, word, self.format.width);
                target = target.add(mask + 1);
                word = 0;
            }
        }

        if length & mask != 0 {
            self.memory.write_word(target, word, self.format.width);
        }
    }

    /// Sends the checksum, least-significant byte first on every target.
    fn acknowledge(&mut self, checksum: u32) {
        for byte in checksum.to_le_bytes() {
            self.uart.write_byte(byte);
        }
    }
}

/// Runs a download for the machine this code is compiled for.
pub fn download<U: Uart + ?Sized, M: MemorySpace + ?Sized>(uart: &mut U, memory: &mut M) -> Paddr {
    Downloader::new(uart, memory, WordFormat::NATIVE).download()
}
