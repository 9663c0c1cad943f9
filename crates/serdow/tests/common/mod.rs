// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared fixtures: an in-process serial link and an ELF image builder.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use serboot::download::Downloader;
use serboot::platform::MockMemory;
use serboot::uart::Uart;
use serboot_abi::{ByteOrder, Paddr, WordFormat, WordWidth};
use serdow::Link;

pub const LE32: WordFormat = WordFormat::new(WordWidth::W32, ByteOrder::Little);
pub const BE32: WordFormat = WordFormat::new(WordWidth::W32, ByteOrder::Big);
pub const LE64: WordFormat = WordFormat::new(WordWidth::W64, ByteOrder::Little);
pub const BE64: WordFormat = WordFormat::new(WordWidth::W64, ByteOrder::Big);

/// Board end of the link.
pub struct BoardUart {
    rx: Receiver<u8>,
    tx: Sender<u8>,
}

impl Uart for BoardUart {
    fn write_byte(&mut self, byte: u8) {
        // The host may have given up already
        let _ = self.tx.send(byte);
    }

    fn read_byte(&mut self) -> u8 {
        // A closed link ends the board thread
        self.rx.recv().unwrap_or_else(|_| panic!("host closed the link"))
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }
}

/// Host end of the link, optionally damaging what it sends.
pub struct HostLink {
    rx: Receiver<u8>,
    tx: Sender<u8>,
    writes: usize,
    /// Flips `(write_index, byte_index)` on the way out.
    pub corrupt: Option<(usize, usize)>,
}

impl HostLink {
    /// Number of `write` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Write for HostLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (i, &byte) in buf.iter().enumerate() {
            let byte = match self.corrupt {
                Some((write, pos)) if write == self.writes && pos == i => byte ^ 0xFF,
                _ => byte,
            };
            self.tx
                .send(byte)
                .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        }
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for HostLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let Ok(first) = self.rx.recv() else {
            return Ok(0);
        };
        buf[0] = first;
        let mut n = 1;
        while n < buf.len() {
            match self.rx.try_recv() {
                Ok(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(n)
    }
}

impl Link for HostLink {
    fn discard_input(&mut self) -> io::Result<()> {
        while self.rx.try_recv().is_ok() {}
        Ok(())
    }
}

/// Creates both ends of a link.
pub fn link() -> (HostLink, BoardUart) {
    let (host_tx, board_rx) = mpsc::channel();
    let (board_tx, host_rx) = mpsc::channel();
    (
        HostLink {
            rx: host_rx,
            tx: host_tx,
            writes: 0,
            corrupt: None,
        },
        BoardUart {
            rx: board_rx,
            tx: board_tx,
        },
    )
}

/// Runs the board's download engine on its own thread.
pub fn spawn_board(
    mut uart: BoardUart,
    format: WordFormat,
    base: u64,
    size: usize,
) -> JoinHandle<(Paddr, MockMemory)> {
    thread::spawn(move || {
        let mut memory = MockMemory::new(size, Paddr::new(base), format.order);
        let entry = Downloader::new(&mut uart, &mut memory, format).download();
        (entry, memory)
    })
}

/// A program header for [`elf_image`].
pub struct Phdr<'a> {
    pub paddr: u64,
    pub data: &'a [u8],
}

/// Builds an ELF executable with one `PT_LOAD` header per entry.
pub fn elf_image(format: WordFormat, entry: u64, phdrs: &[Phdr<'_>]) -> Vec<u8> {
    let wide = format.width == WordWidth::W64;
    let word = format.size();
    let (header_size, phdr_size) = if wide { (64, 56) } else { (52, 32) };
    // (entry, phoff, phentsize, phnum) and (offset, vaddr, paddr, filesz, memsz)
    let (e_entry, e_phoff, e_phentsize, e_phnum) = if wide {
        (24, 32, 54, 56)
    } else {
        (24, 28, 42, 44)
    };
    let (p_offset, p_vaddr, p_paddr, p_filesz, p_memsz, p_flags) = if wide {
        (8, 16, 24, 32, 40, 4)
    } else {
        (4, 8, 12, 16, 20, 24)
    };

    let put = |data: &mut Vec<u8>, offset: usize, len: usize, value: u64| {
        for i in 0..len {
            let shift = match format.order {
                ByteOrder::Little => i * 8,
                ByteOrder::Big => (len - 1 - i) * 8,
            };
            data[offset + i] = (value >> shift) as u8;
        }
    };

    let mut data = vec![0u8; header_size + phdr_size * phdrs.len()];
    data[0..4].copy_from_slice(b"\x7FELF");
    data[4] = if wide { 2 } else { 1 };
    data[5] = match format.order {
        ByteOrder::Little => 1,
        ByteOrder::Big => 2,
    };
    data[6] = 1;
    put(&mut data, 16, 2, 2);
    put(&mut data, 18, 2, 0xF3);
    put(&mut data, e_entry, word, entry);
    put(&mut data, e_phoff, word, header_size as u64);
    put(&mut data, e_phentsize, 2, phdr_size as u64);
    put(&mut data, e_phnum, 2, phdrs.len() as u64);

    for (i, phdr) in phdrs.iter().enumerate() {
        let base = header_size + i * phdr_size;
        let offset = data.len() as u64;
        put(&mut data, base, 4, 1);
        put(&mut data, base + p_flags, 4, 5);
        put(&mut data, base + p_offset, word, offset);
        put(&mut data, base + p_vaddr, word, phdr.paddr);
        put(&mut data, base + p_paddr, word, phdr.paddr);
        put(&mut data, base + p_filesz, word, phdr.data.len() as u64);
        put(&mut data, base + p_memsz, word, phdr.data.len() as u64);
        data.extend_from_slice(phdr.data);
    }
    data
}
