// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Packet transmission with acknowledgment and retransmission.
//!
//! Every packet is answered by the board with the CRC32 of the bytes it
//! received, as four little-endian bytes. A mismatch, or a short reply
//! from a link with a read timeout, causes the packet to be sent again.
//! Input left over from an earlier attempt is discarded first, so the tail
//! of a late reply is never read as the start of the next one.

use std::fmt;
use std::io::{self, ErrorKind, Read, Write};

use serboot_abi::layout::{BOOT_REGION_SIZE, MEMORY_BASE};
use serboot_abi::wire::{ACK_LEN, MAX_PACKET_LEN, MAX_SEND_TRIES};
use serboot_abi::WordFormat;
use tracing::{debug, info, warn};

use crate::elf::{Elf, Segment};
use crate::packet::{encode_packet, entry_packet, expected_ack, fits};

/// Error during transmission.
#[derive(Debug)]
pub enum SendError {
    /// The serial link failed.
    Io(io::Error),
    /// The board never acknowledged a packet correctly.
    TooManyRetries {
        /// Number of attempts made.
        tries: usize,
    },
    /// An address does not fit into a target word.
    AddressOutOfRange(u64),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "serial link: {err}"),
            Self::TooManyRetries { tries } => write!(
                f,
                "target failed to reply with the correct checksum {tries} times"
            ),
            Self::AddressOutOfRange(addr) => {
                write!(f, "address {addr:#x} does not fit the target word size")
            }
        }
    }
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::TooManyRetries { .. } | Self::AddressOutOfRange(_) => None,
        }
    }
}

impl From<io::Error> for SendError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Byte link to the board.
pub trait Link: Read + Write {
    /// Drops input that arrived but has not been read yet.
    ///
    /// # Errors
    ///
    /// Returns the link's failure.
    fn discard_input(&mut self) -> io::Result<()>;
}

/// Summary of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Packets acknowledged, including the entry packet.
    pub packets: usize,
    /// Payload bytes loaded.
    pub bytes: u64,
    /// Packets that had to be sent again.
    pub retransmissions: usize,
    /// Entry point handed to the board.
    pub entry: u64,
}

/// Outcome of one reply read.
enum Reply {
    Ack(u32),
    Short(usize),
}

/// Sends packets over a byte link to a board running the download engine.
pub struct Sender<T> {
    link: T,
    tries: usize,
    packet_size: usize,
    retransmissions: usize,
}

impl<T: Link> Sender<T> {
    /// Creates a sender with the default packet size and retry limit.
    pub const fn new(link: T) -> Self {
        Self {
            link,
            tries: MAX_SEND_TRIES,
            packet_size: MAX_PACKET_LEN,
            retransmissions: 0,
        }
    }

    /// Sets how often a packet is sent before giving up. At least once.
    #[must_use]
    pub fn with_tries(mut self, tries: usize) -> Self {
        self.tries = tries.max(1);
        self
    }

    /// Sets the maximum payload per packet. At least one byte.
    #[must_use]
    pub fn with_packet_size(mut self, packet_size: usize) -> Self {
        self.packet_size = packet_size.max(1);
        self
    }

    /// Returns the link, e.g. to relay the program's console output.
    pub fn into_inner(self) -> T {
        self.link
    }

    /// Sends one framed packet until the board acknowledges it.
    ///
    /// # Errors
    ///
    /// Fails on link errors, or with [`SendError::TooManyRetries`] once
    /// every attempt was answered with a wrong or short reply.
    pub fn send_packet(&mut self, frame: &[u8]) -> Result<(), SendError> {
        let expected = expected_ack(frame);

        for attempt in 1..=self.tries {
            if attempt > 1 {
                self.retransmissions += 1;
            }
            self.link.discard_input()?;
            self.link.write_all(frame)?;
            self.link.flush()?;

            match self.read_reply()? {
                Reply::Ack(ack) if ack == expected => {
                    debug!(len = frame.len(), attempt, "packet acknowledged");
                    return Ok(());
                }
                Reply::Ack(ack) => {
                    warn!(attempt, "received wrong checksum ({ack:#010X} instead of {expected:#010X})");
                }
                Reply::Short(len) => {
                    warn!(attempt, "target sent {len} bytes instead of {ACK_LEN}");
                }
            }
        }

        Err(SendError::TooManyRetries { tries: self.tries })
    }

    /// Sends every loadable segment of `elf`, then its entry point.
    ///
    /// Segments starting in the board's boot region are skipped, as are
    /// segments without file contents.
    ///
    /// # Errors
    ///
    /// See [`Sender::send_packet`]. Also fails if an address does not fit
    /// the target word.
    pub fn send_image(&mut self, elf: &Elf<'_>) -> Result<Transfer, SendError> {
        let format = elf.word_format();
        let mut transfer = Transfer {
            packets: 0,
            bytes: 0,
            retransmissions: 0,
            entry: elf.entry_point(),
        };
        let retransmissions_before = self.retransmissions;

        for segment in elf.segments() {
            let desc = format!("{} @{:08X}", segment.kind, segment.paddr);
            if in_boot_region(segment.paddr) {
                info!("skipping boot section {desc}");
                continue;
            }
            if segment.file_data.is_empty() {
                info!("skipping empty section {desc}");
                continue;
            }

            transfer.packets += self.send_segment(format, &segment, &desc)?;
            transfer.bytes += segment.file_data.len() as u64;
        }

        if !fits(format, transfer.entry) {
            return Err(SendError::AddressOutOfRange(transfer.entry));
        }
        self.send_packet(&entry_packet(format, transfer.entry))?;
        transfer.packets += 1;
        transfer.retransmissions = self.retransmissions - retransmissions_before;

        info!(
            packets = transfer.packets,
            bytes = transfer.bytes,
            "transmission complete; entry point address: {:#010x}",
            transfer.entry
        );
        Ok(transfer)
    }

    /// Sends one segment in `packet_size` chunks. Returns the packet count.
    fn send_segment(
        &mut self,
        format: WordFormat,
        segment: &Segment<'_>,
        desc: &str,
    ) -> Result<usize, SendError> {
        let total = segment.file_data.len();
        let mut frame = Vec::new();
        let mut sent = 0;
        let mut packets = 0;

        for chunk in segment.file_data.chunks(self.packet_size) {
            let address = segment.paddr + sent as u64;
            address
                .checked_add(chunk.len() as u64 - 1)
                .filter(|&last| fits(format, last))
                .ok_or(SendError::AddressOutOfRange(address))?;

            frame.clear();
            encode_packet(format, address, chunk, &mut frame);
            self.send_packet(&frame)?;

            sent += chunk.len();
            packets += 1;
            debug!(
                address = %format_args!("{address:#010x}"),
                len = chunk.len(),
                "{desc}: {:.1} KiB {:>3}%",
                sent as f64 / 1024.0,
                sent * 100 / total
            );
        }

        info!("{desc}: {:.1} KiB sent in {packets} packets", total as f64 / 1024.0);
        Ok(packets)
    }

    /// Reads one acknowledgment.
    ///
    /// A link that reports end of file or a timeout before four bytes
    /// arrived yields a short reply.
    fn read_reply(&mut self) -> Result<Reply, SendError> {
        let mut reply = [0u8; ACK_LEN];
        let mut filled = 0;

        while filled < ACK_LEN {
            match self.link.read(&mut reply[filled..]) {
                Ok(0) => return Ok(Reply::Short(filled)),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(Reply::Short(filled));
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Reply::Ack(u32::from_le_bytes(reply)))
    }
}

/// Returns whether `paddr` lies in the region the monitor itself occupies.
fn in_boot_region(paddr: u64) -> bool {
    paddr
        .checked_sub(MEMORY_BASE.as_u64())
        .is_some_and(|offset| offset < BOOT_REGION_SIZE)
}
