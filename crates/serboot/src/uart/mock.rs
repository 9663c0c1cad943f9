// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Scripted serial line for host tests.
//!
//! The input side replays what a sender would transmit. The output side
//! collects what the board answers: acknowledgments during a download,
//! text from the trap handler and the monitor otherwise.
//!
//! A real UART blocks when the sender goes quiet. Here the line stalls
//! instead: `read_byte` unwinds with a [`LinkStalled`] payload, which
//! [`until_stalled`] turns back into a value tests can inspect.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::string::String;
use std::vec::Vec;

use serboot_abi::wire::ACK_LEN;

use super::Uart;

/// The board tried to read past the end of the scripted input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkStalled {
    /// Input bytes consumed before the stall.
    pub consumed: usize,
    /// Everything the board had sent by then.
    pub output: Vec<u8>,
}

/// Runs `f`, returning `Err` if it stalled on a [`MockUart`].
///
/// Any other panic propagates unchanged.
pub fn until_stalled<R>(f: impl FnOnce() -> R) -> Result<R, LinkStalled> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        match payload.downcast::<LinkStalled>() {
            Ok(stalled) => *stalled,
            Err(other) => panic::resume_unwind(other),
        }
    })
}

/// Serial line that replays scripted input and records the board's replies.
#[derive(Debug, Default)]
pub struct MockUart {
    pending: VecDeque<u8>,
    consumed: usize,
    sent: Vec<u8>,
}

impl MockUart {
    /// Creates a silent line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            consumed: 0,
            sent: Vec::new(),
        }
    }

    /// Creates a line that will deliver `input`.
    #[must_use]
    pub fn with_input(input: &[u8]) -> Self {
        let mut uart = Self::new();
        uart.push_input(input);
        uart
    }

    /// Queues more bytes from the sender.
    pub fn push_input(&mut self, data: &[u8]) {
        self.pending.extend(data);
    }

    /// Bytes queued but not yet read by the board.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.pending.len()
    }

    /// Bytes the board has read so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Raw bytes sent by the board.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.sent
    }

    /// Output as text, replacing invalid UTF-8.
    #[must_use]
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }

    /// Output read back as acknowledgments.
    ///
    /// Only meaningful while nothing but the download engine has written.
    /// A trailing partial acknowledgment is ignored.
    #[must_use]
    pub fn acks(&self) -> Vec<u32> {
        self.sent
            .chunks_exact(ACK_LEN)
            .map(|ack| u32::from_le_bytes([ack[0], ack[1], ack[2], ack[3]]))
            .collect()
    }

    /// Forgets the recorded output.
    pub fn clear_output(&mut self) {
        self.sent.clear();
    }
}

impl Uart for MockUart {
    fn write_byte(&mut self, byte: u8) {
        self.sent.push(byte);
    }

    fn read_byte(&mut self) -> u8 {
        let Some(byte) = self.pending.pop_front() else {
            panic::panic_any(LinkStalled {
                consumed: self.consumed,
                output: self.sent.clone(),
            });
        };
        self.consumed += 1;
        byte
    }

    fn can_read(&self) -> bool {
        !self.pending.is_empty()
    }

    fn can_write(&self) -> bool {
        true
    }
}
