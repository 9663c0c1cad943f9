// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Serial device access.
//!
//! The device is opened as a file. When it is a terminal, reads get a
//! timeout so a lost reply ends an attempt instead of blocking forever, and
//! unread input can be flushed before a packet is sent again. Baud rate and
//! raw mode are left to `stty`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::mem::MaybeUninit;
use std::os::fd::AsRawFd;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::send::Link;

/// A serial device with an optional read timeout.
pub struct SerialPort {
    file: File,
    /// Line settings; `None` if the device is not a terminal.
    termios: Option<libc::termios>,
}

impl SerialPort {
    /// Opens `path` for reading and writing and sets the read timeout.
    ///
    /// A device that is not a terminal is accepted as is, without timeout.
    ///
    /// # Errors
    ///
    /// Fails if the device cannot be opened or its line settings cannot be
    /// changed.
    pub fn open(path: &Path, timeout: Duration) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let mut port = Self {
            file,
            termios: None,
        };

        match port.attributes() {
            Ok(termios) => {
                port.termios = Some(termios);
                port.set_read_timeout(Some(timeout))?;
            }
            Err(err) if err.raw_os_error() == Some(libc::ENOTTY) => {
                warn!("{} is not a terminal, replies cannot time out", path.display());
            }
            Err(err) => return Err(err),
        }
        Ok(port)
    }

    /// Returns whether the device is a terminal.
    pub const fn is_terminal(&self) -> bool {
        self.termios.is_some()
    }

    /// Sets how long a read waits for the first byte. `None` waits forever.
    ///
    /// Terminals count in tenths of a second, up to 25.5 seconds.
    ///
    /// # Errors
    ///
    /// Fails if the line settings cannot be changed.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let Some(mut termios) = self.termios else {
            return Ok(());
        };
        let (vmin, vtime) = timeout.map_or((1, 0), |timeout| (0, deciseconds(timeout)));
        termios.c_cc[libc::VMIN] = vmin;
        termios.c_cc[libc::VTIME] = vtime;

        // SAFETY: the descriptor is open for the lifetime of `self.file`
        check(unsafe { libc::tcsetattr(self.file.as_raw_fd(), libc::TCSANOW, &raw const termios) })?;
        self.termios = Some(termios);
        debug!(vmin, vtime, "read timeout set");
        Ok(())
    }

    fn attributes(&self) -> io::Result<libc::termios> {
        let mut termios = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr fills the whole structure when it succeeds
        check(unsafe { libc::tcgetattr(self.file.as_raw_fd(), termios.as_mut_ptr()) })?;
        Ok(unsafe { termios.assume_init() })
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Link for SerialPort {
    fn discard_input(&mut self) -> io::Result<()> {
        if !self.is_terminal() {
            return Ok(());
        }
        // SAFETY: the descriptor is open for the lifetime of `self.file`
        check(unsafe { libc::tcflush(self.file.as_raw_fd(), libc::TCIFLUSH) })
    }
}

/// Converts a timeout to the terminal's unit, rounding up, at least one.
fn deciseconds(timeout: Duration) -> libc::cc_t {
    let tenths = timeout.as_millis().div_ceil(100).max(1);
    libc::cc_t::try_from(tenths).unwrap_or(libc::cc_t::MAX)
}

fn check(ret: libc::c_int) -> io::Result<()> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
