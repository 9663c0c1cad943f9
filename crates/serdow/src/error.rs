// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Error type of the sender.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::elf::ElfError;
use crate::send::SendError;

/// Anything that can stop a transfer.
#[derive(Debug)]
pub enum Error {
    /// A file or device could not be opened or read.
    Open {
        /// The path involved.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },
    /// The program image is not a usable ELF executable.
    Elf(ElfError),
    /// The transfer failed.
    Send(SendError),
    /// Relaying console output failed.
    Console(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Elf(err) => write!(f, "invalid ELF file: {err}"),
            Self::Send(err) => write!(f, "transfer failed: {err}"),
            Self::Console(err) => write!(f, "console: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Console(source) => Some(source),
            Self::Elf(err) => Some(err),
            Self::Send(err) => Some(err),
        }
    }
}

impl From<ElfError> for Error {
    fn from(err: ElfError) -> Self {
        Self::Elf(err)
    }
}

impl From<SendError> for Error {
    fn from(err: SendError) -> Self {
        Self::Send(err)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_the_path() {
        let err = Error::Open {
            path: PathBuf::from("/dev/ttyUSB0"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("/dev/ttyUSB0: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn wraps_elf_errors() {
        let err = Error::from(ElfError::NotExecutable);
        assert_eq!(
            err.to_string(),
            "invalid ELF file: ELF file is not an executable"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn wraps_send_errors() {
        let err = Error::from(SendError::TooManyRetries { tries: 2 });
        assert!(err.to_string().starts_with("transfer failed: "));
    }
}
