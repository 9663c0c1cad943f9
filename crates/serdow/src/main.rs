// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! serdow - send an ELF program to a serboot board.
//!
//! Line settings such as the baud rate are configured beforehand (e.g. with
//! `stty`); only the read timeout is set here.

use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serboot_abi::wire::{MAX_PACKET_LEN, MAX_SEND_TRIES};
use serdow::{Elf, Error, Sender, SerialPort, console};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Send an ELF program to a serboot board over a serial line.
#[derive(Parser, Debug)]
#[command(name = "serdow", version, about)]
struct Args {
    /// Program image to send.
    elf: PathBuf,

    /// Serial device the board is attached to.
    device: PathBuf,

    /// Maximum payload bytes per packet.
    #[arg(long, default_value_t = MAX_PACKET_LEN, value_parser = parse_packet_size)]
    packet_size: usize,

    /// Attempts per packet before giving up.
    #[arg(long, default_value_t = MAX_SEND_TRIES)]
    tries: usize,

    /// Milliseconds to wait for a reply before sending a packet again.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    timeout: u64,

    /// Exit after the transfer instead of relaying the program's output.
    #[arg(long)]
    no_console: bool,

    /// Log every packet.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_packet_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("packet size must be at least 1".to_owned()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the program's console.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Error> {
    let data = fs::read(&args.elf).map_err(|source| open_error(&args.elf, source))?;
    let elf = Elf::parse(&data)?;
    let format = elf.word_format();
    info!(
        "ELF object is type {} for machine {:#x}, {} bits, {}",
        elf.file_type(),
        elf.machine(),
        format.size() * 8,
        format.order.name()
    );

    let port = SerialPort::open(&args.device, Duration::from_millis(args.timeout))
        .map_err(|source| open_error(&args.device, source))?;

    let mut sender = Sender::new(port)
        .with_tries(args.tries)
        .with_packet_size(args.packet_size);
    sender.send_image(&elf)?;

    if !args.no_console {
        let mut port = sender.into_inner();
        port.set_read_timeout(None).map_err(Error::Console)?;
        info!("{}", "-".repeat(80));
        console::relay(BufReader::new(port), io::stdout().lock()).map_err(Error::Console)?;
    }
    Ok(())
}

fn open_error(path: &Path, source: io::Error) -> Error {
    Error::Open {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["serdow", "prog.elf", "/dev/ttyUSB0"]).unwrap();
        assert_eq!(args.packet_size, 1024);
        assert_eq!(args.tries, 10);
        assert_eq!(args.timeout, 100);
        assert!(!args.no_console);
        assert!(!args.verbose);
    }

    #[test]
    fn options() {
        let args = Args::try_parse_from([
            "serdow",
            "prog.elf",
            "/dev/ttyS1",
            "--packet-size",
            "256",
            "--tries",
            "3",
            "--timeout",
            "250",
            "--no-console",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.packet_size, 256);
        assert_eq!(args.tries, 3);
        assert_eq!(args.timeout, 250);
        assert!(args.no_console);
        assert!(args.verbose);
    }

    #[test]
    fn zero_packet_size_is_rejected() {
        assert!(Args::try_parse_from(["serdow", "a", "b", "--packet-size", "0"]).is_err());
    }

    #[test]
    fn missing_device_is_rejected() {
        assert!(Args::try_parse_from(["serdow", "prog.elf"]).is_err());
    }
}
