// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Console relay.
//!
//! Once the program runs, the serial line carries its output and, when it
//! traps, the board's diagnostics. Both are copied to the host line by line.

use std::io::{self, BufRead, ErrorKind, Write};

/// Copies lines from `input` to `output` until `input` reports end of file.
///
/// Bytes that are not valid UTF-8 are replaced rather than aborting the
/// relay. Read timeouts are ignored. Returns the number of lines relayed.
///
/// # Errors
///
/// Returns any other read error, and every write error.
pub fn relay<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<u64> {
    let mut line = Vec::new();
    let mut lines = 0;

    loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => return Ok(lines),
            Ok(_) => {}
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
                ) =>
            {
                if line.is_empty() {
                    continue;
                }
            }
            Err(err) => return Err(err),
        }

        output.write_all(String::from_utf8_lossy(&line).as_bytes())?;
        output.flush()?;
        lines += 1;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::io::Cursor;

    #[test]
    fn relays_until_eof() {
        let input = Cursor::new(b"Hello\nProgram exited normally\n".to_vec());
        let mut output = Vec::new();

        let lines = relay(input, &mut output).unwrap();

        assert_eq!(lines, 2);
        assert_eq!(output, b"Hello\nProgram exited normally\n");
    }

    #[test]
    fn last_line_without_newline() {
        let mut output = Vec::new();
        let lines = relay(Cursor::new(b"a\nb".to_vec()), &mut output).unwrap();

        assert_eq!(lines, 2);
        assert_eq!(output, b"a\nb");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut output = Vec::new();
        relay(Cursor::new(vec![b'x', 0xFF, b'\n']), &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "x\u{FFFD}\n");
    }

    #[test]
    fn empty_input() {
        let mut output = Vec::new();
        assert_eq!(relay(Cursor::new(Vec::new()), &mut output).unwrap(), 0);
        assert!(output.is_empty());
    }
}
