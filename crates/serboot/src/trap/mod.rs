// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Trap diagnostics.
//!
//! When the downloaded program traps, the board's trap vector saves the
//! registers and calls [`handle_trap`]. The handler prints what happened,
//! walks the stack for faults that have a meaningful call chain, and either
//! resumes (breakpoints only) or halts until the board is reset.
//!
//! # Output
//!
//! ```text
//! EXCEPTION HANDLER
//! EXCEPTION @00001234: load access fault @DEADBEEF
//! Backtrace:
//! Stack frame @000FFF80, return address: 00001100
//! ```
//!
//! Interrupts print `INTERRUPT @<pc>, code: <n>` instead and always halt:
//! the interrupt line is most likely still asserted, so returning would
//! trap again immediately.


use serboot_abi::layout::STACK_CEILING;
use serboot_abi::{AuxKind, Paddr, TrapCause, WordWidth};

use crate::backtrace::Backtrace;
use crate::numfmt::NumBuf;
use crate::platform::MemorySpace;
use crate::uart::{Uart, UartExt};

/// Register state handed over by the trap vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapContext {
    /// Raw cause register, sign-extended. Negative for interrupts.
    pub cause: i64,
    /// Program counter of the trapping instruction.
    pub pc: u64,
    /// Trap value: faulting address or instruction, depending on the cause.
    pub aux: u64,
    /// Frame pointer at the time of the trap.
    pub frame_pointer: Paddr,
}

impl TrapContext {
    /// Returns the classified cause.
    #[inline]
    #[must_use]
    pub const fn classify(&self) -> TrapCause {
        TrapCause::from_raw(self.cause)
    }
}

/// What happens after a trap was reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Return to the trapped program unchanged.
    Resume,
    /// Stop for good.
    Halt,
}

/// Trap reporter for a target word width and stack layout.
#[derive(Clone, Copy, Debug)]
pub struct TrapDiagnostics {
    width: WordWidth,
    stack_ceiling: Paddr,
}

impl TrapDiagnostics {
    /// Creates a reporter.
    #[must_use]
    pub const fn new(width: WordWidth, stack_ceiling: Paddr) -> Self {
        Self {
            width,
            stack_ceiling,
        }
    }

    /// Reporter for the machine this code is compiled for.
    #[must_use]
    pub const fn native() -> Self {
        Self::new(WordWidth::NATIVE, STACK_CEILING)
    }

    /// Prints a report for `context` and decides how to continue.
    pub fn report<U, M>(&self, uart: &mut U, memory: &M, context: &TrapContext) -> Disposition
    where
        U: Uart + ?Sized,
        M: MemorySpace + ?Sized,
    {
        let cause = context.classify();
        let mut buf = NumBuf::new();

        uart.write_line("EXCEPTION HANDLER");

        if let TrapCause::Interrupt(code) = cause {
            uart.write_str("INTERRUPT @");
            uart.write_str(buf.hex(context.pc, self.width.hex_digits()));
            uart.write_str(", code: ");
            uart.write_line(buf.decimal(code));
            return Disposition::Halt;
        }

        uart.write_str("EXCEPTION @");
        uart.write_str(buf.hex(context.pc, self.width.hex_digits()));
        uart.write_str(": ");
        uart.write_str(cause.description());

        match (cause, cause.aux_kind()) {
            (TrapCause::UnknownException(code), _) => {
                uart.write_byte(b' ');
                uart.write_str(buf.decimal(code));
            }
            (_, Some(kind)) => {
                uart.write_str(match kind {
                    AuxKind::Opcode => " ",
                    AuxKind::Address => " @",
                });
                uart.write_str(buf.hex(context.aux, self.width.hex_digits()));
            }
            (_, None) => {}
        }
        uart.write_byte(b'\n');

        if cause.wants_backtrace() {
            self.print_backtrace(uart, memory, context.frame_pointer);
        }

        if cause.is_resumable() {
            Disposition::Resume
        } else {
            Disposition::Halt
        }
    }

    /// Prints every frame reachable from `frame_pointer`.
    pub fn print_backtrace<U, M>(&self, uart: &mut U, memory: &M, frame_pointer: Paddr)
    where
        U: Uart + ?Sized,
        M: MemorySpace + ?Sized,
    {
        let mut buf = NumBuf::new();
        let digits = self.width.hex_digits();

        uart.write_line("Backtrace:");
        for frame in Backtrace::new(memory, frame_pointer, self.stack_ceiling, self.width) {
            uart.write_str("Stack frame @");
            uart.write_str(buf.hex(frame.frame.as_u64(), digits));
            uart.write_str(", return address: ");
            uart.write_line(buf.hex(frame.return_address, digits));
        }
    }
}

impl Default for TrapDiagnostics {
    fn default() -> Self {
        Self::native()
    }
}

/// Reports a trap and returns only if the program may resume.
///
/// Called from the board's trap vector with traps disabled.
pub fn handle_trap<U, M>(uart: &mut U, memory: &M, context: &TrapContext)
where
    U: Uart + ?Sized,
    M: MemorySpace + ?Sized,
{
    match TrapDiagnostics::native().report(uart, memory, context) {
        Disposition::Resume => {}
        Disposition::Halt => halt(),
    }
}

/// Spins forever. The only way out is a board reset.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
