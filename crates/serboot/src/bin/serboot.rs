// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! serboot entry point
//!
//! The board starts executing at `_start` in the boot region. The monitor
//! sets up its stack and trap vector, initialises the UART, and then loops
//! forever: download a program, call it, report its exit status.

#![no_std]
#![no_main]
#![allow(unsafe_code)] // Board entry, trap vector and program launch

use core::arch::global_asm;
use core::panic::PanicInfo;

use serboot::monitor::{Launcher, Monitor};
use serboot::platform::PhysicalMemory;
use serboot::trap::{TrapContext, handle_trap, halt};
use serboot::uart::{self, MmioUart, UartExt};
use serboot::{Paddr, WordFormat};
use serboot_abi::layout::{UART_DATA_ADDR, UART_STATUS_ADDR};

// Reset entry: stack, cleared .bss, trap vector, then Rust.
global_asm!(
    r#"
.section .text.start
.global _start
_start:
    la      sp, __boot_stack_top
    la      t0, __bss_start
    la      t1, __bss_end
2:
    bgeu    t0, t1, 3f
    sb      zero, 0(t0)
    addi    t0, t0, 1
    j       2b
3:
    la      t0, __trap_vector
    csrw    mtvec, t0
    mv      s0, zero
    call    boot_main
4:
    wfi
    j       4b
"#
);

// Trap vector: save caller-saved registers, hand cause/pc/tval/fp to Rust.
// The handler returns only for resumable traps; mepc is left untouched.
global_asm!(
    r#"
.macro SAVE reg, slot
.if {xlen} == 8
    sd      \reg, (\slot * 8)(sp)
.else
    sw      \reg, (\slot * 4)(sp)
.endif
.endm

.macro LOAD reg, slot
.if {xlen} == 8
    ld      \reg, (\slot * 8)(sp)
.else
    lw      \reg, (\slot * 4)(sp)
.endif
.endm

.section .text.trap
.balign 4
.global __trap_vector
__trap_vector:
    addi    sp, sp, -(16 * {xlen})
    SAVE    ra, 0
    SAVE    t0, 1
    SAVE    t1, 2
    SAVE    t2, 3
    SAVE    a0, 4
    SAVE    a1, 5
    SAVE    a2, 6
    SAVE    a3, 7
    SAVE    a4, 8
    SAVE    a5, 9
    SAVE    a6, 10
    SAVE    a7, 11
    SAVE    t3, 12
    SAVE    t4, 13
    SAVE    t5, 14
    SAVE    t6, 15

    csrr    a0, mcause
    csrr    a1, mepc
    csrr    a2, mtval
    mv      a3, s0
    call    trap_handler

    LOAD    ra, 0
    LOAD    t0, 1
    LOAD    t1, 2
    LOAD    t2, 3
    LOAD    a0, 4
    LOAD    a1, 5
    LOAD    a2, 6
    LOAD    a3, 7
    LOAD    a4, 8
    LOAD    a5, 9
    LOAD    a6, 10
    LOAD    a7, 11
    LOAD    t3, 12
    LOAD    t4, 13
    LOAD    t5, 14
    LOAD    t6, 15
    addi    sp, sp, 16 * {xlen}
    mret
"#,
    xlen = const core::mem::size_of::<usize>(),
);

/// Calls downloaded programs as plain C functions.
struct DirectLauncher;

impl Launcher for DirectLauncher {
    unsafe fn enter(&mut self, entry: Paddr) -> i32 {
        // SAFETY: the caller guarantees entry is the start of a C function
        let program: extern "C" fn() -> i32 =
            unsafe { core::mem::transmute(entry.as_u64() as usize) };
        program()
    }
}

/// Rust side of the reset entry.
#[unsafe(no_mangle)]
extern "C" fn boot_main() -> ! {
    // SAFETY: fixed board registers, single hart, traps not yet possible
    unsafe { uart::init(UART_DATA_ADDR, UART_STATUS_ADDR) };

    let mut monitor = Monitor::new(
        MmioUart::new(),
        PhysicalMemory,
        DirectLauncher,
        WordFormat::NATIVE,
    );
    // SAFETY: the serial link is the trusted way onto this board
    unsafe { monitor.run() }
}

/// Rust side of the trap vector.
#[unsafe(no_mangle)]
extern "C" fn trap_handler(cause: isize, pc: usize, aux: usize, frame_pointer: usize) {
    let context = TrapContext {
        cause: cause as i64,
        pc: pc as u64,
        aux: aux as u64,
        frame_pointer: Paddr::new(frame_pointer as u64),
    };
    handle_trap(&mut MmioUart::new(), &PhysicalMemory, &context);
}

#[panic_handler]
fn panic(_info: &PanicInfo<'_>) -> ! {
    MmioUart::new().write_line("PANIC");
    halt()
}
