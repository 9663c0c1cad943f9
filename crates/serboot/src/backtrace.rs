// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Frame-pointer stack walker.
//!
//! Relies on the standard RISC-V frame layout produced with frame pointers
//! enabled:
//!
//! ```text
//!            +------------------+  <- frame pointer (fp)
//! fp - 1w    | return address   |
//! fp - 2w    | caller's fp      |
//!            | locals ...       |
//!            +------------------+
//! ```
//!
//! The walk is best effort. Memory is read without checks; the only guards
//! are that frame pointers must strictly increase (stacks grow down, so
//! callers live higher up) and must stay at or below the stack ceiling.
//! Together they bound the walk even on a cyclic chain.

use serboot_abi::{Paddr, WordWidth};

use crate::platform::MemorySpace;

/// One entry of a backtrace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame pointer of this frame.
    pub frame: Paddr,
    /// Return address stored in this frame.
    pub return_address: u64,
}

/// Lazy iterator over the frames of a frame-pointer chain.
pub struct Backtrace<'a, M: MemorySpace + ?Sized> {
    memory: &'a M,
    next: Option<Paddr>,
    ceiling: Paddr,
    width: WordWidth,
}

impl<'a, M: MemorySpace + ?Sized> Backtrace<'a, M> {
    /// Starts a walk at `frame_pointer`.
    ///
    /// Yields nothing if the starting frame already lies above `ceiling`.
    #[must_use]
    pub fn new(memory: &'a M, frame_pointer: Paddr, ceiling: Paddr, width: WordWidth) -> Self {
        Self {
            memory,
            next: (frame_pointer <= ceiling).then_some(frame_pointer),
            ceiling,
            width,
        }
    }
}

impl<M: MemorySpace + ?Sized> Iterator for Backtrace<'_, M> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.next.take()?;
        let word = self.width.bytes() as u64;

        let return_address = self.memory.read_word(frame.sub(word), self.width);
        let caller = Paddr::new(self.memory.read_word(frame.sub(2 * word), self.width));

        if caller > frame && caller <= self.ceiling {
            self.next = Some(caller);
        }

        Some(Frame {
            frame,
            return_address,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::platform::MockMemory;
    use serboot_abi::ByteOrder;
    use std::vec::Vec;

    const W: WordWidth = WordWidth::W32;

    /// Builds a frame at `fp` pointing to `caller` with return address `ra`.
    fn push_frame(memory: &mut MockMemory, fp: u64, ra: u64, caller: u64) {
        memory.write_word(Paddr::new(fp - 4), ra, W);
        memory.write_word(Paddr::new(fp - 8), caller, W);
    }

    fn stack() -> MockMemory {
        MockMemory::new(0x1000, Paddr::new(0xF000), ByteOrder::Little)
    }

    #[test]
    fn walks_chain_until_outermost_frame() {
        let mut memory = stack();
        push_frame(&mut memory, 0xF100, 0x1010, 0xF200);
        push_frame(&mut memory, 0xF200, 0x1020, 0xF300);
        push_frame(&mut memory, 0xF300, 0x1030, 0); // outermost: null caller

        let frames: Vec<Frame> =
            Backtrace::new(&memory, Paddr::new(0xF100), Paddr::new(0x1_0000), W).collect();

        assert_eq!(
            frames,
            [
                Frame { frame: Paddr::new(0xF100), return_address: 0x1010 },
                Frame { frame: Paddr::new(0xF200), return_address: 0x1020 },
                Frame { frame: Paddr::new(0xF300), return_address: 0x1030 },
            ]
        );
    }

    #[test]
    fn stops_at_stack_ceiling() {
        let mut memory = stack();
        push_frame(&mut memory, 0xF100, 0x1010, 0xF200);
        push_frame(&mut memory, 0xF200, 0x1020, 0xF800);

        let frames: Vec<Frame> =
            Backtrace::new(&memory, Paddr::new(0xF100), Paddr::new(0xF400), W).collect();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn frame_at_ceiling_is_included() {
        let mut memory = stack();
        push_frame(&mut memory, 0xF100, 0x1010, 0xF200);
        push_frame(&mut memory, 0xF200, 0x1020, 0);

        let frames: Vec<Frame> =
            Backtrace::new(&memory, Paddr::new(0xF100), Paddr::new(0xF200), W).collect();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn start_above_ceiling_yields_nothing() {
        let memory = stack();
        let mut walk = Backtrace::new(&memory, Paddr::new(0xF800), Paddr::new(0xF400), W);
        assert_eq!(walk.next(), None);
    }

    #[test]
    fn cycle_terminates() {
        let mut memory = stack();
        push_frame(&mut memory, 0xF100, 0x1010, 0xF200);
        push_frame(&mut memory, 0xF200, 0x1020, 0xF100); // points back down

        let frames: Vec<Frame> =
            Backtrace::new(&memory, Paddr::new(0xF100), Paddr::new(0x1_0000), W).collect();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn self_loop_terminates() {
        let mut memory = stack();
        push_frame(&mut memory, 0xF100, 0x1010, 0xF100);

        let frames: Vec<Frame> =
            Backtrace::new(&memory, Paddr::new(0xF100), Paddr::new(0x1_0000), W).collect();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn walks_64_bit_frames() {
        let mut memory = MockMemory::new(0x100, Paddr::new(0x8000), ByteOrder::Big);
        let w = WordWidth::W64;
        memory.write_word(Paddr::new(0x8040 - 8), 0xAAAA_0000_1111, w);
        memory.write_word(Paddr::new(0x8040 - 16), 0x8080, w);
        memory.write_word(Paddr::new(0x8080 - 8), 0xBBBB_0000_2222, w);
        memory.write_word(Paddr::new(0x8080 - 16), 0, w);

        let frames: Vec<Frame> =
            Backtrace::new(&memory, Paddr::new(0x8040), Paddr::new(0x9000), w).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].return_address, 0xAAAA_0000_1111);
        assert_eq!(frames[1].frame, Paddr::new(0x8080));
    }
}
