// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform abstraction for the boot monitor.
//!
//! The download engine writes the program image and the backtrace walker
//! reads stack frames through [`MemorySpace`], so both can be tested on the
//! host against a bounded buffer.


// Mock requires alloc, only available with std or test
#[cfg(any(test, feature = "std"))]
mod mock;
#[cfg(feature = "board")]
mod physical;
mod traits;

#[cfg(any(test, feature = "std"))]
pub use mock::{MockMemory, WordWrite};
#[cfg(feature = "board")]
pub use physical::PhysicalMemory;
pub use traits::MemorySpace;
