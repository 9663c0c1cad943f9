// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Core type definitions.
//!
//! Newtypes prevent accidentally mixing addresses with lengths and word
//! values at compile time.

mod addr;


pub use addr::Paddr;
