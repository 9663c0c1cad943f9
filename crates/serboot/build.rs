// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Build script for serboot.
//!
//! Adds the linker script that places the monitor in the boot region.

fn main() {
    // Only bare-metal RISC-V builds are linked for the board; host test
    // builds use the normal std link
    let target = std::env::var("TARGET").unwrap_or_default();
    if target.starts_with("riscv") && target.ends_with("-none-elf") {
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
        let linker_script = format!("{manifest_dir}/serboot.ld");
        if std::path::Path::new(&linker_script).exists() {
            println!("cargo::rustc-link-arg-bins=-T{linker_script}");
            println!("cargo::rerun-if-changed={linker_script}");
        }
    }
    println!("cargo::rerun-if-changed=build.rs");
}
