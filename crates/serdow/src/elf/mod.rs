// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Minimal ELF reader for program images.
//!
//! This module provides just enough ELF parsing to find the entry point and
//! the program headers of a statically linked executable, in any of the four
//! combinations of 32/64-bit class and little/big-endian data encoding. It
//! does not support:
//! - Relocations (assumes position-dependent code at fixed addresses)
//! - Dynamic linking
//! - Section headers (only program headers)


use core::fmt;

use serboot_abi::{ByteOrder, WordFormat, WordWidth};

// =============================================================================
// Constants
// =============================================================================

/// ELF magic bytes.
const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// ELF class: 32-bit.
const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit.
const ELFCLASS64: u8 = 2;

/// ELF data encoding: little-endian.
const ELFDATA2LSB: u8 = 1;

/// ELF data encoding: big-endian.
const ELFDATA2MSB: u8 = 2;

/// ELF type: executable.
const ET_EXEC: u64 = 2;

/// Length of `e_ident`.
const IDENT_LEN: usize = 16;

/// Field offsets that differ between the two ELF classes.
#[derive(Clone, Copy, Debug)]
struct ClassLayout {
    header_size: usize,
    entry: usize,
    phoff: usize,
    phentsize: usize,
    phnum: usize,
    phdr_size: usize,
    p_offset: usize,
    p_paddr: usize,
    p_filesz: usize,
    p_memsz: usize,
}

const ELF32_LAYOUT: ClassLayout = ClassLayout {
    header_size: 52,
    entry: 24,
    phoff: 28,
    phentsize: 42,
    phnum: 44,
    phdr_size: 32,
    p_offset: 4,
    p_paddr: 12,
    p_filesz: 16,
    p_memsz: 20,
};

const ELF64_LAYOUT: ClassLayout = ClassLayout {
    header_size: 64,
    entry: 24,
    phoff: 32,
    phentsize: 54,
    phnum: 56,
    phdr_size: 56,
    p_offset: 8,
    p_paddr: 24,
    p_filesz: 32,
    p_memsz: 40,
};

// =============================================================================
// Public Types
// =============================================================================

/// Error during ELF parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    /// File too small for ELF header.
    TooSmall,
    /// Invalid ELF magic bytes.
    InvalidMagic,
    /// Class is neither 32-bit nor 64-bit.
    UnknownClass(u8),
    /// Data encoding is neither little- nor big-endian.
    UnknownDataEncoding(u8),
    /// Not an executable.
    NotExecutable,
    /// Program header table extends beyond file or has undersized entries.
    InvalidPhdrTable,
    /// Segment file data extends beyond file.
    SegmentOutOfBounds {
        /// Index of the offending program header.
        index: u16,
    },
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::TooSmall => write!(f, "file too small for an ELF header"),
            Self::InvalidMagic => write!(f, "not an ELF file"),
            Self::UnknownClass(class) => write!(f, "unknown ELF class {class}"),
            Self::UnknownDataEncoding(data) => write!(f, "unknown ELF data encoding {data}"),
            Self::NotExecutable => write!(f, "ELF file is not an executable"),
            Self::InvalidPhdrTable => write!(f, "program header table is out of bounds"),
            Self::SegmentOutOfBounds { index } => {
                write!(f, "segment {index} extends beyond the end of the file")
            }
        }
    }
}

impl std::error::Error for ElfError {}

/// Program header type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Unused entry.
    Null,
    /// Loadable segment.
    Load,
    /// Dynamic linking information.
    Dynamic,
    /// Interpreter path.
    Interp,
    /// Auxiliary information.
    Note,
    /// The program header table itself.
    Phdr,
    /// Thread-local storage template.
    Tls,
    /// Anything else, including OS and processor specific types.
    Other(u32),
}

impl SegmentKind {
    /// Classifies a raw `p_type`.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Null,
            1 => Self::Load,
            2 => Self::Dynamic,
            3 => Self::Interp,
            4 => Self::Note,
            6 => Self::Phdr,
            7 => Self::Tls,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Null => write!(f, "PT_NULL"),
            Self::Load => write!(f, "PT_LOAD"),
            Self::Dynamic => write!(f, "PT_DYNAMIC"),
            Self::Interp => write!(f, "PT_INTERP"),
            Self::Note => write!(f, "PT_NOTE"),
            Self::Phdr => write!(f, "PT_PHDR"),
            Self::Tls => write!(f, "PT_TLS"),
            Self::Other(raw) => write!(f, "{raw:#x}"),
        }
    }
}

/// One program header with its file contents.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    /// Segment type.
    pub kind: SegmentKind,
    /// Physical address. This is where the board loads the segment.
    pub paddr: u64,
    /// Segment data from the file.
    pub file_data: &'a [u8],
    /// Size in memory (may be larger than data for .bss).
    pub mem_size: u64,
}

/// Parsed ELF file.
#[derive(Debug)]
pub struct Elf<'a> {
    data: &'a [u8],
    format: WordFormat,
    layout: ClassLayout,
    file_type: u16,
    machine: u16,
    entry: u64,
    phoff: usize,
    phentsize: usize,
    phnum: u16,
}

impl<'a> Elf<'a> {
    /// Parse an ELF file from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a valid ELF executable or a
    /// program header points outside the file.
    pub fn parse(data: &'a [u8]) -> Result<Self, ElfError> {
        // Check minimum size for the identification bytes
        if data.len() < IDENT_LEN {
            return Err(ElfError::TooSmall);
        }

        // Validate magic
        if data[0..4] != ELF_MAGIC {
            return Err(ElfError::InvalidMagic);
        }

        let (width, layout) = match data[4] {
            ELFCLASS32 => (WordWidth::W32, ELF32_LAYOUT),
            ELFCLASS64 => (WordWidth::W64, ELF64_LAYOUT),
            class => return Err(ElfError::UnknownClass(class)),
        };

        let order = match data[5] {
            ELFDATA2LSB => ByteOrder::Little,
            ELFDATA2MSB => ByteOrder::Big,
            encoding => return Err(ElfError::UnknownDataEncoding(encoding)),
        };

        if data.len() < layout.header_size {
            return Err(ElfError::TooSmall);
        }

        let format = WordFormat::new(width, order);
        let fields = Fields { data, format };

        // Validate type (executable)
        if fields.half(16) != ET_EXEC {
            return Err(ElfError::NotExecutable);
        }

        let phoff = usize::try_from(fields.word(layout.phoff))
            .map_err(|_| ElfError::InvalidPhdrTable)?;
        let phentsize = fields.half(layout.phentsize) as usize;
        let phnum = fields.half(layout.phnum) as u16;

        // Validate program header table
        if phnum > 0 && phentsize < layout.phdr_size {
            return Err(ElfError::InvalidPhdrTable);
        }
        let phdr_end = phentsize
            .checked_mul(usize::from(phnum))
            .and_then(|size| phoff.checked_add(size))
            .ok_or(ElfError::InvalidPhdrTable)?;
        if phdr_end > data.len() {
            return Err(ElfError::InvalidPhdrTable);
        }

        let elf = Self {
            data,
            format,
            layout,
            file_type: fields.half(16) as u16,
            machine: fields.half(18) as u16,
            entry: fields.word(layout.entry),
            phoff,
            phentsize,
            phnum,
        };

        // Validate segment contents
        for index in 0..phnum {
            elf.file_range(index)
                .ok_or(ElfError::SegmentOutOfBounds { index })?;
        }

        Ok(elf)
    }

    /// Returns the entry point address.
    #[must_use]
    pub const fn entry_point(&self) -> u64 {
        self.entry
    }

    /// Returns the word width and byte order of the target.
    #[must_use]
    pub const fn word_format(&self) -> WordFormat {
        self.format
    }

    /// Returns the raw `e_machine` value.
    #[must_use]
    pub const fn machine(&self) -> u16 {
        self.machine
    }

    /// Returns the raw `e_type` value.
    #[must_use]
    pub const fn file_type(&self) -> u16 {
        self.file_type
    }

    /// Returns an iterator over all program headers, in file order.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'a>> + '_ {
        (0..self.phnum).filter_map(move |index| {
            let range = self.file_range(index)?;
            let phdr = self.fields(index);
            Some(Segment {
                kind: SegmentKind::from_raw(phdr.u32(0)),
                paddr: phdr.word(self.layout.p_paddr),
                file_data: &self.data[range],
                mem_size: phdr.word(self.layout.p_memsz),
            })
        })
    }

    /// Field reader positioned at program header `index`.
    fn fields(&self, index: u16) -> Fields<'a> {
        let offset = self.phoff + usize::from(index) * self.phentsize;
        Fields {
            data: &self.data[offset..],
            format: self.format,
        }
    }

    /// File byte range of segment `index`, if it lies inside the file.
    fn file_range(&self, index: u16) -> Option<core::ops::Range<usize>> {
        let phdr = self.fields(index);
        let offset = usize::try_from(phdr.word(self.layout.p_offset)).ok()?;
        let size = usize::try_from(phdr.word(self.layout.p_filesz)).ok()?;
        let end = offset.checked_add(size)?;
        (end <= self.data.len()).then_some(offset..end)
    }
}

/// Reads header fields in the file's byte order.
///
/// Callers check bounds before reading.
#[derive(Clone, Copy)]
struct Fields<'a> {
    data: &'a [u8],
    format: WordFormat,
}

impl Fields<'_> {
    /// Reads an unsigned integer of `len` bytes at `offset`.
    fn uint(&self, offset: usize, len: usize) -> u64 {
        let bytes = &self.data[offset..offset + len];
        let fold = |value: u64, byte: &u8| (value << 8) | u64::from(*byte);
        match self.format.order {
            ByteOrder::Little => bytes.iter().rev().fold(0, fold),
            ByteOrder::Big => bytes.iter().fold(0, fold),
        }
    }

    fn half(&self, offset: usize) -> u64 {
        self.uint(offset, 2)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "a 4-byte field always fits u32"
    )]
    fn u32(&self, offset: usize) -> u32 {
        self.uint(offset, 4) as u32
    }

    /// Reads an address-sized field.
    fn word(&self, offset: usize) -> u64 {
        self.uint(offset, self.format.size())
    }
}
