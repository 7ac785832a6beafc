// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Memory-mapped register windows.
//!
//! A register window is a byte range of physical address space that has
//! been mapped into the process. Every access is a single aligned 32-bit
//! volatile load or store; hardware registers may change underneath us and
//! reads or writes may have side effects, so nothing is cached or elided.
//!
//! Backends implement [`RegisterWindow`] by providing raw `load`/`store` on a
//! [`RegisterIndex`]. An index can only be produced by the crate's bounds and
//! alignment check, so callers never reach a backend with an unchecked
//! offset.
//!
//! - `range` - `/dev/mem` mapping ([`RegisterRange`], [`DevMem`])
//! - `mock` - heap-backed memory for host tests ([`MockMemory`])

use std::io;
use std::path::PathBuf;

use crate::PhysAddr;

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(target_os = "linux")]
mod range;


#[cfg(any(test, feature = "mock"))]
pub use mock::{MockMemory, MockWindow};
#[cfg(target_os = "linux")]
pub use range::{DEV_GPIOMEM, DEV_MEM, DevMem, RegisterRange, page_size};

/// A validated register location inside a window.
///
/// Holds the word index (byte offset / 4). Only this crate's bounds and
/// alignment check can construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterIndex(usize);

impl RegisterIndex {
    /// Register width in bytes.
    pub const WIDTH: usize = core::mem::size_of::<u32>();

    /// Validate a byte offset against a window of `len` bytes.
    ///
    /// The offset must be 4-byte aligned and the whole register must lie
    /// inside the window.
    pub(crate) const fn check(offset: usize, len: usize) -> Result<Self, AccessError> {
        if offset % Self::WIDTH != 0 {
            return Err(AccessError::Misaligned { offset });
        }
        match offset.checked_add(Self::WIDTH) {
            Some(end) if end <= len => Ok(Self(offset / Self::WIDTH)),
            _ => Err(AccessError::OutOfBounds { offset, len }),
        }
    }

    /// Index of the register in 32-bit words from the start of the window.
    #[inline]
    #[must_use]
    pub const fn word(self) -> usize {
        self.0
    }

    /// Byte offset of the register from the start of the window.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0 * Self::WIDTH
    }
}

/// Rejected register offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Offset is not a multiple of the register width.
    #[error("register offset {offset:#x} is not 4-byte aligned")]
    Misaligned {
        /// Requested byte offset.
        offset: usize,
    },
    /// Register would extend past the end of the window.
    #[error("register offset {offset:#x} is outside a {len:#x}-byte window")]
    OutOfBounds {
        /// Requested byte offset.
        offset: usize,
        /// Window length in bytes.
        len: usize,
    },
}

/// Errors that can occur while mapping or unmapping a register window.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Zero-length windows cannot be mapped.
    #[error("cannot map an empty register range")]
    EmptyRange,
    /// Base address is not 4-byte aligned, so no register could be accessed.
    #[error("register range base {base} is not 4-byte aligned")]
    MisalignedBase {
        /// Requested base address.
        base: PhysAddr,
    },
    /// Base plus length does not fit the address space.
    #[error("register range {base}+{len:#x} overflows the physical address space")]
    RangeOverflow {
        /// Requested base address.
        base: PhysAddr,
        /// Requested length in bytes.
        len: usize,
    },
    /// The physical memory device could not be opened.
    #[error("failed to open {}", path.display())]
    Open {
        /// Device path.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The kernel refused the mapping.
    #[error("failed to map {len:#x} bytes at {base}")]
    Map {
        /// Requested base address.
        base: PhysAddr,
        /// Requested length in bytes.
        len: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The kernel refused to release the mapping.
    #[error("failed to unmap register range at {base}")]
    Unmap {
        /// Base address of the window.
        base: PhysAddr,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl MapError {
    /// Validate a requested window before touching the OS.
    pub(crate) fn check_request(base: PhysAddr, len: usize) -> Result<(), Self> {
        if len == 0 {
            return Err(Self::EmptyRange);
        }
        if base.is_aligned(RegisterIndex::WIDTH as u64) != Some(true) {
            return Err(Self::MisalignedBase { base });
        }
        let end = u64::try_from(len)
            .ok()
            .and_then(|len| base.checked_add(len));
        if end.is_none() {
            return Err(Self::RangeOverflow { base, len });
        }
        Ok(())
    }
}

/// An aligned 32-bit register window.
///
/// Implementors provide raw access on validated indices; callers use the
/// offset-based methods. `get` and `set` absorb invalid offsets silently
/// (read as zero, write dropped) unless the `strict-offsets` feature is
/// enabled, in which case they panic. `try_get` and `try_set` always report
/// the violation.
pub trait RegisterWindow {
    /// Window length in bytes.
    fn len(&self) -> usize;

    /// Whether the window has no addressable bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Volatile load of a validated register.
    fn load(&self, index: RegisterIndex) -> u32;

    /// Volatile store to a validated register.
    fn store(&self, index: RegisterIndex, value: u32);

    /// Read the register at `offset`, or `0` if the offset is invalid.
    #[inline]
    fn get(&self, offset: usize) -> u32 {
        absorb(offset, self.len()).map_or(0, |index| self.load(index))
    }

    /// Write the register at `offset`; invalid offsets are ignored.
    #[inline]
    fn set(&self, offset: usize, value: u32) {
        if let Some(index) = absorb(offset, self.len()) {
            self.store(index, value);
        }
    }

    /// Read the register at `offset`, reporting invalid offsets.
    #[inline]
    fn try_get(&self, offset: usize) -> Result<u32, AccessError> {
        RegisterIndex::check(offset, self.len()).map(|index| self.load(index))
    }

    /// Write the register at `offset`, reporting invalid offsets.
    #[inline]
    fn try_set(&self, offset: usize, value: u32) -> Result<(), AccessError> {
        RegisterIndex::check(offset, self.len()).map(|index| self.store(index, value))
    }

    /// Replace the bits selected by `mask` with the matching bits of `bits`.
    ///
    /// Performs one load and one store. Invalid offsets are ignored like
    /// [`RegisterWindow::set`].
    #[inline]
    fn modify(&self, offset: usize, mask: u32, bits: u32) {
        if let Some(index) = absorb(offset, self.len()) {
            let current = self.load(index);
            self.store(index, (current & !mask) | (bits & mask));
        }
    }
}

/// Source of register windows over physical memory.
pub trait PhysicalMemory {
    /// Window type produced by this mapper.
    type Window: RegisterWindow;

    /// Map `len` bytes of physical memory starting at `base`.
    fn map(&self, base: PhysAddr, len: usize) -> Result<Self::Window, MapError>;
}

/// Offset check for the silent accessors.
#[inline]
fn absorb(offset: usize, len: usize) -> Option<RegisterIndex> {
    match RegisterIndex::check(offset, len) {
        Ok(index) => Some(index),
        Err(err) => {
            if cfg!(feature = "strict-offsets") {
                panic!("register access rejected: {err}");
            }
            None
        }
    }
}
