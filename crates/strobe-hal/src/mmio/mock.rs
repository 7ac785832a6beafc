// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock physical memory for testing.
//!
//! [`MockMemory`] simulates a region of physical address space backed by a
//! heap buffer. Windows mapped from it share that buffer, so values written
//! through one window are visible through the next, the way device registers
//! keep their state across separate mappings. The mock also counts live
//! windows so tests can check that every mapping is released.

use std::cell::Cell;
use std::io;
use std::rc::Rc;

use super::{MapError, PhysicalMemory, RegisterIndex, RegisterWindow};
use crate::PhysAddr;

/// A simulated region of physical memory.
#[derive(Debug, Clone)]
pub struct MockMemory {
    base: PhysAddr,
    words: Rc<[Cell<u32>]>,
    live: Rc<Cell<usize>>,
}

impl MockMemory {
    /// Create a zero-filled region of `size` bytes starting at `base`.
    ///
    /// `size` is rounded down to whole registers.
    #[must_use]
    pub fn new(base: PhysAddr, size: usize) -> Self {
        let words = (0..size / RegisterIndex::WIDTH)
            .map(|_| Cell::new(0))
            .collect();
        Self {
            base,
            words,
            live: Rc::new(Cell::new(0)),
        }
    }

    /// First physical address of the region.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysAddr {
        self.base
    }

    /// Region size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.words.len() * RegisterIndex::WIDTH
    }

    /// Number of windows mapped from this region that are still alive.
    #[must_use]
    pub fn live_windows(&self) -> usize {
        self.live.get()
    }

    /// Read the backing store directly, bypassing any window.
    ///
    /// Returns `None` for addresses outside the region or not 4-byte aligned.
    #[must_use]
    pub fn peek(&self, addr: PhysAddr) -> Option<u32> {
        self.word_at(addr).map(|word| self.words[word].get())
    }

    /// Write the backing store directly, as the hardware side would.
    ///
    /// Returns `false` if the address is outside the region or misaligned.
    #[must_use]
    pub fn poke(&self, addr: PhysAddr, value: u32) -> bool {
        let Some(word) = self.word_at(addr) else {
            return false;
        };
        self.words[word].set(value);
        true
    }

    /// Copy of the whole backing store.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u32> {
        self.words.iter().map(Cell::get).collect()
    }

    fn word_at(&self, addr: PhysAddr) -> Option<usize> {
        let offset = addr.as_u64().checked_sub(self.base.as_u64())?;
        let offset = usize::try_from(offset).ok()?;
        RegisterIndex::check(offset, self.size())
            .ok()
            .map(RegisterIndex::word)
    }
}

impl PhysicalMemory for MockMemory {
    type Window = MockWindow;

    fn map(&self, base: PhysAddr, len: usize) -> Result<MockWindow, MapError> {
        MapError::check_request(base, len)?;

        let first = base
            .as_u64()
            .checked_sub(self.base.as_u64())
            .and_then(|offset| usize::try_from(offset).ok());
        let fits = first
            .filter(|first| first % RegisterIndex::WIDTH == 0)
            .and_then(|first| first.checked_add(len))
            .is_some_and(|end| end <= self.size());
        let (Some(first), true) = (first, fits) else {
            return Err(MapError::Map {
                base,
                len,
                source: io::Error::from_raw_os_error(libc::EINVAL),
            });
        };

        self.live.set(self.live.get() + 1);
        Ok(MockWindow {
            words: Rc::clone(&self.words),
            first_word: first / RegisterIndex::WIDTH,
            len,
            live: Rc::clone(&self.live),
        })
    }
}

/// A window onto [`MockMemory`].
#[derive(Debug)]
pub struct MockWindow {
    words: Rc<[Cell<u32>]>,
    first_word: usize,
    len: usize,
    live: Rc<Cell<usize>>,
}

impl MockWindow {
    /// Release the window. Equivalent to dropping it.
    pub fn unmap(self) -> Result<(), MapError> {
        drop(self);
        Ok(())
    }
}

impl RegisterWindow for MockWindow {
    fn len(&self) -> usize {
        self.len
    }

    fn load(&self, index: RegisterIndex) -> u32 {
        self.words[self.first_word + index.word()].get()
    }

    fn store(&self, index: RegisterIndex, value: u32) {
        self.words[self.first_word + index.word()].set(value);
    }
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}
