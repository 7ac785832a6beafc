// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Physical memory windows mapped through `/dev/mem`.
//!
//! The device file is only needed while the mapping is established; it is
//! closed before [`DevMem::map`] returns and the mapping stays valid until
//! the [`RegisterRange`] is unmapped or dropped.

#![allow(unsafe_code)] // mmap/munmap and volatile register access

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

use tracing::{debug, error, warn};

#[cfg(target_env = "gnu")]
use libc::{mmap64 as mmap, off64_t as off_t};
#[cfg(not(target_env = "gnu"))]
use libc::{mmap, off_t};

use super::{MapError, PhysicalMemory, RegisterIndex, RegisterWindow};
use crate::PhysAddr;

/// Full physical memory device (requires root or `CAP_SYS_RAWIO`).
pub const DEV_MEM: &str = "/dev/mem";

/// GPIO-only memory device exposed by the Raspberry Pi kernel.
///
/// Accessible to members of the `gpio` group. The kernel maps the GPIO
/// block regardless of the requested offset, so pass offset-0 windows.
pub const DEV_GPIOMEM: &str = "/dev/gpiomem";

/// Fallback when `sysconf` cannot report the page size.
const DEFAULT_PAGE_SIZE: usize = 4096;

/// Size of a virtual memory page on this system.
#[must_use]
pub fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size)
        .ok()
        .filter(|size| size.is_power_of_two())
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// A mapper backed by a physical memory device file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevMem {
    path: PathBuf,
}

impl DevMem {
    /// Mapper over `/dev/mem`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(DEV_MEM)
    }

    /// Mapper over `/dev/gpiomem`.
    #[must_use]
    pub fn gpiomem() -> Self {
        Self::with_path(DEV_GPIOMEM)
    }

    /// Mapper over any mappable file.
    ///
    /// Offsets into the file play the role of physical addresses.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Device path this mapper opens.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File, MapError> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&self.path)
            .map_err(|source| {
                warn!(path = %self.path.display(), %source, "cannot open physical memory device");
                MapError::Open {
                    path: self.path.clone(),
                    source,
                }
            })
    }
}

impl Default for DevMem {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicalMemory for DevMem {
    type Window = RegisterRange;

    fn map(&self, base: PhysAddr, len: usize) -> Result<RegisterRange, MapError> {
        MapError::check_request(base, len)?;

        let page = page_size() as u64;
        let map_base = base.align_down(page).unwrap_or(base);
        let lead = usize::try_from(base.offset_in(page).unwrap_or(0))
            .map_err(|_| MapError::RangeOverflow { base, len })?;
        let mapped_len = lead
            .checked_add(len)
            .ok_or(MapError::RangeOverflow { base, len })?;
        let file_offset = off_t::try_from(map_base.as_u64())
            .map_err(|_| MapError::RangeOverflow { base, len })?;

        let file = self.open()?;
        // SAFETY: a fresh shared mapping at a kernel-chosen address; the
        // descriptor is valid for the duration of the call.
        let mapping = unsafe {
            mmap(
                ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        };
        let map_err = io::Error::last_os_error();
        drop(file);

        if mapping == libc::MAP_FAILED {
            warn!(%base, len, source = %map_err, "mmap of register range failed");
            return Err(MapError::Map {
                base,
                len,
                source: map_err,
            });
        }
        let Some(mapping) = NonNull::new(mapping.cast::<u8>()) else {
            return Err(MapError::Map {
                base,
                len,
                source: io::Error::from(io::ErrorKind::AddrNotAvailable),
            });
        };
        // SAFETY: `lead < page` and the mapping covers `lead + len` bytes.
        // `base` is 4-byte aligned and the mapping is page aligned, so the
        // first register is 4-byte aligned too.
        let regs = unsafe { mapping.add(lead) }.cast::<u32>();

        debug!(%base, len, device = %self.path.display(), "mapped register range");
        Ok(RegisterRange {
            mapping,
            mapped_len,
            regs,
            base,
            len,
        })
    }
}

/// An exclusively owned mapping of physical registers.
///
/// Dropping the range unmaps it; [`RegisterRange::unmap`] does the same and
/// reports failure. The range is `Send` so it can be handed to the refresh
/// thread, but not `Sync`: concurrent access must be arranged by the owner.
#[derive(Debug)]
pub struct RegisterRange {
    /// Page-aligned start of the mapping.
    mapping: NonNull<u8>,
    /// Bytes mapped from `mapping`.
    mapped_len: usize,
    /// Register at offset 0, i.e. at physical address `base`.
    regs: NonNull<u32>,
    base: PhysAddr,
    len: usize,
}

// SAFETY: the mapping is process-wide and owned exclusively by this value;
// nothing ties it to the creating thread.
unsafe impl Send for RegisterRange {}

impl RegisterRange {
    /// Map `len` bytes of physical memory at `base` through `/dev/mem`.
    pub fn map(base: PhysAddr, len: usize) -> Result<Self, MapError> {
        DevMem::new().map(base, len)
    }

    /// Physical address of offset 0.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysAddr {
        self.base
    }

    /// Release the mapping.
    pub fn unmap(self) -> Result<(), MapError> {
        let range = core::mem::ManuallyDrop::new(self);
        range.release()
    }

    fn release(&self) -> Result<(), MapError> {
        // SAFETY: `mapping`/`mapped_len` describe a live mapping created in
        // `DevMem::map`, and this is the only place that releases it.
        let rc = unsafe { libc::munmap(self.mapping.as_ptr().cast(), self.mapped_len) };
        if rc == 0 {
            debug!(base = %self.base, len = self.len, "unmapped register range");
            Ok(())
        } else {
            Err(MapError::Unmap {
                base: self.base,
                source: io::Error::last_os_error(),
            })
        }
    }
}

impl RegisterWindow for RegisterRange {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn load(&self, index: RegisterIndex) -> u32 {
        // SAFETY: `index` was checked against `len`, which lies inside the
        // mapping, and the pointer is 4-byte aligned.
        unsafe { self.regs.add(index.word()).read_volatile() }
    }

    #[inline]
    fn store(&self, index: RegisterIndex, value: u32) {
        // SAFETY: as in `load`.
        unsafe { self.regs.add(index.word()).write_volatile(value) }
    }
}

impl Drop for RegisterRange {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            error!(%err, "failed to release register range");
        }
    }
}
