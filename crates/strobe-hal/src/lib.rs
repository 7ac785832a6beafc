// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # strobe-hal
//!
//! Hardware-access primitives for a GPIO-driven multiplexed display.
//!
//! A multiplexed panel only lights one row group at a time, so the driver
//! above this crate must re-strobe the GPIO lines at a fixed cadence. It
//! needs exactly two things from the platform:
//!
//! - [`mmio`]: a mapped window of physical address space with aligned,
//!   bounds-checked, volatile 32-bit register access ([`RegisterRange`]).
//! - [`timer`]: a kernel-scheduled repeating timer on the monotonic clock
//!   that reports coalesced ticks ([`PeriodicTimer`]).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Display orchestration (caller)             │
//! │     wait for tick ──▶ write GPIO set/clear registers    │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌─────────────────────┐      ┌─────────────────────────────┐
//! │  `PeriodicTimer`    │      │   `RegisterWindow` trait    │
//! │  (timerfd)          │      │        ▲            ▲       │
//! └─────────────────────┘      │ `RegisterRange` `MockWindow`│
//!                              │ (/dev/mem)       (heap)     │
//!                              └─────────────────────────────┘
//! ```
//!
//! The two halves are independent; neither depends on the other.

#![deny(unsafe_code)]


pub mod board;
pub mod mmio;
#[cfg(target_os = "linux")]
pub mod timer;
pub mod types;

pub use board::Board;
#[cfg(target_os = "linux")]
pub use mmio::{DevMem, RegisterRange};
#[cfg(any(test, feature = "mock"))]
pub use mmio::{MockMemory, MockWindow};
pub use mmio::{AccessError, MapError, PhysicalMemory, RegisterIndex, RegisterWindow};
#[cfg(target_os = "linux")]
pub use timer::{PeriodicTimer, TickStats, TimerError};
pub use types::PhysAddr;

/// Crate version for runtime queries.
///
/// Uses the git-derived version from `STROBE_VERSION` when available,
/// falling back to the Cargo package version.
pub const VERSION: &str = match option_env!("STROBE_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
