// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Periodic refresh timer.
//!
//! Wraps a Linux `timerfd` on `CLOCK_MONOTONIC`. The kernel keeps counting
//! expirations whether or not anyone is waiting, and a read returns how many
//! periods passed since the previous read. A count above one means the
//! refresh loop fell behind and the kernel coalesced the missed ticks.

#![allow(unsafe_code)] // timerfd syscalls

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::ptr;
use std::time::Duration;

use tracing::{debug, warn};

#[cfg(test)]
mod timer_test;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Errors from creating or waiting on a [`PeriodicTimer`].
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// A zero period would disarm the timer.
    #[error("timer period must be non-zero")]
    ZeroPeriod,
    /// The period does not fit the platform's `timespec`.
    #[error("timer period of {period_ns}ns cannot be represented")]
    PeriodOutOfRange {
        /// Requested period in nanoseconds.
        period_ns: u64,
    },
    /// The period exceeds what a nanosecond count can hold.
    #[error("timer period of {period:?} cannot be represented")]
    DurationOutOfRange {
        /// Requested period.
        period: Duration,
    },
    /// The kernel could not allocate a timer.
    #[error("failed to create monotonic timer")]
    Create {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The kernel rejected the timer configuration.
    #[error("failed to arm timer with a {period_ns}ns period")]
    Configure {
        /// Requested period in nanoseconds.
        period_ns: u64,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The timer was destroyed before this wait.
    #[error("timer has been destroyed")]
    Destroyed,
    /// Reading the expiration count failed.
    #[error("failed to read timer expirations")]
    Read {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Counters accumulated across successful waits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Successful waits.
    pub waits: u64,
    /// Periods elapsed across all waits.
    pub ticks: u64,
    /// Periods beyond the first in each wait, i.e. missed refreshes.
    pub overruns: u64,
}

impl TickStats {
    /// Account for one wait that observed `ticks` periods.
    pub const fn record(&mut self, ticks: u64) {
        self.waits = self.waits.saturating_add(1);
        self.ticks = self.ticks.saturating_add(ticks);
        self.overruns = self.overruns.saturating_add(ticks.saturating_sub(1));
    }
}

/// A repeating monotonic timer.
///
/// Fires every period from creation onward. [`PeriodicTimer::wait`] blocks
/// until at least one period has elapsed since the previous wait and returns
/// the number of elapsed periods.
#[derive(Debug)]
pub struct PeriodicTimer {
    /// `None` once destroyed.
    timer: Option<File>,
    period: Duration,
    stats: TickStats,
}

impl PeriodicTimer {
    /// Create a timer that fires every `period_ns` nanoseconds.
    pub fn create(period_ns: u64) -> Result<Self, TimerError> {
        if period_ns == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        let interval = timespec(period_ns)?;

        // SAFETY: timerfd_create has no memory preconditions.
        let raw = unsafe { libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_CLOEXEC) };
        if raw < 0 {
            let source = io::Error::last_os_error();
            warn!(%source, "timerfd_create failed");
            return Err(TimerError::Create { source });
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let spec = libc::itimerspec {
            it_interval: interval,
            it_value: interval,
        };
        // SAFETY: `spec` outlives the call and the old value is not requested.
        let rc = unsafe {
            libc::timerfd_settime(fd.as_raw_fd(), 0, &raw const spec, ptr::null_mut())
        };
        if rc < 0 {
            let source = io::Error::last_os_error();
            warn!(period_ns, %source, "timerfd_settime failed");
            return Err(TimerError::Configure { period_ns, source });
        }

        debug!(period_ns, "created periodic timer");
        Ok(Self {
            timer: Some(File::from(fd)),
            period: Duration::from_nanos(period_ns),
            stats: TickStats::default(),
        })
    }

    /// Create a timer from a [`Duration`].
    pub fn from_duration(period: Duration) -> Result<Self, TimerError> {
        let period_ns = u64::try_from(period.as_nanos())
            .map_err(|_| TimerError::DurationOutOfRange { period })?;
        Self::create(period_ns)
    }

    /// Configured period.
    #[inline]
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Counters for all successful waits so far.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> TickStats {
        self.stats
    }

    /// Whether [`PeriodicTimer::destroy`] has been called.
    #[inline]
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.timer.is_none()
    }

    /// Block until the next tick and return the number of elapsed periods.
    ///
    /// Returns `0` if the timer was destroyed or the read failed. Use
    /// [`PeriodicTimer::try_wait`] to tell those cases apart.
    pub fn wait(&mut self) -> u64 {
        self.try_wait().unwrap_or(0)
    }

    /// Block until the next tick and return the number of elapsed periods.
    pub fn try_wait(&mut self) -> Result<u64, TimerError> {
        let timer = self.timer.as_mut().ok_or(TimerError::Destroyed)?;
        let mut count = [0u8; 8];
        timer
            .read_exact(&mut count)
            .map_err(|source| TimerError::Read { source })?;
        let ticks = u64::from_ne_bytes(count);
        self.stats.record(ticks);
        Ok(ticks)
    }

    /// Release the kernel timer.
    ///
    /// Later waits return the error sentinel. Calling this twice is harmless.
    pub fn destroy(&mut self) {
        if self.timer.take().is_some() {
            debug!(period = ?self.period, "destroyed periodic timer");
        }
    }
}

/// Split a nanosecond period into a `timespec`.
fn timespec(period_ns: u64) -> Result<libc::timespec, TimerError> {
    let out_of_range = |_| TimerError::PeriodOutOfRange { period_ns };
    let secs = libc::time_t::try_from(period_ns / NANOS_PER_SEC).map_err(out_of_range)?;
    let nanos = libc::c_long::try_from(period_ns % NANOS_PER_SEC).map_err(out_of_range)?;

    // SAFETY: timespec is plain old data; some targets carry padding fields
    // that a struct literal could not name.
    let mut spec: libc::timespec = unsafe { core::mem::zeroed() };
    spec.tv_sec = secs;
    spec.tv_nsec = nanos;
    Ok(spec)
}
