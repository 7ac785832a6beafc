// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the periodic timer.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn stats_count_overruns() {
    let mut stats = TickStats::default();
    stats.record(1);
    stats.record(3);
    stats.record(1);
    assert_eq!(
        stats,
        TickStats {
            waits: 3,
            ticks: 5,
            overruns: 2,
        }
    );
}

#[test]
fn stats_do_not_underflow_on_zero_ticks() {
    let mut stats = TickStats::default();
    stats.record(0);
    assert_eq!(stats.overruns, 0);
    assert_eq!(stats.waits, 1);
}

#[test]
fn timespec_splits_seconds() {
    let spec = timespec(2_500_000_000).unwrap();
    assert_eq!(spec.tv_sec, 2);
    assert_eq!(spec.tv_nsec, 500_000_000);
}

#[test]
fn timespec_sub_second() {
    let spec = timespec(694_444).unwrap();
    assert_eq!(spec.tv_sec, 0);
    assert_eq!(spec.tv_nsec, 694_444);
}

#[test]
fn zero_period_is_rejected() {
    assert!(matches!(
        PeriodicTimer::create(0),
        Err(TimerError::ZeroPeriod)
    ));
    assert!(matches!(
        PeriodicTimer::from_duration(Duration::ZERO),
        Err(TimerError::ZeroPeriod)
    ));
}

#[test]
fn create_reports_period() {
    let timer = PeriodicTimer::from_duration(Duration::from_millis(3)).unwrap();
    assert_eq!(timer.period(), Duration::from_millis(3));
    assert_eq!(timer.stats(), TickStats::default());
    assert!(!timer.is_destroyed());
}

#[test]
fn wait_after_destroy_returns_sentinel() {
    let mut timer = PeriodicTimer::create(1_000_000).unwrap();
    timer.destroy();
    assert!(timer.is_destroyed());
    assert_eq!(timer.wait(), 0);
    assert!(matches!(timer.try_wait(), Err(TimerError::Destroyed)));
    timer.destroy();
    assert_eq!(timer.stats().waits, 0);
}

#[test]
fn wait_records_stats() {
    let mut timer = PeriodicTimer::create(1_000_000).unwrap();
    let ticks = timer.wait();
    assert!(ticks >= 1);
    let stats = timer.stats();
    assert_eq!(stats.waits, 1);
    assert_eq!(stats.ticks, ticks);
}

#[test]
fn error_display() {
    assert_eq!(
        TimerError::ZeroPeriod.to_string(),
        "timer period must be non-zero"
    );
    assert_eq!(
        TimerError::PeriodOutOfRange { period_ns: 7 }.to_string(),
        "timer period of 7ns cannot be represented"
    );
}

#[test]
fn oversized_duration_reports_requested_period() {
    let err = PeriodicTimer::from_duration(Duration::MAX).unwrap_err();
    assert!(matches!(
        err,
        TimerError::DurationOutOfRange { period } if period == Duration::MAX
    ));
}
