// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the subcommands.
//!
//! Register commands run against a temporary file standing in for the
//! physical memory device, mapped from offset 0.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use strobe_hal::Board;
use strobe_hal::mmio::page_size;
use tempfile::NamedTempFile;

use super::*;

fn device() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    file.as_file()
        .set_len(u64::try_from(page_size()).unwrap())
        .unwrap();
    file
}

fn window(device: &Path, len: usize) -> WindowArgs {
    WindowArgs {
        board: Board::Bcm2836,
        device: device.to_path_buf(),
        base: Some(0),
        len: Some(len),
    }
}

fn file_word(path: &Path, offset: usize) -> u32 {
    let bytes = fs::read(path).unwrap();
    let word: [u8; 4] = bytes[offset..offset + 4].try_into().unwrap();
    u32::from_ne_bytes(word)
}

// ============================================================================
// peek / poke
// ============================================================================

#[test]
fn poke_writes_through_device() {
    let dev = device();
    let args = PokeArgs {
        window: window(dev.path(), 0xB4),
        offset: 0x1C,
        value: 0xDEAD_BEEF,
    };
    poke(&args).unwrap();
    assert_eq!(file_word(dev.path(), 0x1C), 0xDEAD_BEEF);
    assert_eq!(file_word(dev.path(), 0x18), 0);
}

#[test]
fn peek_reads_existing_value() {
    let dev = device();
    let mut bytes = vec![0u8; page_size()];
    bytes[0x34..0x38].copy_from_slice(&0x8000_0000u32.to_ne_bytes());
    fs::write(dev.path(), &bytes).unwrap();

    let args = PeekArgs {
        window: window(dev.path(), 0xB4),
        offset: 0x34,
    };
    peek(&args).unwrap();
}

#[test]
fn peek_outside_window_is_an_error() {
    let dev = device();
    let args = PeekArgs {
        window: window(dev.path(), 0x10),
        offset: 0x10,
    };
    let err = peek(&args).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("cannot read register"), "{message}");
    assert!(message.contains("outside a 0x10-byte window"), "{message}");
}

#[test]
fn poke_misaligned_offset_leaves_device_untouched() {
    let dev = device();
    let args = PokeArgs {
        window: window(dev.path(), 0x10),
        offset: 2,
        value: u32::MAX,
    };
    let err = poke(&args).unwrap_err();
    assert!(format!("{err:#}").contains("not 4-byte aligned"));
    assert!(fs::read(dev.path()).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn missing_device_reports_path() {
    let args = PeekArgs {
        window: window(Path::new("/nonexistent/strobe-mem"), 0x10),
        offset: 0,
    };
    let message = format!("{:#}", peek(&args).unwrap_err());
    assert!(message.contains("cannot map 0x10 bytes at 0x0"), "{message}");
    assert!(message.contains("/nonexistent/strobe-mem"), "{message}");
}

// ============================================================================
// tick
// ============================================================================

#[test]
fn tick_runs_requested_waits() {
    let args = TickArgs {
        period_ns: 1_000_000,
        count: 3,
        stall_ns: Some(2_500_000),
    };
    tick(&args).unwrap();
}

#[test]
fn tick_rejects_zero_period() {
    let args = TickArgs {
        period_ns: 0,
        count: 1,
        stall_ns: None,
    };
    let message = format!("{:#}", tick(&args).unwrap_err());
    assert!(message.contains("cannot create timer"), "{message}");
}

#[test]
fn expected_elapsed_scales_with_ticks() {
    let period = Duration::from_millis(10);
    assert_eq!(expected_elapsed(period, 0), Duration::ZERO);
    assert_eq!(expected_elapsed(period, 7), Duration::from_millis(70));
    assert_eq!(expected_elapsed(period, u64::MAX), period * u32::MAX);
}

#[test]
fn drift_is_signed_milliseconds() {
    let late = drift_ms(Duration::from_millis(105), Duration::from_millis(100));
    assert!((late - 5.0).abs() < 1e-9, "{late}");
    let early = drift_ms(Duration::from_micros(99_500), Duration::from_millis(100));
    assert!((early + 0.5).abs() < 1e-9, "{early}");
}
