// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! End-to-end checks on a Raspberry Pi 2/3.
//!
//! These map real peripheral memory and need root, so they are ignored by
//! default. Run on the target with:
//!
//! ```text
//! sudo -E cargo test -p strobe-hal --test hardware_test -- --ignored
//! ```

#![cfg(target_os = "linux")]
#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use strobe_hal::{PhysAddr, RegisterRange, RegisterWindow};

const GPIO_BASE: PhysAddr = PhysAddr::new(0x3F20_0000);

#[test]
#[ignore = "requires /dev/mem on a BCM2836/7 board"]
fn gpio_window_round_trip() {
    let range = RegisterRange::map(GPIO_BASE, 4096).unwrap();
    let saved = range.get(0);

    range.set(0, 0xFFFF_FFFF);
    assert_eq!(range.get(0), 0xFFFF_FFFF);
    assert_eq!(range.get(4096), 0);

    range.set(0, saved);
    range.unmap().unwrap();
}
