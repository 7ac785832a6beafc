// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the physical address type.

use super::PhysAddr;

#[test]
fn display_is_hex() {
    assert_eq!(format!("{}", PhysAddr::new(0x3F20_0000)), "0x3f200000");
    assert_eq!(format!("{:?}", PhysAddr::new(0x10)), "PhysAddr(0x10)");
}

#[test]
fn checked_add_detects_overflow() {
    assert_eq!(
        PhysAddr::new(0x1000).checked_add(0x20),
        Some(PhysAddr::new(0x1020))
    );
    assert_eq!(PhysAddr::new(u64::MAX).checked_add(1), None);
}

#[test]
fn add_operator_matches_method() {
    let base = PhysAddr::new(0x3F00_0000);
    assert_eq!(base + 0x20_0000, PhysAddr::new(0x3F20_0000));
}

#[test]
fn align_down_to_page() {
    let addr = PhysAddr::new(0x3F20_0abc);
    assert_eq!(addr.align_down(4096), Some(PhysAddr::new(0x3F20_0000)));
    assert_eq!(addr.offset_in(4096), Some(0xabc));
}

#[test]
fn alignment_must_be_power_of_two() {
    let addr = PhysAddr::new(0x1000);
    assert_eq!(addr.align_down(0), None);
    assert_eq!(addr.align_down(3), None);
    assert_eq!(addr.offset_in(12), None);
    assert_eq!(addr.is_aligned(0), None);
}

#[test]
fn is_aligned() {
    assert_eq!(PhysAddr::new(0x1000).is_aligned(4096), Some(true));
    assert_eq!(PhysAddr::new(0x1004).is_aligned(4), Some(true));
    assert_eq!(PhysAddr::new(0x1002).is_aligned(4), Some(false));
}
