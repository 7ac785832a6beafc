// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the board address map.

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn gpio_base_per_board() {
    assert_eq!(Board::Bcm2835.gpio_base(), PhysAddr::new(0x2020_0000));
    assert_eq!(Board::Bcm2836.gpio_base(), PhysAddr::new(0x3F20_0000));
    assert_eq!(Board::Bcm2711.gpio_base(), PhysAddr::new(0xFE20_0000));
}

#[test]
fn gpio_base_is_page_aligned() {
    for board in Board::ALL {
        assert_eq!(board.gpio_base().is_aligned(4096), Some(true), "{board}");
    }
}

#[test]
fn parse_aliases() {
    assert_eq!("pi1".parse::<Board>().unwrap(), Board::Bcm2835);
    assert_eq!("PiZero".parse::<Board>().unwrap(), Board::Bcm2835);
    assert_eq!("bcm2837".parse::<Board>().unwrap(), Board::Bcm2836);
    assert_eq!("pi3".parse::<Board>().unwrap(), Board::Bcm2836);
    assert_eq!("BCM2711".parse::<Board>().unwrap(), Board::Bcm2711);
}

#[test]
fn parse_round_trips_name() {
    for board in Board::ALL {
        assert_eq!(board.name().parse::<Board>().unwrap(), board);
    }
}

#[test]
fn parse_unknown_board() {
    let err = "pi5".parse::<Board>().unwrap_err();
    assert!(err.to_string().starts_with("unknown board `pi5`"));
}

#[cfg(not(any(feature = "pi1", feature = "pi4")))]
#[test]
fn default_board_is_bcm2836() {
    assert_eq!(Board::default(), Board::Bcm2836);
}
