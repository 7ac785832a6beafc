// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Board peripheral address map.
//!
//! The GPIO controller sits at a fixed offset from the peripheral base, but
//! the peripheral base itself moved between chip generations. The default
//! board is selected at compile time:
//!
//! ```text
//! cargo build                     # Bcm2836 (Pi 2/3), peripherals at 0x3F000000
//! cargo build --features pi1      # Bcm2835 (Pi 1/Zero), peripherals at 0x20000000
//! cargo build --features pi4      # Bcm2711 (Pi 4), peripherals at 0xFE000000
//! ```

use core::fmt;
use core::str::FromStr;

use crate::PhysAddr;

#[cfg(test)]
mod board_test;

/// Offset of the GPIO controller from the peripheral base.
pub const GPIO_OFFSET: u64 = 0x20_0000;

/// Broadcom chip families with a memory-mapped GPIO controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    /// BCM2835: Raspberry Pi 1 and Zero.
    Bcm2835,
    /// BCM2836/BCM2837: Raspberry Pi 2 and 3.
    Bcm2836,
    /// BCM2711: Raspberry Pi 4.
    Bcm2711,
}

impl Board {
    /// Board selected by Cargo features.
    pub const DEFAULT: Self = if cfg!(feature = "pi4") {
        Self::Bcm2711
    } else if cfg!(feature = "pi1") {
        Self::Bcm2835
    } else {
        Self::Bcm2836
    };

    /// Every supported board.
    pub const ALL: [Self; 3] = [Self::Bcm2835, Self::Bcm2836, Self::Bcm2711];

    /// Physical base address of the peripheral bus as seen by the ARM core.
    #[inline]
    #[must_use]
    pub const fn peripheral_base(self) -> PhysAddr {
        match self {
            Self::Bcm2835 => PhysAddr::new(0x2000_0000),
            Self::Bcm2836 => PhysAddr::new(0x3F00_0000),
            Self::Bcm2711 => PhysAddr::new(0xFE00_0000),
        }
    }

    /// Physical address of the GPIO register block.
    #[inline]
    #[must_use]
    pub const fn gpio_base(self) -> PhysAddr {
        self.peripheral_base().wrapping_add(GPIO_OFFSET)
    }

    /// Size in bytes of the GPIO register block.
    ///
    /// The BCM2711 appends the pull-up/down control registers after the
    /// legacy block.
    #[inline]
    #[must_use]
    pub const fn gpio_window_len(self) -> usize {
        match self {
            Self::Bcm2835 | Self::Bcm2836 => 0xB4,
            Self::Bcm2711 => 0xF4,
        }
    }

    /// Chip name, as accepted by `FromStr`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bcm2835 => "bcm2835",
            Self::Bcm2836 => "bcm2836",
            Self::Bcm2711 => "bcm2711",
        }
    }

    /// Boards this chip ships on, for display.
    #[must_use]
    pub const fn models(self) -> &'static str {
        match self {
            Self::Bcm2835 => "Raspberry Pi 1, Zero",
            Self::Bcm2836 => "Raspberry Pi 2, 3",
            Self::Bcm2711 => "Raspberry Pi 4",
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a board name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown board `{0}` (expected bcm2835, bcm2836, bcm2837, bcm2711 or pi1..pi4)")]
pub struct ParseBoardError(String);

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bcm2835" | "pi1" | "pizero" => Ok(Self::Bcm2835),
            "bcm2836" | "bcm2837" | "pi2" | "pi3" => Ok(Self::Bcm2836),
            "bcm2711" | "pi4" => Ok(Self::Bcm2711),
            _ => Err(ParseBoardError(s.to_owned())),
        }
    }
}
