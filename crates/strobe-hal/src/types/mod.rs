// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Address types shared by the register backends and the board map.

mod addr;

#[cfg(test)]
mod addr_test;

pub use addr::PhysAddr;
