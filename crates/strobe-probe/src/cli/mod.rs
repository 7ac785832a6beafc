// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Command-line interface.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use strobe_hal::mmio::{DEV_GPIOMEM, DEV_MEM};
use strobe_hal::{Board, DevMem, PhysAddr};


/// Inspect display hardware from the shell
#[derive(Debug, Parser)]
#[command(name = "strobe-probe", version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the board's peripheral address map
    Info(InfoArgs),
    /// Read one 32-bit register
    Peek(PeekArgs),
    /// Write one 32-bit register and read it back
    Poke(PokeArgs),
    /// Run the periodic timer and report tick statistics
    Tick(TickArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Chip or model (bcm2835, bcm2836, bcm2711, pi1..pi4)
    #[arg(short, long, default_value_t = Board::DEFAULT)]
    pub board: Board,
}

/// Which physical window to map.
#[derive(Debug, Args)]
pub struct WindowArgs {
    /// Chip or model; selects the default base and length
    #[arg(short, long, default_value_t = Board::DEFAULT)]
    pub board: Board,

    /// Physical memory device
    #[arg(short, long, default_value = DEV_MEM)]
    pub device: PathBuf,

    /// Physical base address [default: the board's GPIO block]
    #[arg(long, value_parser = parse_number)]
    pub base: Option<u64>,

    /// Window length in bytes [default: the board's GPIO block]
    #[arg(long, value_parser = parse_usize)]
    pub len: Option<usize>,
}

impl WindowArgs {
    /// Mapper, base address and length to map.
    ///
    /// `/dev/gpiomem` only exposes the GPIO block, starting at offset 0.
    #[must_use]
    pub fn resolve(&self) -> (DevMem, PhysAddr, usize) {
        let default_base = if self.device.as_path() == Path::new(DEV_GPIOMEM) {
            PhysAddr::new(0)
        } else {
            self.board.gpio_base()
        };
        let base = self.base.map_or(default_base, PhysAddr::new);
        let len = self.len.unwrap_or_else(|| self.board.gpio_window_len());
        (DevMem::with_path(self.device.clone()), base, len)
    }
}

#[derive(Debug, Args)]
pub struct PeekArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Byte offset of the register within the window
    #[arg(value_parser = parse_usize)]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct PokeArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Byte offset of the register within the window
    #[arg(value_parser = parse_usize)]
    pub offset: usize,

    /// Value to write
    #[arg(value_parser = parse_u32)]
    pub value: u32,
}

#[derive(Debug, Args)]
pub struct TickArgs {
    /// Timer period in nanoseconds
    #[arg(short, long, value_parser = parse_number)]
    pub period_ns: u64,

    /// Number of waits
    #[arg(short, long, default_value_t = 10)]
    pub count: u32,

    /// Sleep this long before each wait to provoke coalesced ticks
    #[arg(short, long, value_parser = parse_number)]
    pub stall_ns: Option<u64>,
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
///
/// Underscores are accepted as digit separators.
pub fn parse_number(text: &str) -> Result<u64, String> {
    let digits = text.trim().replace('_', "");
    let parsed = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .map_or_else(|| digits.parse(), |hex| u64::from_str_radix(hex, 16));
    parsed.map_err(|err| format!("invalid number `{text}`: {err}"))
}

fn parse_usize(text: &str) -> Result<usize, String> {
    let value = parse_number(text)?;
    usize::try_from(value).map_err(|_| format!("`{text}` does not fit this platform's address size"))
}

fn parse_u32(text: &str) -> Result<u32, String> {
    let value = parse_number(text)?;
    u32::try_from(value).map_err(|_| format!("`{text}` does not fit a 32-bit register"))
}
