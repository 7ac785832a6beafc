// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! strobe-probe
//!
//! Bring-up tool for the display hardware: shows the board address map,
//! reads and writes single GPIO registers, and measures how the refresh
//! timer behaves on the target.
//!
//! ```bash
//! # Address map of the compiled-in board
//! strobe-probe info
//!
//! # Read GPLEV0 on a Pi 4 through /dev/gpiomem (no root needed)
//! strobe-probe peek --board pi4 --device /dev/gpiomem 0x34
//!
//! # Drive GPIO 5 high (GPSET0)
//! sudo strobe-probe poke 0x1c 0x20
//!
//! # 100 waits at 1.44 kHz, stalling 2 ms before each one
//! strobe-probe tick --period-ns 694444 --count 100 --stall-ns 2000000
//! ```

#[cfg(not(target_os = "linux"))]
compile_error!("strobe-probe requires Linux (/dev/mem and timerfd)");

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Info(args) => {
            commands::info(&args);
            Ok(())
        }
        Command::Peek(args) => commands::peek(&args),
        Command::Poke(args) => commands::poke(&args),
        Command::Tick(args) => commands::tick(&args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
///
/// `--verbose` overrides the environment and logs at `debug`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
