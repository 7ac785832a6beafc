// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Subcommand implementations.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use strobe_hal::{PeriodicTimer, PhysicalMemory, RegisterRange, RegisterWindow};
use tracing::debug;

use crate::cli::{InfoArgs, PeekArgs, PokeArgs, TickArgs, WindowArgs};

#[cfg(test)]
mod commands_test;

pub fn info(args: &InfoArgs) {
    let board = args.board;
    println!("board            {board} ({})", board.models());
    println!("peripheral base  {}", board.peripheral_base());
    println!("gpio base        {}", board.gpio_base());
    println!("gpio window      {:#x} bytes", board.gpio_window_len());
    println!("strobe-hal       {}", strobe_hal::VERSION);
}

pub fn peek(args: &PeekArgs) -> Result<()> {
    let range = map_window(&args.window)?;
    let value = range
        .try_get(args.offset)
        .with_context(|| format!("cannot read register in window at {}", range.base()))?;
    println!("{}+{:#06x}  {value:#010x}", range.base(), args.offset);
    range.unmap().context("cannot unmap register window")?;
    Ok(())
}

pub fn poke(args: &PokeArgs) -> Result<()> {
    let range = map_window(&args.window)?;
    range
        .try_set(args.offset, args.value)
        .with_context(|| format!("cannot write register in window at {}", range.base()))?;
    let readback = range.try_get(args.offset)?;
    println!(
        "{}+{:#06x}  wrote {:#010x}, read back {readback:#010x}",
        range.base(),
        args.offset,
        args.value
    );
    range.unmap().context("cannot unmap register window")?;
    Ok(())
}

fn map_window(window: &WindowArgs) -> Result<RegisterRange> {
    let (mem, base, len) = window.resolve();
    debug!(%base, len, device = %mem.path().display(), "mapping register window");
    mem.map(base, len).with_context(|| {
        format!(
            "cannot map {len:#x} bytes at {base} through {}",
            mem.path().display()
        )
    })
}

pub fn tick(args: &TickArgs) -> Result<()> {
    let period = Duration::from_nanos(args.period_ns);
    let stall = args.stall_ns.map(Duration::from_nanos);
    tracing::info!(?period, count = args.count, ?stall, "starting timer");

    let start = Instant::now();
    let mut timer = PeriodicTimer::create(args.period_ns).context("cannot create timer")?;
    let mut last = start;
    for n in 1..=args.count {
        if let Some(stall) = stall {
            thread::sleep(stall);
        }
        let ticks = timer.try_wait().context("timer wait failed")?;
        let now = Instant::now();
        println!(
            "wait {n:>5}  ticks {ticks:>3}  since last {:>10.3?}",
            now - last
        );
        last = now;
    }
    let elapsed = start.elapsed();
    let stats = timer.stats();
    timer.destroy();

    let expected = expected_elapsed(period, stats.ticks);
    let drift = drift_ms(elapsed, expected);
    println!();
    println!("waits            {}", stats.waits);
    println!("ticks            {}", stats.ticks);
    println!("overruns         {}", stats.overruns);
    println!("elapsed          {elapsed:.3?}");
    println!("expected         {expected:.3?}");
    println!("drift            {drift:+.3}ms");
    Ok(())
}

/// Wall time `ticks` periods should take, saturating on overflow.
fn expected_elapsed(period: Duration, ticks: u64) -> Duration {
    period.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX))
}

/// Signed difference `elapsed - expected` in milliseconds.
const fn drift_ms(elapsed: Duration, expected: Duration) -> f64 {
    (elapsed.as_secs_f64() - expected.as_secs_f64()) * 1e3
}
