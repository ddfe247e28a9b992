//! Adaptive solver for the 2D time-harmonic curl-curl equation
//!
//! Runs the solve-estimate-mark-refine loop on the manufactured cos/sin model
//! problem and prints a per-round error table with observed convergence rates.
//!
//! Usage:
//!   cargo run --release --bin adapt-timeharmonic -- --size 5 --maxit 10 --theta 0.3
//!   cargo run --release --bin adapt-timeharmonic -- --help

use clap::{Parser, ValueEnum};
use maxwell_afem::driver::{AdaptiveDriver, DriverConfig, StopReason};
use maxwell_afem::mesh::unit_square_triangles;
use maxwell_afem::recovery::RecoveryMethod;
use maxwell_afem::timeharmonic::{CosSinData, NedelecBackend};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecoveryArg {
    /// Inverse-area-weighted nodal averaging
    Averaging,
    /// Superconvergent patch recovery
    Spr,
}

impl From<RecoveryArg> for RecoveryMethod {
    fn from(arg: RecoveryArg) -> Self {
        match arg {
            RecoveryArg::Averaging => RecoveryMethod::Averaging,
            RecoveryArg::Spr => RecoveryMethod::SuperconvergentPatch,
        }
    }
}

/// Adaptive FEM driver for the time-harmonic curl-curl model problem
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Nédélec element order (only the lowest order, 0, is supported)
    #[arg(long, default_value_t = 0)]
    order: usize,

    /// Initial mesh subdivisions in each direction
    #[arg(long, default_value_t = 5)]
    size: usize,

    /// Number of adaptive rounds (the backend solves densely; keep this
    /// moderate)
    #[arg(long, default_value_t = 10)]
    maxit: usize,

    /// Bulk marking parameter in (0, 1]
    #[arg(long, default_value_t = 0.3)]
    theta: f64,

    /// Nodal recovery strategy
    #[arg(long, value_enum, default_value_t = RecoveryArg::Spr)]
    recovery: RecoveryArg,

    /// Write the convergence history as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.order != 0 {
        eprintln!("error: only the lowest-order Nédélec space (order 0) is supported");
        return ExitCode::FAILURE;
    }

    let config = DriverConfig {
        max_rounds: args.maxit,
        theta: args.theta,
        recovery: args.recovery.into(),
    };

    let mut driver = match AdaptiveDriver::new(config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut mesh = unit_square_triangles(args.size);
    let mut backend = NedelecBackend::new(CosSinData);

    let outcome = driver.run(&mut mesh, &mut backend);
    print_error_table(&driver);

    match outcome {
        Ok(StopReason::RoundLimit) => {}
        Ok(StopReason::Stagnated { round }) => {
            println!("stopped early in round {}: zero estimated error", round);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(driver.history()).expect("history serializes");
        if let Err(e) = fs::write(path, json) {
            eprintln!("error: failed to write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        println!("history written to {}", path.display());
    }

    ExitCode::SUCCESS
}

/// Print dof counts and norms per round, with the observed convergence rate
/// of each norm with respect to the dof count
fn print_error_table(driver: &AdaptiveDriver) {
    let history = driver.history();
    let Some(first) = history.first() else {
        return;
    };

    print!("{:>6} {:>8}", "round", "dofs");
    for (name, _) in &first.norms {
        print!(" {:>12} {:>6}", name, "rate");
    }
    println!();

    for (i, record) in history.iter().enumerate() {
        print!("{:>6} {:>8}", record.round, record.dofs);
        for (j, (_, value)) in record.norms.iter().enumerate() {
            print!(" {:>12.4e}", value);
            if i == 0 {
                print!(" {:>6}", "-");
            } else {
                let prev = &history[i - 1];
                let rate = convergence_rate(prev.norms[j].1, *value, prev.dofs, record.dofs);
                match rate {
                    Some(r) => print!(" {:>6.2}", r),
                    None => print!(" {:>6}", "-"),
                }
            }
        }
        println!();
    }
}

/// Observed rate `-2 ln(e1/e0) / ln(n1/n0)`, the exponent with respect to the
/// mesh size `h ~ n^(-1/2)` in two dimensions
fn convergence_rate(e0: f64, e1: f64, n0: usize, n1: usize) -> Option<f64> {
    if e0 <= 0.0 || e1 <= 0.0 || n1 <= n0 {
        return None;
    }
    Some(-2.0 * (e1 / e0).ln() / ((n1 as f64) / (n0 as f64)).ln())
}
