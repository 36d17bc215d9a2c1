// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Automove CLI entrypoint.
//!
//! Loads a JSON scene into the reference host, registers the rules of a rule
//! file, optionally simulates drags, and prints the resulting positions.
//!
//! # Usage
//! ```text
//! automove run --scene scene.json --rules rules.json [--move ID=X,Y]... [--format table|json]
//! automove check --scene scene.json --rules rules.json
//! ```
//!
//! Logs go to stderr; `-v`/`-vv` raise the level and `RUST_LOG` overrides it.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = match cli.command {
        Command::Run {
            scene,
            rules,
            moves,
            format,
        } => commands::run(&scene, &rules, &moves, format)?,
        Command::Check { scene, rules } => commands::check(&scene, &rules)?,
    };
    println!("{output}");
    Ok(())
}
