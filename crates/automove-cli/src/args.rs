// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface.
use std::path::PathBuf;
use std::str::FromStr;

use automove_geom::Position;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "automove", author, version, about = "Run automove rules against a JSON scene")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register the rules on the scene, apply the moves in order and print
    /// every node's final position.
    Run {
        /// Scene file (JSON).
        #[arg(long)]
        scene: PathBuf,
        /// Rule file (JSON object or array).
        #[arg(long)]
        rules: PathBuf,
        /// Simulated drag, applied after registration. Repeatable.
        #[arg(long = "move", value_name = "ID=X,Y")]
        moves: Vec<Drag>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Validate a rule file against a scene, one line per rule.
    Check {
        /// Scene file (JSON).
        #[arg(long)]
        scene: PathBuf,
        /// Rule file (JSON object or array).
        #[arg(long)]
        rules: PathBuf,
    },
}

/// Output format of `run`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable table.
    Table,
    /// Pretty-printed JSON array.
    Json,
}

/// A `--move id=x,y` argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Drag {
    /// Node key.
    pub node: String,
    /// Position to write.
    pub to: Position,
}

impl FromStr for Drag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, coords) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected ID=X,Y, got `{s}`"))?;
        if node.is_empty() {
            return Err(format!("missing node id in `{s}`"));
        }
        let (x, y) = coords
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y after `=`, got `{coords}`"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad coordinate `{v}`: {e}"))
        };
        Ok(Self {
            node: node.to_owned(),
            to: Position::new(parse(x)?, parse(y)?),
        })
    }
}
