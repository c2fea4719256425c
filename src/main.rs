//! Anchor Layout CLI
//!
//! Usage:
//!   anchor-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -p, --passes <N>  Layout passes to run over every root view
//!   -d, --debug       Print each pass to stderr and log at debug level
//!   -a, --anchors     Show anchor and expression reference
//!   -h, --help        Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use anchor_layout::{run_with_config, RunConfig};

#[derive(Parser)]
#[command(name = "anchor-layout")]
#[command(about = "Resolve anchor constraints in a scene file and print the frames")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Layout passes to run over every root view
    #[arg(short, long, default_value_t = 1)]
    passes: usize,

    /// Debug mode: print each pass and skipped assertions
    #[arg(short, long)]
    debug: bool,

    /// Show anchor and expression reference
    #[arg(short, long)]
    anchors: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.anchors {
        print_anchors();
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RunConfig::new()
        .with_passes(cli.passes)
        .with_debug(cli.debug);
    match run_with_config(&source, config) {
        Ok(frames) => {
            println!("{}", frames);
        }
        Err(e) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_intro() {
    println!(
        r#"Anchor Layout - resolve anchor constraints in a view tree

USAGE:
    anchor-layout [OPTIONS] [FILE]
    cat scene.toml | anchor-layout

OPTIONS:
    -p, --passes <N>   Layout passes to run (default 1)
    -d, --debug        Print each pass and skipped assertions
    -a, --anchors      Show anchor and expression reference
    -h, --help         Print help

Each view's resolved frame is printed as `name: x=.. y=.. w=.. h=..`.
Run --anchors for the anchor names and expression syntax."#
    );
}

fn print_anchors() {
    println!(
        r#"ANCHORS
=======

Baselines (one axis, fixed with a number):
    top  bottom  center_y          vertical axis
    left  right  center_x          horizontal axis

Basepoints (two axes, fixed with [x, y] or "x_expr, y_expr"):
    top_left  top_right  bottom_left  bottom_right  center
    any other pair as "vertical|horizontal", e.g. "top|center_x"

EXPRESSIONS
===========

    to = "header.bottom + 8"
    to = "super.right - 4, super.top + 4"

    subject.property     subject: super | self | <view name>
                         property: left right top bottom center_x center_y
                                   width height
    + - * / ( )          arithmetic, unary minus

`super` reads the container in its own coordinates (origin 0, 0).
Every reference in one fix must name the same subject.
Fixes run in declaration order; a fix that reads a view positioned
later in the list sees that view's previous frame."#
    );
}
