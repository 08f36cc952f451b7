//! Command-line front end for the `dc` dynamic-controllability checker.
//!
//! Reads a temporal network from a line-oriented text file, checks it, and
//! prints either the elimination order (controllable) or the conflict
//! (uncontrollable).

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dc::config::DcConfig;
use dc::tn::TemporalNetwork;

/// Check a temporal network for dynamic controllability.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a network file, one constraint per line.
    file: PathBuf,

    /// Report only the raw negative cycle on failure, skipping conflict expansion.
    #[arg(long)]
    no_full_conflict: bool,

    /// Log one line per elimination step via `tracing` at debug level.
    #[arg(long)]
    visualize: bool,

    /// Increase log verbosity (can be repeated).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let text = fs::read_to_string(&cli.file).with_context(|| format!("reading {}", cli.file.display()))?;
    let tn = parse_network(&text)?;

    let mut config = DcConfig {
        full_conflict: !cli.no_full_conflict,
        visualize: if cli.visualize {
            Some(Box::new(|snapshot: &dc::config::LdgSnapshot| {
                tracing::debug!(
                    step = snapshot.step,
                    eliminated = ?snapshot.eliminated,
                    vertices = snapshot.vertices.len(),
                    edges = snapshot.edges.len(),
                    "elimination step"
                );
            }))
        } else {
            None
        },
        ..DcConfig::default()
    };

    let outcome = dc::is_controllable(&tn, &mut config);
    if outcome.controllable {
        println!("CONTROLLABLE");
        println!("order: {}", outcome.order.join(" -> "));
    } else {
        println!("UNCONTROLLABLE");
        for (i, component) in outcome.conflict.unwrap().iter().enumerate() {
            let label = if i == 0 { "cycle".to_string() } else { format!("extension {i}") };
            let rendered: Vec<String> = component.iter().map(|e| format!("{}({})", e.constraint_name, e.tag)).collect();
            println!("{label}: {}", rendered.join(", "));
        }
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Parses the line-oriented network format:
/// `stc NAME s e [lb] [ub]` and `sctc NAME s e lb ub`, one per line. Blank
/// lines and lines starting with `#` are ignored.
fn parse_network(text: &str) -> Result<TemporalNetwork> {
    let mut tn = TemporalNetwork::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let err_ctx = || format!("line {}: {:?}", lineno + 1, raw);

        match tokens.as_slice() {
            ["stc", name, s, e] => {
                tn.add_constraint(s, e, None, None, Some(name)).with_context(err_ctx)?;
            }
            ["stc", name, s, e, lb] => {
                let lb = lb.parse::<dc::W>().with_context(err_ctx)?;
                tn.add_constraint(s, e, Some(lb), None, Some(name)).with_context(err_ctx)?;
            }
            ["stc", name, s, e, lb, ub] => {
                let lb = lb.parse::<dc::W>().with_context(err_ctx)?;
                let ub = ub.parse::<dc::W>().with_context(err_ctx)?;
                tn.add_constraint(s, e, Some(lb), Some(ub), Some(name)).with_context(err_ctx)?;
            }
            ["sctc", name, s, e, lb, ub] => {
                let lb = lb.parse::<dc::W>().with_context(err_ctx)?;
                let ub = ub.parse::<dc::W>().with_context(err_ctx)?;
                tn.add_contingent_constraint(s, e, lb, ub, Some(name)).with_context(err_ctx)?;
            }
            [] => unreachable!("blank lines are filtered above"),
            _ => bail!("line {}: could not parse constraint: {:?}", lineno + 1, raw),
        }
    }
    Ok(tn)
}
