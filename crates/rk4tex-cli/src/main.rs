//! `rk4tex`: turn a directory of stencil documents into RK4 update
//! formulas.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rk4tex::types::Stencil;
use rk4tex::{run_with, RunConfig, RunOptions, DEFAULT_OUTPUT};

/// Generate RK4 time-update formulas in LaTeX from finite-difference
/// stencil documents.
#[derive(Parser, Debug)]
#[command(name = "rk4tex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate RK4 time-update formulas from LaTeX stencil documents", long_about = None)]
struct Cli {
    /// Directory containing stencil_*.tex documents
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Output LaTeX file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON run configuration (title, page breaks, fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print every parsed stencil
    #[arg(short, long)]
    debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn print_stencil(stencil: &Stencil) {
    println!(
        "{} [{}] from {} (variable {}, {} points, spacing power {})",
        stencil.key,
        stencil.support(),
        stencil.document,
        stencil.variable.as_deref().unwrap_or("-"),
        stencil.width(),
        stencil.spacing_power,
    );
    for entry in &stencil.entries {
        println!("  {:+} : {}", entry.offset, entry.coefficient);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let options = RunOptions {
        input_dir: cli.input_dir,
        output: cli.output,
        config,
    };
    let debug = cli.debug;
    let summary = run_with(&options, |stencil| {
        if debug {
            print_stencil(stencil);
        }
    })
    .with_context(|| {
        format!(
            "cannot generate {} from {}",
            options.output.display(),
            options.input_dir.display()
        )
    })?;
    println!(
        "Generated {} with {} fields from {} stencils.",
        summary.output.display(),
        summary.fields,
        summary.table.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_and_defaults() {
        let cli = Cli::try_parse_from(["rk4tex", "-i", "stencils", "-d"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("stencils"));
        assert_eq!(cli.output, PathBuf::from("solver_update.tex"));
        assert!(cli.config.is_none());
        assert!(cli.debug);

        let cli =
            Cli::try_parse_from(["rk4tex", "-i", "s", "-o", "out.tex", "-c", "run.json"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("out.tex"));
        assert_eq!(cli.config, Some(PathBuf::from("run.json")));
    }

    #[test]
    fn input_dir_is_required() {
        assert!(Cli::try_parse_from(["rk4tex"]).is_err());
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("nonsense"), Level::WARN);
    }
}
