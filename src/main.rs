use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use purity::cli::Cli;
use purity::config::Config;
use purity::config::validator::ConfigValidator;
use purity::output::{self, Verbosity, WriterSink};
use purity::AuditContext;
use std::io::{self, BufWriter};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    init_tracing(cli.verbose);
    output::set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    let config_path = Config::default_path()?;
    let config = Config::load(&config_path)?;
    if let Err(e) = ConfigValidator::new().validate_config_file(&config_path) {
        output::warning(&format!("Warning: Configuration validation failed: {e}"));
    }

    let ctx = AuditContext::resolve(&cli, &config)?;
    output::verbose(&format!("Auditing {}", ctx.root.display()));
    let auditor = ctx.auditor()?;

    let stdout = io::stdout();
    let mut sink = WriterSink::new(BufWriter::new(stdout.lock()), ctx.mark_dirs);
    let stats = auditor
        .run(&mut sink, &mut |warning| output::warning(&warning.to_string()))
        .with_context(|| format!("Failed to audit {}", ctx.root.display()))?;
    sink.finish().context("Failed to write report")?;

    if cli.stats {
        output::info(&format!(
            "visited {}, allowed {}, denied {}, exempt {}, reported {}, warnings {}, max depth {}",
            stats.visited,
            stats.allowed,
            stats.denied,
            stats.exempt,
            stats.reported,
            stats.warnings,
            stats.max_frames
        ));
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "purity=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PURITY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
