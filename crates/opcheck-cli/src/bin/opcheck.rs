#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use opcheck_cli::args::{CliArgs, OutputFormat};
use opcheck_cli::reporter::Reporter;
use opcheck_cli::{driver, tracing_config};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS_REPORTED: i32 = 1;

/// Keep panics caught inside rule callbacks off stderr; the analyzer logs
/// them and counts them as faults. Other panics use the default hook.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if opcheck_analyzer::in_isolated_callback() {
            tracing::debug!(location = ?info.location(), "rule callback panicked");
            return;
        }
        default_hook(info);
    }));
}

fn main() -> Result<()> {
    // Only installs a subscriber when OPCHECK_LOG or RUST_LOG is set.
    tracing_config::init_tracing();
    install_panic_hook();

    let args = CliArgs::parse();
    if args.list_rules {
        print!("{}", driver::list_rules());
        return Ok(());
    }

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::run(&args, &cwd)?;
    let diagnostics = &result.outcome.diagnostics;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(diagnostics)
                .context("failed to serialize diagnostics")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let color = !args.no_color && std::io::stdout().is_terminal();
            let mut reporter = Reporter::new(color);
            reporter.add_sources(&result.units);
            if !diagnostics.is_empty() {
                println!("{}", reporter.render(diagnostics));
                println!();
            }
            println!("{}", reporter.summary(diagnostics));
        }
    }

    if result.outcome.handler_faults > 0 {
        eprintln!(
            "warning: {} rule callback(s) failed; set OPCHECK_LOG=error for details",
            result.outcome.handler_faults
        );
    }

    if diagnostics.is_empty() {
        std::process::exit(EXIT_SUCCESS);
    }
    std::process::exit(EXIT_DIAGNOSTICS_REPORTED);
}
