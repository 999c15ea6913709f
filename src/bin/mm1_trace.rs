//! mm1-trace - trace and validate an MM1 mapping-mode capture
//!
//! Usage:
//!   mm1-trace -f run.mm1                  # BUFFER / PIXEL lines
//!   mm1-trace -f run.mm1 -p               # Also plot each pixel's spectrum
//!   mm1-trace -f run.mm1 -c trace.toml    # Load settings from TOML
//!
//! Exit codes: 0 clean, 1 usage / I/O / config error, 2 invalid capture.

use std::io::{BufWriter, Write};

use anyhow::Context;
use mm1_trace::common::{TraceArgs, TraceError, EXIT_FAILURE, EXIT_SUCCESS};
use mm1_trace::config::Config;
use mm1_trace::trace::{trace_file, TraceOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = match TraceArgs::try_parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            eprint!("{}", TraceArgs::usage());
            std::process::exit(e.exit_code());
        }
    };

    let code = match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            e.downcast_ref::<TraceError>()
                .map_or(EXIT_FAILURE, TraceError::exit_code)
        }
    };
    std::process::exit(code);
}

fn run(args: &TraceArgs) -> anyhow::Result<()> {
    let config = match &args.config_file {
        Some(path) => Config::load(path)
            .map_err(TraceError::from)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    // Initialize tracing (logging); stdout carries only the trace
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(?config, "configuration");

    let path = args
        .file
        .as_ref()
        .ok_or_else(|| TraceError::usage("-f PATH is required"))?;

    let options = TraceOptions::from_config(&config, args.plot);
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = trace_file(path, &options, &mut out);
    // Keep the lines printed before a failure
    out.flush()?;
    result?;
    Ok(())
}
