//! CLI argument parsing for the MM1 tracer
//!
//! clap's built-in help and version flags are disabled: `-h` and `-?`
//! print the usage on stderr and exit 1, like any malformed command line.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use super::error::TraceError;

/// Arguments for mm1-trace
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "mm1-trace")]
#[command(about = "Trace and validate an MM1 mapping-mode capture")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct TraceArgs {
    /// MM1 file to trace
    #[arg(short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Plot each pixel's spectrum
    #[arg(short = 'p')]
    pub plot: bool,

    /// Optional TOML configuration file
    #[arg(short = 'c', value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Print usage and exit
    #[arg(short = 'h', short_alias = '?')]
    pub help: bool,
}

impl TraceArgs {
    /// Parse arguments, turning every failure into a usage error
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, TraceError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let args = Self::try_parse_from(args).map_err(|e| {
            let rendered = e.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            TraceError::usage(first.trim_start_matches("error: "))
        })?;
        if args.help {
            return Err(TraceError::usage("help requested"));
        }
        if args.file.is_none() {
            return Err(TraceError::usage("-f PATH is required"));
        }
        Ok(args)
    }

    /// Usage text printed on stderr
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}
