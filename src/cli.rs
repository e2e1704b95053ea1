//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    /// Poll interval override in seconds; wins over file, preset, and environment.
    pub interval_secs: Option<u64>,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1).collect())
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--interval" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --interval (expected seconds)")?;
                let secs = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--interval value \"{raw}\" is not a whole number of seconds"))?;
                opts.interval_secs = Some(secs);
            }
            "--help" | "-h" => {
                opts.help = true;
                return Ok(opts);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("carbon-regulator - charge batteries on clean power, discharge on dirty power");
    eprintln!();
    eprintln!("Usage: carbon-regulator [--config <path> | --preset <name>] [--interval <secs>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>    Load configuration from a TOML file");
    eprintln!("  --preset <name>    Use a built-in preset (national_grid, demo)");
    eprintln!("  --interval <secs>  Override the intensity poll interval");
    eprintln!("  --help             Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  INTENSITY_CHECK_INTERVAL_SECONDS, NATIONAL_GRID_BASE_URL, INTENSITY_ENDPOINT");
    eprintln!("  RUST_LOG (default: info)");
}
