use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use env_logger::Env;
use log::info;

use floodstat::analysis;

/// Packet-loss and hop-count statistics for mesh radio flood tests
#[derive(Parser, Debug)]
#[command(name = "floodstat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture CSV files, one per receiving node
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    info!("Analyzing {} capture file(s)", args.files.len());

    let fleet = analysis::load_fleet(&args.files).wrap_err("Failed to load capture files")?;
    let report = analysis::build_report(&fleet);

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .wrap_err("Failed to serialize report to JSON")?;
        println!("{json}");
    } else {
        println!("{}", analysis::render_text(&report));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["floodstat", "a.csv", "b.csv"]);
        assert_eq!(args.files.len(), 2);
        assert!(!args.json);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_cli_requires_files() {
        let result = Args::try_parse_from(["floodstat"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_json_flag() {
        let args = Args::parse_from(["floodstat", "--json", "a.csv"]);
        assert!(args.json);
    }
}
