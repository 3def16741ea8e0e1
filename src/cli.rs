use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{period::parse_period_date, report::OutputFormat};

#[derive(Debug, Parser)]
#[command(author, version, about = "Estimate per-country VAT from marketplace seller reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize VAT due, platform-collected VAT, and VAT left to declare per country
    Summary(SummaryArgs),
    /// Export normalized rows with derived net/gross/VAT amounts
    Normalize(NormalizeArgs),
    /// Preview the first few rows of a raw report in a formatted table
    Preview(PreviewArgs),
    /// List the standard VAT rates in effect
    Rates(RatesArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// One or more report files (CSV, or tab-separated .tsv/.txt); `-` reads stdin
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// YAML file with per-country standard rates (built-in EU rates if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// First day of the reporting period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_period_date, requires = "to")]
    pub from: Option<NaiveDate>,
    /// Last day of the reporting period, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_period_date, requires = "from")]
    pub to: Option<NaiveDate>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format for the summary
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Keep the excluded territory (UK by default) in the summary
    #[arg(long = "include-excluded")]
    pub include_excluded: bool,
    /// Also write the normalized rows behind the summary to this CSV file
    #[arg(long = "export-rows")]
    pub export_rows: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Report file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct RatesArgs {
    /// YAML file with per-country standard rates (built-in EU rates if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
