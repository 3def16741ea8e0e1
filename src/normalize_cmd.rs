//! `normalize` command: exports canonical rows with derived amounts.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::NormalizeArgs,
    io_utils,
    period::retain_period,
    pipeline, report,
    summary::{load_settings, resolve_period},
};

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let settings = load_settings(&args.input)?;
    let period = resolve_period(&args.input)?;
    let input_encoding = io_utils::resolve_encoding(args.input.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.input.output_encoding.as_deref())?;

    let dataset = io_utils::read_batches(&args.input.inputs, args.input.delimiter, input_encoding)?;
    let mut rows = pipeline::prepare(&dataset, &settings);
    if let Some(period) = &period {
        let dropped = retain_period(&mut rows, period);
        info!("Dropped {dropped} row(s) outside {} .. {}", period.from, period.to);
    }

    let delimiter = io_utils::resolve_output_delimiter(args.output.as_deref(), args.output_delimiter);
    let written = report::write_rows(&rows, args.output.as_deref(), delimiter, output_encoding)
        .context("Writing normalized rows")?;
    info!(
        "Wrote {written} normalized row(s) to {}",
        args.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}
