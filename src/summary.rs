//! `summary` command: full pipeline over one or more report files.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{InputArgs, SummaryArgs},
    config::{Config, Settings},
    error::PipelineError,
    io_utils,
    period::Period,
    pipeline, report,
};

pub(crate) fn load_settings(args: &InputArgs) -> Result<Settings> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let settings = config.settings();
    info!(
        "Using {} country rate(s){}",
        settings.rates.len(),
        args.config
            .as_ref()
            .map(|p| format!(" from {p:?}"))
            .unwrap_or_else(|| " (built-in defaults)".into())
    );
    Ok(settings)
}

pub(crate) fn resolve_period(args: &InputArgs) -> Result<Option<Period>> {
    match (args.from, args.to) {
        (Some(from), Some(to)) => Ok(Some(Period::new(from, to)?)),
        _ => Ok(None),
    }
}

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let mut settings = load_settings(&args.input)?;
    if args.include_excluded {
        settings.excluded_territory = None;
    }
    let period = resolve_period(&args.input)?;
    let input_encoding = io_utils::resolve_encoding(args.input.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.input.output_encoding.as_deref())?;

    let dataset = io_utils::read_batches(&args.input.inputs, args.input.delimiter, input_encoding)?;
    let output = match pipeline::run(&dataset, &settings, period.as_ref()) {
        Ok(output) => output,
        Err(err @ PipelineError::MissingField(_)) => {
            let rows = pipeline::prepare(&dataset, &settings);
            eprintln!("Normalized data preview:");
            eprint!("{}", report::render_rows_preview(&rows, 10));
            return Err(err).context("Computing country summary");
        }
    };
    info!(
        "Kept {} of {} row(s) across {} country code(s)",
        output.rows.len(),
        dataset.len(),
        output.summary.len()
    );

    if let Some(path) = &args.export_rows {
        let delimiter = io_utils::resolve_output_delimiter(Some(path), None);
        let written = report::write_rows(&output.rows, Some(path), delimiter, output_encoding)
            .with_context(|| format!("Exporting rows to {path:?}"))?;
        info!("Exported {written} normalized row(s) to {path:?}");
    }

    let delimiter = io_utils::resolve_output_delimiter(args.output.as_deref(), None);
    report::write_summary(
        &output.summary,
        args.format,
        args.output.as_deref(),
        delimiter,
        output_encoding,
    )?;
    Ok(())
}
