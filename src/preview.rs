use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::PreviewArgs,
    io_utils,
    mapping::{ColumnMapping, Field},
    table,
};

/// Shows the first rows of a raw report and how its columns were recognized.
pub fn execute(args: &PreviewArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = io_utils::read_dataset(&args.input, args.delimiter, encoding, Some(args.rows))
        .with_context(|| format!("Reading {:?}", args.input))?;

    let rows = dataset
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.clone().unwrap_or_default()).collect())
        .collect::<Vec<Vec<String>>>();
    table::print_table(&dataset.headers, &rows, &[]);

    let mapping = ColumnMapping::resolve(&dataset);
    let recognized = Field::ALL
        .iter()
        .filter(|field| mapping.has(**field))
        .count();
    info!(
        "Displayed {} row(s) from {:?}; {} canonical field(s) and {} country column(s) recognized",
        rows.len(),
        args.input,
        recognized,
        mapping.country_candidates.len()
    );
    Ok(())
}
