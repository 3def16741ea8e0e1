//! Normalize, derive, aggregate: the full transform over one combined batch.

use log::debug;

use crate::{
    aggregate::{self, JurisdictionSummary},
    config::Settings,
    dataset::Dataset,
    derive,
    error::Result,
    normalize,
    period::{Period, retain_period},
    record::TransactionSet,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Normalized and derived rows that fed the summary.
    pub rows: TransactionSet,
    pub summary: Vec<JurisdictionSummary>,
}

/// Normalizes a raw dataset, fills country rates, and derives amounts.
pub fn prepare(dataset: &Dataset, settings: &Settings) -> TransactionSet {
    let mut set = normalize::normalize(dataset);
    derive::apply_country_rates(&mut set, &settings.rates);
    derive::derive_amounts(&mut set);
    set
}

/// Runs the whole pipeline; `period`, when given, filters rows by date before
/// aggregation.
pub fn run(dataset: &Dataset, settings: &Settings, period: Option<&Period>) -> Result<PipelineOutput> {
    let mut rows = prepare(dataset, settings);
    if let Some(period) = period {
        let dropped = retain_period(&mut rows, period);
        debug!("Period filter dropped {dropped} row(s)");
    }
    let mut summary = aggregate::summarize(&rows)?;
    aggregate::exclude_territory(&mut summary, settings.excluded_territory.as_deref());
    Ok(PipelineOutput { rows, summary })
}
