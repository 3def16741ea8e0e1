//! Per-country VAT liability summary.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    mapping::Field,
    record::TransactionSet,
};

pub const SUMMARY_HEADERS: [&str; 6] = [
    "country",
    "orders",
    "net",
    "vat_due",
    "amazon_collected",
    "vat_to_declare",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionSummary {
    pub country: String,
    pub orders: usize,
    pub net: f64,
    pub vat_due: f64,
    pub amazon_collected: f64,
    pub vat_to_declare: f64,
}

impl JurisdictionSummary {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.country.clone(),
            self.orders.to_string(),
            format!("{:.2}", self.net),
            format!("{:.2}", self.vat_due),
            format!("{:.2}", self.amazon_collected),
            format!("{:.2}", self.vat_to_declare),
        ]
    }
}

#[derive(Default)]
struct Accumulator<'a> {
    rows: usize,
    order_ids: HashSet<&'a str>,
    net: f64,
    vat_due: f64,
    amazon_collected: f64,
}

/// Groups rows by country and nets platform-collected VAT out of the total.
///
/// Fails only when the country or VAT amount field is absent as a column.
/// Null cells count as zero. The result is sorted by `vat_to_declare`
/// descending; ties keep the order in which countries first appear.
pub fn summarize(set: &TransactionSet) -> Result<Vec<JurisdictionSummary>> {
    if !set.fields.country {
        return Err(PipelineError::MissingField("country"));
    }
    if !set.fields.contains(Field::VatAmount) {
        return Err(PipelineError::MissingField(Field::VatAmount.as_str()));
    }
    let count_orders = set.fields.contains(Field::OrderId);

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for row in &set.rows {
        let country = row.country.as_str();
        let group = groups.entry(country).or_insert_with(|| {
            order.push(country);
            Accumulator::default()
        });
        group.rows += 1;
        if let Some(id) = row.order_id.as_deref() {
            group.order_ids.insert(id);
        }
        group.net += row.net.unwrap_or(0.0);
        let vat = row.vat_amount.unwrap_or(0.0);
        group.vat_due += vat;
        if row.vat_collector.is_platform() {
            group.amazon_collected += vat;
        }
    }

    let mut summary = order
        .into_iter()
        .filter_map(|country| {
            let group = groups.remove(country)?;
            Some(JurisdictionSummary {
                country: country.to_string(),
                orders: if count_orders {
                    group.order_ids.len()
                } else {
                    group.rows
                },
                net: group.net,
                vat_due: group.vat_due,
                amazon_collected: group.amazon_collected,
                vat_to_declare: group.vat_due - group.amazon_collected,
            })
        })
        .collect::<Vec<_>>();
    summary.sort_by(|a, b| b.vat_to_declare.total_cmp(&a.vat_to_declare));
    debug!("Summarized {} row(s) into {} country row(s)", set.len(), summary.len());
    Ok(summary)
}

/// Drops the excluded territory from a finished summary.
pub fn exclude_territory(summary: &mut Vec<JurisdictionSummary>, territory: Option<&str>) {
    if let Some(territory) = territory {
        summary.retain(|row| !row.country.eq_ignore_ascii_case(territory));
    }
}
