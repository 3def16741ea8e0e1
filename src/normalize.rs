//! Schema normalization: raw report rows into canonical [`Transaction`]s.
//!
//! Column names are resolved once per dataset via [`ColumnMapping`]; every
//! row is then read through that mapping. Nothing here fails: ambiguous or
//! garbled cells fall back to `UNKNOWN`, `SELLER` or null.

use std::collections::HashSet;

use itertools::Itertools;
use log::debug;

use crate::{
    data::{
        normalize_code, normalize_column_name, parse_amount, parse_rate, parse_report_datetime,
    },
    dataset::Dataset,
    mapping::{ColumnMapping, Field, coalesce},
    record::{
        Channel, Collector, FieldSet, Transaction, TransactionSet, UNKNOWN, VatComponents,
        is_platform_label,
    },
};

/// Collector wordings replaced outright before the keyword test.
const PLATFORM_LITERALS: &[&str] = &[
    "AMAZON EU S.A R.L.",
    "AMAZON EU SARL",
    "AMAZON SERVICES EUROPE SARL",
    "MARKETPLACE",
    "MARKETPLACE FACILITATOR",
    "AMAZON - MARKETPLACE FACILITATOR",
    "MPF",
    "PLATFORM",
];

/// Classifies a raw collector cell as marketplace, seller, or something else.
pub fn classify_collector(raw: Option<&str>) -> Collector {
    let upper = raw.map(|v| v.trim().to_uppercase()).unwrap_or_default();
    if upper.is_empty() || upper == "NAN" {
        return Collector::Seller;
    }
    if PLATFORM_LITERALS.contains(&upper.as_str()) || is_platform_label(&upper) {
        return Collector::Amazon;
    }
    if upper == "SELLER" {
        Collector::Seller
    } else {
        Collector::Other(upper)
    }
}

/// Two-letter suffix of a marketplace domain such as `Amazon.de`.
///
/// Values shorter than two characters cannot name a country and yield `None`
/// rather than a one-letter code.
pub fn country_from_marketplace(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    let chars = trimmed.chars().collect::<Vec<_>>();
    if chars.len() < 2 {
        return None;
    }
    let suffix = chars[chars.len() - 2..].iter().collect::<String>();
    normalize_code(Some(&suffix))
}

fn resolve_country(dataset: &Dataset, mapping: &ColumnMapping, row: usize) -> String {
    let raw = if !mapping.country_candidates.is_empty() {
        coalesce(dataset, row, &mapping.country_candidates).map(str::to_string)
    } else {
        mapping
            .marketplace
            .and_then(|column| country_from_marketplace(dataset.cell(row, column)))
    };
    normalize_code(raw.as_deref()).unwrap_or_else(|| UNKNOWN.to_string())
}

fn resolve_channel(dataset: &Dataset, mapping: &ColumnMapping, row: usize) -> Channel {
    if mapping.has(Field::Channel) {
        Channel::from_label(mapping.value(dataset, row, Field::Channel))
    } else if mapping.has(Field::SalesChannel) {
        Channel::from_sales_channel(mapping.value(dataset, row, Field::SalesChannel))
    } else {
        Channel::Unknown
    }
}

fn text(dataset: &Dataset, mapping: &ColumnMapping, row: usize, field: Field) -> Option<String> {
    mapping
        .value(dataset, row, field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_row(dataset: &Dataset, mapping: &ColumnMapping, row: usize) -> Transaction {
    let amount = |field| parse_amount(mapping.value(dataset, row, field));
    Transaction {
        order_id: text(dataset, mapping, row, Field::OrderId),
        transaction_type: text(dataset, mapping, row, Field::TransactionType),
        date: parse_report_datetime(mapping.value(dataset, row, Field::Date)),
        country: resolve_country(dataset, mapping, row),
        channel: resolve_channel(dataset, mapping, row),
        vat_collector: classify_collector(mapping.value(dataset, row, Field::VatCollector)),
        net: amount(Field::Net),
        gross: amount(Field::Gross),
        vat_amount: amount(Field::VatAmount),
        rate: parse_rate(mapping.value(dataset, row, Field::Rate)),
        currency: text(dataset, mapping, row, Field::Currency),
        sales_channel: text(dataset, mapping, row, Field::SalesChannel),
        components: VatComponents {
            items: amount(Field::VatAmountItems),
            items_total: amount(Field::VatAmountItemsTotal),
            shipping: amount(Field::VatAmountShipping),
            shipping_total: amount(Field::VatAmountShippingTotal),
            giftwrap: amount(Field::VatAmountGiftwrap),
            giftwrap_total: amount(Field::VatAmountGiftwrapTotal),
        },
    }
}

/// Normalizes a raw dataset into canonical transactions.
///
/// Duplicate-named raw columns are collapsed first so that no canonical field
/// can be fed from two columns at once.
pub fn normalize(dataset: &Dataset) -> TransactionSet {
    let mut working;
    let dataset = if has_duplicate_headers(dataset) {
        working = dataset.clone();
        working.collapse_duplicate_columns();
        &working
    } else {
        dataset
    };

    let mapping = ColumnMapping::resolve(dataset);
    let mut fields = FieldSet::default();
    for field in Field::ALL {
        if mapping.has(field) {
            fields.insert(field);
        }
    }
    // Always materialized, defaulted when no source column exists.
    fields.insert(Field::Channel);
    fields.insert(Field::VatCollector);
    fields.country = true;

    let rows = (0..dataset.len())
        .map(|row| normalize_row(dataset, &mapping, row))
        .collect::<Vec<_>>();
    debug!(
        "Normalized {} row(s) carrying [{}]; {} with unresolved country",
        rows.len(),
        fields.iter().join(", "),
        rows.iter().filter(|r| r.country == UNKNOWN).count()
    );
    TransactionSet { fields, rows }
}

fn has_duplicate_headers(dataset: &Dataset) -> bool {
    let mut seen = HashSet::new();
    dataset
        .headers
        .iter()
        .any(|h| !seen.insert(normalize_column_name(h)))
}
