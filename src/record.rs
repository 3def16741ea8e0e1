//! Canonical typed transaction record.

use std::{collections::BTreeSet, fmt, sync::OnceLock};

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mapping::Field;

pub const UNKNOWN: &str = "UNKNOWN";

fn platform_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(AMAZON|MARKETPLACE|FACILITATOR|MPF|PLATFORM)")
            .expect("valid platform pattern")
    })
}

/// True when a collector label names the marketplace in any known wording.
pub fn is_platform_label(label: &str) -> bool {
    platform_pattern().is_match(label)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Fba,
    Fbm,
    Other(String),
    Unknown,
}

impl Channel {
    /// Maps a sales-channel network code (`AFN`/`MFN`).
    pub fn from_sales_channel(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_uppercase()).as_deref() {
            Some("AFN") => Channel::Fba,
            Some("MFN") => Channel::Fbm,
            _ => Channel::Unknown,
        }
    }

    /// Interprets an explicit fulfillment-channel cell.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(upper) = label.map(|l| l.trim().to_uppercase()).filter(|l| !l.is_empty()) else {
            return Channel::Unknown;
        };
        match upper.as_str() {
            "FBA" | "AFN" | "AMAZON" => Channel::Fba,
            "FBM" | "MFN" | "MERCHANT" => Channel::Fbm,
            UNKNOWN => Channel::Unknown,
            _ => Channel::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Channel::Fba => "FBA",
            Channel::Fbm => "FBM",
            Channel::Other(label) => label,
            Channel::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Party responsible for remitting the VAT of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collector {
    Amazon,
    Seller,
    /// Non-empty label that names neither party; kept verbatim (upper-cased).
    Other(String),
}

impl Collector {
    pub fn as_str(&self) -> &str {
        match self {
            Collector::Amazon => "AMAZON",
            Collector::Seller => "SELLER",
            Collector::Other(label) => label,
        }
    }

    pub fn is_platform(&self) -> bool {
        is_platform_label(self.as_str())
    }
}

impl fmt::Display for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-component VAT amounts carried through for export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VatComponents {
    pub items: Option<f64>,
    pub items_total: Option<f64>,
    pub shipping: Option<f64>,
    pub shipping_total: Option<f64>,
    pub giftwrap: Option<f64>,
    pub giftwrap_total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub order_id: Option<String>,
    pub transaction_type: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub country: String,
    pub channel: Channel,
    pub vat_collector: Collector,
    pub net: Option<f64>,
    pub gross: Option<f64>,
    pub vat_amount: Option<f64>,
    pub rate: Option<f64>,
    pub currency: Option<String>,
    pub sales_channel: Option<String>,
    pub components: VatComponents,
}

impl Transaction {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            order_id: None,
            transaction_type: None,
            date: None,
            country: country.into(),
            channel: Channel::Unknown,
            vat_collector: Collector::Seller,
            net: None,
            gross: None,
            vat_amount: None,
            rate: None,
            currency: None,
            sales_channel: None,
            components: VatComponents::default(),
        }
    }
}

/// Canonical fields that exist as whole columns in a normalized batch.
///
/// Values can still be null row by row; this tracks column presence only,
/// which is what aggregation preconditions are checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeSet<Field>,
    pub country: bool,
}

impl FieldSet {
    pub fn insert(&mut self, field: Field) {
        self.fields.insert(field);
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }
}

impl<const N: usize> From<[Field; N]> for FieldSet {
    fn from(fields: [Field; N]) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            country: true,
        }
    }
}

/// Normalized (and later derived) rows plus the columns they carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionSet {
    pub fields: FieldSet,
    pub rows: Vec<Transaction>,
}

impl TransactionSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_label_matches_keywords_case_insensitively() {
        assert!(is_platform_label("Marketplace Facilitator"));
        assert!(is_platform_label("amazon services europe"));
        assert!(is_platform_label("MPF"));
        assert!(!is_platform_label("SELLER"));
        assert!(!is_platform_label(""));
    }

    #[test]
    fn channel_maps_network_codes() {
        assert_eq!(Channel::from_sales_channel(Some("afn")), Channel::Fba);
        assert_eq!(Channel::from_sales_channel(Some("MFN")), Channel::Fbm);
        assert_eq!(Channel::from_sales_channel(Some("XYZ")), Channel::Unknown);
        assert_eq!(Channel::from_sales_channel(None), Channel::Unknown);
    }

    #[test]
    fn channel_label_keeps_unrecognized_values() {
        assert_eq!(Channel::from_label(Some("Amazon")), Channel::Fba);
        assert_eq!(Channel::from_label(Some(" ")), Channel::Unknown);
        assert_eq!(
            Channel::from_label(Some("prime")),
            Channel::Other("PRIME".to_string())
        );
    }
}
