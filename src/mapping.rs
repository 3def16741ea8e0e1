//! Static column mapping tables and their per-schema resolution.
//!
//! Raw report headers are matched against these tables once per dataset; the
//! resulting [`ColumnMapping`] is then applied to every row by index.

use std::fmt;

use itertools::Itertools;
use log::debug;

use crate::{data::normalize_column_name, dataset::Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    OrderId,
    TransactionType,
    Date,
    Channel,
    VatCollector,
    Net,
    Gross,
    VatAmount,
    VatAmountItems,
    VatAmountItemsTotal,
    VatAmountShipping,
    VatAmountShippingTotal,
    VatAmountGiftwrap,
    VatAmountGiftwrapTotal,
    Rate,
    Currency,
    SalesChannel,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::OrderId,
        Field::TransactionType,
        Field::Date,
        Field::Channel,
        Field::VatCollector,
        Field::Net,
        Field::Gross,
        Field::VatAmount,
        Field::VatAmountItems,
        Field::VatAmountItemsTotal,
        Field::VatAmountShipping,
        Field::VatAmountShippingTotal,
        Field::VatAmountGiftwrap,
        Field::VatAmountGiftwrapTotal,
        Field::Rate,
        Field::Currency,
        Field::SalesChannel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::OrderId => "order_id",
            Field::TransactionType => "transaction_type",
            Field::Date => "date",
            Field::Channel => "channel",
            Field::VatCollector => "vat_collector",
            Field::Net => "net",
            Field::Gross => "gross",
            Field::VatAmount => "vat_amount",
            Field::VatAmountItems => "vat_amount_items",
            Field::VatAmountItemsTotal => "vat_amount_items_total",
            Field::VatAmountShipping => "vat_amount_shipping",
            Field::VatAmountShippingTotal => "vat_amount_shipping_total",
            Field::VatAmountGiftwrap => "vat_amount_giftwrap",
            Field::VatAmountGiftwrapTotal => "vat_amount_giftwrap_total",
            Field::Rate => "rate",
            Field::Currency => "currency",
            Field::SalesChannel => "sales_channel",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known raw column names (lower-case) and the canonical field they feed.
///
/// Country columns are deliberately absent: the jurisdiction is resolved
/// separately from [`COUNTRY_PRIORITY`]. When several aliases of one field are
/// present, the alias listed first wins.
pub const COLUMN_ALIASES: &[(&str, Field)] = &[
    ("order-id", Field::OrderId),
    ("order id", Field::OrderId),
    ("amazon-order-id", Field::OrderId),
    ("order_id", Field::OrderId),
    ("transaction type", Field::TransactionType),
    ("transaction_type", Field::TransactionType),
    ("transaction-event-date", Field::Date),
    ("posting-date", Field::Date),
    ("invoice-date", Field::Date),
    ("purchase-date", Field::Date),
    ("shipment-date", Field::Date),
    ("tax_calculation_date", Field::Date),
    ("fulfillment-channel", Field::Channel),
    ("fulfilment-channel", Field::Channel),
    ("vat-collection-responsible", Field::VatCollector),
    ("vat collection responsibility", Field::VatCollector),
    ("tax_collection_responsibility", Field::VatCollector),
    ("tax_collection_role", Field::VatCollector),
    ("total_activity_value_amt_vat_excl", Field::Net),
    ("total_activity_value_amt_vat_incl", Field::Gross),
    ("total_activity_value_vat_amt", Field::VatAmount),
    ("price_of_items_vat_amt", Field::VatAmountItems),
    ("total_price_of_items_vat_amt", Field::VatAmountItemsTotal),
    ("ship_charge_vat_amt", Field::VatAmountShipping),
    ("total_ship_charge_vat_amt", Field::VatAmountShippingTotal),
    ("gift_wrap_vat_amt", Field::VatAmountGiftwrap),
    ("total_gift_wrap_vat_amt", Field::VatAmountGiftwrapTotal),
    ("tax-rate", Field::Rate),
    ("tax rate", Field::Rate),
    ("vat rate", Field::Rate),
    ("vat-rate", Field::Rate),
    ("vat_rate", Field::Rate),
    ("price_of_items_vat_rate_percent", Field::Rate),
    ("currency", Field::Currency),
    ("sales_channel", Field::SalesChannel),
];

/// Jurisdiction source columns, most authoritative first.
pub const COUNTRY_PRIORITY: &[&str] = &[
    "VAT_CALCULATION_IMPUTATION_COUNTRY",
    "ARRIVAL_COUNTRY",
    "SALE_ARRIVAL_COUNTRY",
    "SHIP_TO_COUNTRY",
    "MARKETPLACE_COUNTRY",
];

/// Marketplace domain column used when no country column exists (`amazon.de`).
pub const MARKETPLACE_COLUMN: &str = "marketplace";

/// Alternate identifiers adopted as the order id when no alias matched.
pub const ORDER_ID_FALLBACKS: &[&str] = &["TRANSACTION_EVENT_ID", "ACTIVITY_TRANSACTION_ID", "ORDER_ID"];

/// Returns the first non-blank cell among `candidates`, in order.
pub fn coalesce<'a>(dataset: &'a Dataset, row: usize, candidates: &[usize]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&column| dataset.cell(row, column))
        .find(|value| !value.trim().is_empty())
}

fn find_header(lowered: &[String], name: &str) -> Option<usize> {
    let wanted = normalize_column_name(name);
    lowered.iter().position(|header| *header == wanted)
}

/// Column positions of one dataset resolved against the static tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    fields: [Option<usize>; Field::ALL.len()],
    pub country_candidates: Vec<usize>,
    pub marketplace: Option<usize>,
}

impl ColumnMapping {
    pub fn resolve(dataset: &Dataset) -> Self {
        let mut mapping = ColumnMapping::default();
        let lowered = dataset
            .headers
            .iter()
            .map(|h| normalize_column_name(h))
            .collect::<Vec<_>>();
        for &(alias, field) in COLUMN_ALIASES {
            let slot = field.slot();
            if mapping.fields[slot].is_none() {
                mapping.fields[slot] = find_header(&lowered, alias);
            }
        }
        if mapping.fields[Field::OrderId.slot()].is_none() {
            mapping.fields[Field::OrderId.slot()] = ORDER_ID_FALLBACKS
                .iter()
                .find_map(|name| find_header(&lowered, name));
        }

        mapping.country_candidates = COUNTRY_PRIORITY
            .iter()
            .filter_map(|name| find_header(&lowered, name))
            .collect();
        mapping.marketplace = find_header(&lowered, MARKETPLACE_COLUMN);

        debug!(
            "Resolved columns: {}",
            Field::ALL
                .iter()
                .filter_map(|field| mapping
                    .column(*field)
                    .map(|idx| format!("{}<-{}", field, dataset.headers[idx])))
                .join(", ")
        );
        debug!(
            "Country candidates: [{}]",
            mapping
                .country_candidates
                .iter()
                .map(|idx| dataset.headers[*idx].as_str())
                .join(", ")
        );
        mapping
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.fields[field.slot()]
    }

    pub fn has(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    pub fn value<'a>(&self, dataset: &'a Dataset, row: usize, field: Field) -> Option<&'a str> {
        self.column(field).and_then(|column| dataset.cell(row, column))
    }
}
