//! Rendering of summaries and normalized rows for export.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use encoding_rs::Encoding;

use crate::{
    aggregate::{JurisdictionSummary, SUMMARY_HEADERS},
    data::format_amount,
    io_utils,
    record::{Transaction, TransactionSet},
    table::{self, Align},
};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

pub const ROW_HEADERS: [&str; 19] = [
    "order_id",
    "transaction_type",
    "date",
    "country",
    "channel",
    "vat_collector",
    "net",
    "gross",
    "vat_amount",
    "rate",
    "currency",
    "sales_channel",
    "vat_amount_items",
    "vat_amount_items_total",
    "vat_amount_shipping",
    "vat_amount_shipping_total",
    "vat_amount_giftwrap",
    "vat_amount_giftwrap_total",
    "platform_collected",
];

const SUMMARY_ALIGNMENT: [Align; 6] = [
    Align::Left,
    Align::Right,
    Align::Right,
    Align::Right,
    Align::Right,
    Align::Right,
];

pub fn summary_records(summary: &[JurisdictionSummary]) -> Vec<Vec<String>> {
    summary.iter().map(JurisdictionSummary::to_record).collect()
}

pub fn render_summary_table(summary: &[JurisdictionSummary]) -> String {
    let headers = SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    table::render_table(&headers, &summary_records(summary), &SUMMARY_ALIGNMENT)
}

pub fn write_summary(
    summary: &[JurisdictionSummary],
    format: OutputFormat,
    output: Option<&Path>,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<()> {
    match format {
        OutputFormat::Table => io_utils::write_bytes(output, render_summary_table(summary).as_bytes()),
        OutputFormat::Csv => {
            io_utils::write_csv(output, delimiter, encoding, &SUMMARY_HEADERS, summary_records(summary))
                .map(|_| ())
        }
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(summary).context("Serializing summary to JSON")?;
            json.push('\n');
            io_utils::write_bytes(output, json.as_bytes())
        }
    }
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn rate(value: Option<f64>) -> String {
    value.map(|r| format!("{r}")).unwrap_or_default()
}

pub fn row_record(row: &Transaction) -> Vec<String> {
    vec![
        optional(row.order_id.as_deref()),
        optional(row.transaction_type.as_deref()),
        row.date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        row.country.clone(),
        row.channel.to_string(),
        row.vat_collector.to_string(),
        format_amount(row.net),
        format_amount(row.gross),
        format_amount(row.vat_amount),
        rate(row.rate),
        optional(row.currency.as_deref()),
        optional(row.sales_channel.as_deref()),
        format_amount(row.components.items),
        format_amount(row.components.items_total),
        format_amount(row.components.shipping),
        format_amount(row.components.shipping_total),
        format_amount(row.components.giftwrap),
        format_amount(row.components.giftwrap_total),
        row.vat_collector.is_platform().to_string(),
    ]
}

/// Writes normalized and derived rows as CSV for audit.
pub fn write_rows(
    rows: &TransactionSet,
    output: Option<&Path>,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<usize> {
    io_utils::write_csv(
        output,
        delimiter,
        encoding,
        &ROW_HEADERS,
        rows.rows.iter().map(row_record),
    )
}

/// First `limit` normalized rows as a table, for diagnostics.
pub fn render_rows_preview(rows: &TransactionSet, limit: usize) -> String {
    let headers = ROW_HEADERS[..10].iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let records = rows
        .rows
        .iter()
        .take(limit)
        .map(|row| row_record(row).into_iter().take(10).collect())
        .collect::<Vec<_>>();
    table::render_table(&headers, &records, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Channel, Collector};

    #[test]
    fn row_record_formats_amounts_and_flags() {
        let mut row = Transaction::new("DE");
        row.order_id = Some("A-1".into());
        row.channel = Channel::Fba;
        row.vat_collector = Collector::Amazon;
        row.net = Some(100.0);
        row.vat_amount = Some(19.0);
        row.rate = Some(19.0);

        let record = row_record(&row);
        assert_eq!(record.len(), ROW_HEADERS.len());
        assert_eq!(record[0], "A-1");
        assert_eq!(record[2], "");
        assert_eq!(record[4], "FBA");
        assert_eq!(record[5], "AMAZON");
        assert_eq!(record[6], "100.00");
        assert_eq!(record[7], "");
        assert_eq!(record[9], "19");
        assert_eq!(record[18], "true");
    }

    #[test]
    fn summary_table_lists_countries_in_order() {
        let summary = vec![JurisdictionSummary {
            country: "FR".into(),
            orders: 3,
            net: 100.0,
            vat_due: 20.0,
            amazon_collected: 5.0,
            vat_to_declare: 15.0,
        }];
        let rendered = render_summary_table(&summary);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert!(lines[0].starts_with("country  orders"));
        assert!(lines[2].starts_with("FR"));
        assert!(lines[2].ends_with("15.00"));
    }
}
