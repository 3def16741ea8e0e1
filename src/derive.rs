//! Amount derivation under partial information.
//!
//! Given any consistent subset of net, gross, VAT amount and rate, fills in
//! the missing members. Each step only writes fields that are still null, in
//! this order:
//!
//! 1. `gross = net + vat_amount`
//! 2. `net = gross - vat_amount`
//! 3. `vat_amount = net * rate / 100`, else `gross - gross / (1 + rate / 100)`
//! 4. `net = gross - vat_amount` again, consuming a VAT amount from step 3
//!
//! Rows lacking the inputs for a step are left untouched.

use log::debug;

use crate::{
    config::RateTable,
    mapping::Field,
    record::{Transaction, TransactionSet},
};

/// Fills null row rates from the country's standard rate.
///
/// An explicit per-row rate always wins over the country default.
pub fn apply_country_rates(set: &mut TransactionSet, rates: &RateTable) {
    let mut filled = 0usize;
    for row in &mut set.rows {
        if row.rate.is_none() {
            row.rate = rates.get(&row.country);
            filled += usize::from(row.rate.is_some());
        }
    }
    set.fields.insert(Field::Rate);
    debug!("Filled {filled} rate(s) from country defaults");
}

/// Derives missing amounts of a single row in place.
pub fn derive_row(row: &mut Transaction) {
    if row.gross.is_none()
        && let (Some(net), Some(vat)) = (row.net, row.vat_amount)
    {
        row.gross = Some(net + vat);
    }
    if row.net.is_none()
        && let (Some(gross), Some(vat)) = (row.gross, row.vat_amount)
    {
        row.net = Some(gross - vat);
    }
    if row.vat_amount.is_none()
        && let Some(rate) = row.rate
    {
        if let Some(net) = row.net {
            row.vat_amount = Some(net * rate / 100.0);
        } else if let Some(gross) = row.gross {
            row.vat_amount = Some(gross - gross / (1.0 + rate / 100.0));
        }
    }
    if row.net.is_none()
        && let (Some(gross), Some(vat)) = (row.gross, row.vat_amount)
    {
        row.net = Some(gross - vat);
    }
}

/// Derives amounts for every row and records which amount columns now exist.
pub fn derive_amounts(set: &mut TransactionSet) {
    let fields = &mut set.fields;
    if !fields.contains(Field::Gross)
        && fields.contains(Field::Net)
        && fields.contains(Field::VatAmount)
    {
        fields.insert(Field::Gross);
    }
    if !fields.contains(Field::Net)
        && fields.contains(Field::Gross)
        && fields.contains(Field::VatAmount)
    {
        fields.insert(Field::Net);
    }
    if !fields.contains(Field::VatAmount)
        && fields.contains(Field::Rate)
        && (fields.contains(Field::Net) || fields.contains(Field::Gross))
    {
        fields.insert(Field::VatAmount);
    }
    if !fields.contains(Field::Net)
        && fields.contains(Field::Gross)
        && fields.contains(Field::VatAmount)
    {
        fields.insert(Field::Net);
    }

    let before = count_complete(&set.rows);
    for row in &mut set.rows {
        derive_row(row);
    }
    debug!(
        "Derived amounts: {} of {} row(s) complete (was {before})",
        count_complete(&set.rows),
        set.rows.len()
    );
}

fn count_complete(rows: &[Transaction]) -> usize {
    rows.iter()
        .filter(|r| r.net.is_some() && r.gross.is_some() && r.vat_amount.is_some())
        .count()
}
