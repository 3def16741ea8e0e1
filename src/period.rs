//! Reporting period filter applied before aggregation.

use anyhow::{Result, ensure};
use chrono::{Days, NaiveDate, NaiveDateTime};
use log::warn;

use crate::{mapping::Field, record::TransactionSet};

/// Inclusive calendar range; rows are kept when `from <= date < to + 1 day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        ensure!(from <= to, "Period start {from} is after its end {to}");
        Ok(Self { from, to })
    }

    fn bounds(&self) -> (NaiveDateTime, Option<NaiveDateTime>) {
        let start = self.from.and_time(chrono::NaiveTime::MIN);
        let end = self
            .to
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(chrono::NaiveTime::MIN));
        (start, end)
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let (start, end) = self.bounds();
        timestamp >= start && end.is_none_or(|end| timestamp < end)
    }
}

/// Keeps rows inside the period and returns how many were dropped.
///
/// Rows without a parsed date are dropped. A set without any date column is
/// left as is, since there is nothing to filter on.
pub fn retain_period(set: &mut TransactionSet, period: &Period) -> usize {
    if !set.fields.contains(Field::Date) {
        warn!(
            "Report has no date column; period {} .. {} not applied",
            period.from, period.to
        );
        return 0;
    }
    let before = set.rows.len();
    set.rows
        .retain(|row| row.date.is_some_and(|date| period.contains(date)));
    before - set.rows.len()
}

pub fn parse_period_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("Expected a YYYY-MM-DD date, got '{value}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldSet, Transaction};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn period_end_day_is_inclusive() {
        let period = Period::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        assert!(period.contains(at(2024, 1, 1, 0)));
        assert!(period.contains(at(2024, 3, 31, 23)));
        assert!(!period.contains(at(2024, 4, 1, 0)));
        assert!(!period.contains(at(2023, 12, 31, 23)));
    }

    #[test]
    fn retain_period_drops_undated_rows() {
        let mut dated = Transaction::new("DE");
        dated.date = Some(at(2024, 2, 1, 12));
        let mut late = Transaction::new("DE");
        late.date = Some(at(2024, 5, 1, 12));
        let mut set = TransactionSet {
            fields: FieldSet::from([Field::Date]),
            rows: vec![dated, late, Transaction::new("FR")],
        };
        let period = Period::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(retain_period(&mut set, &period), 2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn retain_period_keeps_everything_without_date_column() {
        let mut set = TransactionSet {
            fields: FieldSet::from([Field::VatAmount]),
            rows: vec![Transaction::new("DE"), Transaction::new("FR")],
        };
        let period = Period::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(retain_period(&mut set, &period), 0);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn inverted_period_is_rejected() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(Period::new(from, to).is_err());
    }

    #[test]
    fn parse_period_date_requires_iso_format() {
        assert!(parse_period_date("2024-01-31").is_ok());
        assert!(parse_period_date("31/01/2024").is_err());
    }
}
