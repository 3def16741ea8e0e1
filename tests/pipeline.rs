use chrono::NaiveDate;
use vat_estimator::{
    aggregate::{self, JurisdictionSummary},
    config::{Config, RateTable, Settings},
    dataset::Dataset,
    derive,
    error::PipelineError,
    normalize::{classify_collector, normalize},
    period::Period,
    pipeline,
    record::{Channel, Collector, UNKNOWN},
};

fn no_exclusion() -> Settings {
    Settings {
        rates: RateTable::default(),
        excluded_territory: None,
    }
}

fn country_of(summary: &[JurisdictionSummary], code: &str) -> JurisdictionSummary {
    summary
        .iter()
        .find(|row| row.country == code)
        .cloned()
        .unwrap_or_else(|| panic!("no summary row for {code}"))
}

#[test]
fn imputation_country_outranks_ship_to_country() {
    let dataset = Dataset::from_records(
        &["SHIP_TO_COUNTRY", "VAT_CALCULATION_IMPUTATION_COUNTRY", "ARRIVAL_COUNTRY"],
        &[["FR", "de", "IT"], ["FR", "", "it"], ["", "", ""]],
    );
    let set = normalize(&dataset);
    assert_eq!(set.rows[0].country, "DE");
    assert_eq!(set.rows[1].country, "IT");
    assert_eq!(set.rows[2].country, UNKNOWN);
}

#[test]
fn marketplace_domain_supplies_country_without_country_columns() {
    let dataset = Dataset::from_records(&["marketplace", "order-id"], &[["Amazon.de", "A"], ["", "B"]]);
    let set = normalize(&dataset);
    assert_eq!(set.rows[0].country, "DE");
    assert_eq!(set.rows[1].country, UNKNOWN);
}

#[test]
fn collector_wordings_are_classified() {
    assert_eq!(classify_collector(Some("Amazon Services Europe Sarl")), Collector::Amazon);
    assert_eq!(classify_collector(Some("marketplace facilitator")), Collector::Amazon);
    assert_eq!(classify_collector(Some("MPF")), Collector::Amazon);
    assert_eq!(classify_collector(Some(" seller ")), Collector::Seller);
    assert_eq!(classify_collector(Some("nan")), Collector::Seller);
    assert_eq!(classify_collector(None), Collector::Seller);
    assert_eq!(classify_collector(Some("Buyer")), Collector::Other("BUYER".into()));
}

#[test]
fn sales_channel_codes_map_to_fulfillment_channels() {
    let dataset = Dataset::from_records(&["SALES_CHANNEL"], &[["AFN"], ["mfn"], ["XYZ"]]);
    let set = normalize(&dataset);
    let channels = set.rows.iter().map(|r| r.channel.clone()).collect::<Vec<_>>();
    assert_eq!(channels, [Channel::Fba, Channel::Fbm, Channel::Unknown]);
}

#[test]
fn platform_vat_is_netted_out_of_declared_vat() {
    let dataset = Dataset::from_records(
        &["order-id", "ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT", "vat-collection-responsible"],
        &[["A", "DE", "10", "AMAZON"], ["B", "DE", "20", "SELLER"]],
    );
    let output = pipeline::run(&dataset, &no_exclusion(), None).expect("pipeline");
    let de = country_of(&output.summary, "DE");
    assert_eq!(de.orders, 2);
    assert_eq!(de.vat_due, 30.0);
    assert_eq!(de.amazon_collected, 10.0);
    assert_eq!(de.vat_to_declare, 20.0);
}

#[test]
fn summary_is_sorted_by_vat_to_declare_with_stable_ties() {
    let dataset = Dataset::from_records(
        &["ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT"],
        &[["IT", "5"], ["FR", "50"], ["ES", "5"], ["DE", "12"]],
    );
    let output = pipeline::run(&dataset, &no_exclusion(), None).expect("pipeline");
    let order = output
        .summary
        .iter()
        .map(|row| row.country.as_str())
        .collect::<Vec<_>>();
    assert_eq!(order, ["FR", "DE", "IT", "ES"]);
    assert!(output.summary.iter().all(|row| row.orders == 1));
}

#[test]
fn null_amounts_count_as_zero_and_orders_are_distinct() {
    let dataset = Dataset::from_records(
        &["order-id", "ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT"],
        &[["A", "FR", "4"], ["A", "FR", ""], ["", "FR", "1"]],
    );
    let output = pipeline::run(&dataset, &no_exclusion(), None).expect("pipeline");
    let fr = country_of(&output.summary, "FR");
    assert_eq!(fr.orders, 1);
    assert_eq!(fr.vat_due, 5.0);
    assert_eq!(fr.net, 0.0);
}

#[test]
fn missing_vat_column_is_reported() {
    let dataset = Dataset::from_records(&["order-id", "ARRIVAL_COUNTRY"], &[["A", "DE"]]);
    let err = pipeline::run(&dataset, &Config::default().settings(), None).expect_err("no amounts");
    assert_eq!(err, PipelineError::MissingField("vat_amount"));
    assert_eq!(
        err.to_string(),
        "Missing required column 'vat_amount'. Check the report's column mapping."
    );
}

#[test]
fn summarizing_an_empty_set_yields_no_rows() {
    let set = normalize(&Dataset::new(vec![
        "ARRIVAL_COUNTRY".into(),
        "TOTAL_ACTIVITY_VALUE_VAT_AMT".into(),
    ]));
    let summary = aggregate::summarize(&set).expect("empty summary");
    assert!(summary.is_empty());
}

#[test]
fn batches_with_disjoint_columns_are_unioned() {
    let first = Dataset::from_records(&["order-id", "ARRIVAL_COUNTRY"], &[["A", "DE"]]);
    let second = Dataset::from_records(&["Order-Id", "TOTAL_ACTIVITY_VALUE_VAT_AMT"], &[["B", "7"]]);
    let combined = Dataset::concat(vec![first, second]);

    assert_eq!(combined.headers, ["order-id", "ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT"]);
    assert_eq!(combined.len(), 2);
    assert_eq!(combined.cell(0, 2), None);
    assert_eq!(combined.cell(1, 0), Some("B"));
    assert_eq!(combined.cell(1, 1), None);
}

#[test]
fn duplicate_country_columns_collapse_to_first_non_null() {
    let dataset = Dataset::from_records(
        &["ARRIVAL_COUNTRY", "arrival_country", "TOTAL_ACTIVITY_VALUE_VAT_AMT"],
        &[["", "FR", "5"], ["DE", "FR", "3"]],
    );
    let output = pipeline::run(&dataset, &no_exclusion(), None).expect("pipeline");
    assert_eq!(country_of(&output.summary, "FR").vat_due, 5.0);
    assert_eq!(country_of(&output.summary, "DE").vat_due, 3.0);
}

#[test]
fn explicit_row_rate_wins_over_country_default() {
    let dataset = Dataset::from_records(
        &["ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_AMT_VAT_EXCL", "vat_rate"],
        &[["DE", "100", "7"], ["DE", "100", ""]],
    );
    let mut set = normalize(&dataset);
    derive::apply_country_rates(&mut set, &Config::default().settings().rates);
    derive::derive_amounts(&mut set);
    assert_eq!(set.rows[0].vat_amount, Some(7.0));
    assert_eq!(set.rows[1].vat_amount, Some(19.0));
    assert_eq!(set.rows[1].net, Some(100.0));
}

#[test]
fn period_filter_drops_rows_outside_range_and_undated_rows() {
    let dataset = Dataset::from_records(
        &["ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT", "TAX_CALCULATION_DATE"],
        &[
            ["DE", "1", "31-12-2023"],
            ["DE", "2", "01-01-2024"],
            ["DE", "4", "31-01-2024 23:59:59"],
            ["DE", "8", "01-02-2024"],
            ["DE", "16", ""],
        ],
    );
    let period = Period::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .unwrap();
    let output = pipeline::run(&dataset, &no_exclusion(), Some(&period)).expect("pipeline");
    assert_eq!(output.rows.len(), 2);
    assert_eq!(country_of(&output.summary, "DE").vat_due, 6.0);
}

#[test]
fn period_is_ignored_for_reports_without_date_column() {
    let dataset = Dataset::from_records(
        &["ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT"],
        &[["DE", "10"], ["FR", "5"]],
    );
    let period = Period::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
    .unwrap();
    let output = pipeline::run(&dataset, &no_exclusion(), Some(&period)).expect("pipeline");
    assert_eq!(output.rows.len(), 2);
    let order = output
        .summary
        .iter()
        .map(|row| row.country.as_str())
        .collect::<Vec<_>>();
    assert_eq!(order, ["DE", "FR"]);
}

#[test]
fn excluded_territory_is_removed_after_aggregation() {
    let dataset = Dataset::from_records(
        &["ARRIVAL_COUNTRY", "TOTAL_ACTIVITY_VALUE_VAT_AMT"],
        &[["UK", "30"], ["DE", "10"]],
    );
    let settings = Config::default().settings();
    let output = pipeline::run(&dataset, &settings, None).expect("pipeline");
    assert_eq!(output.summary.len(), 1);
    assert_eq!(output.summary[0].country, "DE");
    assert_eq!(output.rows.len(), 2);
}
