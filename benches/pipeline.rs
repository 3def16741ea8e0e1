use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use tempfile::TempDir;
use vat_estimator::{config::Config, io_utils, pipeline};

const COUNTRIES: [&str; 6] = ["DE", "FR", "IT", "ES", "PL", "NL"];

fn generate_report(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("vat_report.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(
        file,
        "TRANSACTION_EVENT_ID,TAX_CALCULATION_DATE,SALE_ARRIVAL_COUNTRY,TAX_COLLECTION_RESPONSIBILITY,TOTAL_ACTIVITY_VALUE_AMT_VAT_INCL,PRICE_OF_ITEMS_VAT_RATE_PERCENT"
    )
    .expect("header");
    for i in 0..rows {
        let country = COUNTRIES[i % COUNTRIES.len()];
        let collector = if i % 4 == 0 { "Marketplace" } else { "Seller" };
        let rate = if i % 5 == 0 { "" } else { "0.19" };
        let day = (i % 28) + 1;
        writeln!(
            file,
            "EV-{i},{day:02}-03-2024,{country},{collector},{}.{:02},{rate}",
            10 + i % 90,
            i % 100
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn bench_pipeline(c: &mut Criterion) {
    let (temp_dir, csv_path) = generate_report(50_000);
    let settings = Config::default().settings();
    let dataset = io_utils::read_dataset(&csv_path, None, UTF_8, None).expect("read report");

    let mut group = c.benchmark_group("pipeline");

    group.bench_function("read_report", |b| {
        b.iter(|| io_utils::read_dataset(&csv_path, None, UTF_8, None).expect("read report"));
    });

    group.bench_function("normalize_derive_summarize", |b| {
        b.iter(|| pipeline::run(&dataset, &settings, None).expect("pipeline"));
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
