fn main() {
    if let Err(err) = vat_estimator::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
