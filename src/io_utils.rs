//! I/O utilities for reading seller reports and writing results.
//!
//! All file access in vat-estimator flows through this module:
//!
//! - **Delimiter resolution**: `.tsv`/`.txt` reports (the format Seller Central
//!   uses for flat-file downloads) default to tab, everything else to comma.
//! - **Encoding**: input decoding and output encoding via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **Batches**: each input file becomes one raw [`Dataset`]; unreadable
//!   files are skipped with a warning so that one bad upload does not sink
//!   the rest.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use encoding_rs::{Encoding, UTF_8};
use log::{info, warn};

use crate::dataset::Dataset;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => {
            DEFAULT_TSV_DELIMITER
        }
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    match path.and_then(|p| p.extension()).and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    let mut decoded = decode_record(&headers, encoding)?;
    if let Some(first) = decoded.first_mut() {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }
    Ok(decoded)
}

/// Reads a whole report into memory, up to `limit` data rows when given.
pub fn read_dataset(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    limit: Option<usize>,
) -> Result<Dataset> {
    let delimiter = resolve_input_delimiter(path, delimiter);
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    let headers = reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers of {path:?}"))?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        bail!("Report {path:?} has no header row");
    }
    let mut dataset = Dataset::new(headers);
    for (row_idx, record) in reader.byte_records().enumerate() {
        if limit.is_some_and(|limit| row_idx >= limit) {
            break;
        }
        let record = record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} in {path:?}", row_idx + 2))?;
        dataset.push_row(decoded);
    }
    Ok(dataset)
}

/// Reads every input independently and concatenates the readable ones.
pub fn read_batches(
    inputs: &[PathBuf],
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Dataset> {
    let mut batches = Vec::with_capacity(inputs.len());
    for input in inputs {
        match read_dataset(input, delimiter, encoding, None) {
            Ok(batch) => {
                info!(
                    "Read {} row(s) across {} column(s) from {:?}",
                    batch.len(),
                    batch.headers.len(),
                    input
                );
                batches.push(batch);
            }
            Err(err) => warn!("Skipping {input:?}: {err:#}"),
        }
    }
    if batches.is_empty() {
        bail!("None of the {} input file(s) could be read", inputs.len());
    }
    Ok(Dataset::concat(batches))
}

/// Writes CSV records to a file or stdout, encoding the output as requested.
pub fn write_csv<I, R>(
    path: Option<&Path>,
    delimiter: u8,
    encoding: &'static Encoding,
    headers: &[&str],
    records: I,
) -> Result<usize>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(delimiter).double_quote(true);
    let mut writer = builder.from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("Writing output headers")?;
    let mut written = 0usize;
    for record in records {
        writer
            .write_record(record)
            .with_context(|| format!("Writing output row {}", written + 2))?;
        written += 1;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV output: {}", err.error()))?;
    let bytes = encode_output(buffer, encoding)?;
    write_bytes(path, &bytes)?;
    Ok(written)
}

fn encode_output(buffer: Vec<u8>, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(buffer);
    }
    let text = String::from_utf8(buffer).context("CSV output is not valid UTF-8")?;
    let (encoded, _, had_errors) = encoding.encode(&text);
    if had_errors {
        bail!("Failed to encode output using {}", encoding.name());
    }
    Ok(encoded.into_owned())
}

pub fn write_bytes(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) if !is_dash(p) => {
            let mut writer = BufWriter::new(
                File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
            );
            writer
                .write_all(bytes)
                .with_context(|| format!("Writing output file {p:?}"))?;
            writer.flush().with_context(|| format!("Flushing {p:?}"))
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Writing to stdout")?;
            stdout.flush().context("Flushing stdout")
        }
    }
}
