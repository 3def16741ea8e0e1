//! Raw tabular dataset as decoded from a report file.
//!
//! A [`Dataset`] keeps the report's own column names and string cells. Blank
//! cells and cells missing from short records are stored as `None`.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::data::normalize_column_name;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Builds a dataset from string rows, treating empty strings as null.
    pub fn from_records<H, R>(headers: &[H], records: &[R]) -> Self
    where
        H: AsRef<str>,
        R: AsRef<[&'static str]>,
    {
        let mut dataset = Self::new(headers.iter().map(|h| h.as_ref().to_string()).collect());
        for record in records {
            dataset.push_row(record.as_ref().iter().map(|s| s.to_string()).collect());
        }
        dataset
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, cells: Vec<String>) {
        let width = self.headers.len();
        let mut row = cells
            .into_iter()
            .take(width)
            .map(|cell| if cell.trim().is_empty() { None } else { Some(cell) })
            .collect::<Vec<_>>();
        row.resize(width, None);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }

    /// Collapses columns sharing a (case-insensitive) name into the first one,
    /// keeping per row the first non-null value across the duplicates.
    pub fn collapse_duplicate_columns(&mut self) {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (idx, header) in self.headers.iter().enumerate() {
            let key = normalize_column_name(header);
            match lookup.get(&key) {
                Some(&group) => groups[group].1.push(idx),
                None => {
                    lookup.insert(key.clone(), groups.len());
                    groups.push((key, vec![idx]));
                }
            }
        }
        if groups.len() == self.headers.len() {
            return;
        }
        debug!(
            "Collapsing duplicate columns: {}",
            groups
                .iter()
                .filter(|(_, members)| members.len() > 1)
                .map(|(name, members)| format!("{name} x{}", members.len()))
                .join(", ")
        );

        let headers = groups
            .iter()
            .map(|(_, members)| self.headers[members[0]].clone())
            .collect();
        let rows = self
            .rows
            .iter_mut()
            .map(|row| {
                groups
                    .iter()
                    .map(|(_, members)| members.iter().find_map(|&idx| row[idx].take()))
                    .collect()
            })
            .collect();
        self.headers = headers;
        self.rows = rows;
    }

    /// Concatenates batches under the union of their columns.
    ///
    /// Columns are matched case-insensitively and ordered by first appearance;
    /// a column absent from a batch is null for that batch's rows.
    pub fn concat(batches: Vec<Dataset>) -> Dataset {
        let mut headers: Vec<String> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for batch in &batches {
            for header in &batch.headers {
                let key = normalize_column_name(header);
                if !lookup.contains_key(&key) {
                    lookup.insert(key, headers.len());
                    headers.push(header.clone());
                }
            }
        }

        let width = headers.len();
        let mut combined = Dataset::new(headers);
        for mut batch in batches {
            batch.collapse_duplicate_columns();
            let positions = batch
                .headers
                .iter()
                .map(|header| lookup[&normalize_column_name(header)])
                .collect::<Vec<_>>();
            for row in batch.rows {
                let mut aligned = vec![None; width];
                for (cell, &target) in row.into_iter().zip(&positions) {
                    aligned[target] = cell;
                }
                combined.rows.push(aligned);
            }
        }
        combined
    }
}
