use std::collections::HashMap;
use std::io::Read;

use crate::errors::{RecordError, SourceError};
use crate::keys::location_key;
use crate::record::SourceRecord;

const BYTE_ORDER_MARK: char = '\u{feff}';

pub(crate) fn read_records<R: Read>(
    feed: &'static str,
    required: &'static [&'static str],
    reader: R,
) -> Result<Vec<SourceRecord>, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|source| SourceError::Csv { feed, source })?
        .iter()
        .map(|header| header.trim_start_matches(BYTE_ORDER_MARK).trim().to_string())
        .collect();

    check_headers(feed, required, &headers)?;

    let mut records = Vec::new();
    for (row_index, row) in csv_reader.records().enumerate() {
        let row = row.map_err(|source| SourceError::Csv { feed, source })?;
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let record = SourceRecord::new(headers.iter().cloned(), row.iter()).map_err(|source| {
            SourceError::Record {
                feed,
                row_index,
                source,
            }
        })?;
        records.push(record);
    }

    Ok(records)
}

fn check_headers(
    feed: &'static str,
    required: &'static [&'static str],
    headers: &[String],
) -> Result<(), SourceError> {
    let mut seen = HashMap::with_capacity(headers.len());
    for header in headers {
        if seen.insert(header.as_str(), ()).is_some() {
            return Err(SourceError::Header {
                feed,
                source: RecordError::DuplicateColumn {
                    name: header.clone(),
                },
            });
        }
    }

    for column in required {
        if !seen.contains_key(column) {
            return Err(SourceError::MissingColumn { feed, column });
        }
    }
    Ok(())
}

/// Records grouped by the normalised location key found in one column.
#[derive(Debug, Clone, Default)]
pub struct KeyedRecords {
    groups: HashMap<String, Vec<SourceRecord>>,
    unkeyed: Vec<SourceRecord>,
}

impl KeyedRecords {
    pub fn build(records: Vec<SourceRecord>, key_column: &str) -> Self {
        let mut keyed = Self::default();
        for record in records {
            match record.get(key_column).and_then(location_key) {
                Some(key) => keyed.groups.entry(key).or_default().push(record),
                None => keyed.unkeyed.push(record),
            }
        }
        keyed
    }

    pub fn get(&self, key: &str) -> &[SourceRecord] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows whose key column was blank or not a location number.
    pub fn unkeyed(&self) -> &[SourceRecord] {
        &self.unkeyed
    }

    pub fn key_count(&self) -> usize {
        self.groups.len()
    }
}
