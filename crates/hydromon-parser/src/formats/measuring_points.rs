use std::path::Path;

use super::common::KeyedRecords;
use super::schema::{ELEVATION, IDENTIFIER, MEASURED_AGAINST_LOCAL_DATUM, NAME, UNIQUE_ID};
use super::SourceFeed;
use crate::errors::SourceError;
use crate::record::SourceRecord;

/// Reference point export of the time-series system.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasuringPointFeed;

impl SourceFeed for MeasuringPointFeed {
    fn name(&self) -> &'static str {
        "measuring points"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[IDENTIFIER, UNIQUE_ID, NAME, MEASURED_AGAINST_LOCAL_DATUM, ELEVATION]
    }
}

impl MeasuringPointFeed {
    pub fn read_index(&self, path: &Path) -> Result<MeasuringPointIndex, SourceError> {
        Ok(MeasuringPointIndex::new(self.read_path(path)?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeasuringPointIndex {
    records: KeyedRecords,
}

impl MeasuringPointIndex {
    pub fn new(records: Vec<SourceRecord>) -> Self {
        Self {
            records: KeyedRecords::build(records, IDENTIFIER),
        }
    }

    /// Candidate measuring points of one location, in feed order.
    pub fn for_location(&self, location_key: &str) -> &[SourceRecord] {
        self.records.get(location_key)
    }
}
