use std::path::Path;

use super::common::KeyedRecords;
use super::schema::{MONITORING_TYPE, STATION_ID, STATION_NAME};
use super::SourceFeed;
use crate::errors::SourceError;
use crate::record::SourceRecord;

/// District monitoring sheet: station attributes and installed equipment.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitoringFeed;

impl SourceFeed for MonitoringFeed {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[STATION_ID, STATION_NAME, MONITORING_TYPE]
    }
}

impl MonitoringFeed {
    pub fn read_cache(&self, path: &Path) -> Result<MonitoringCache, SourceError> {
        Ok(MonitoringCache::new(self.read_path(path)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringLookup<'a> {
    Missing,
    Found(&'a SourceRecord),
    Ambiguous(usize),
}

/// Monitoring sheet held in memory for random access by location key.
#[derive(Debug, Clone, Default)]
pub struct MonitoringCache {
    records: KeyedRecords,
}

impl MonitoringCache {
    pub fn new(records: Vec<SourceRecord>) -> Self {
        Self {
            records: KeyedRecords::build(records, STATION_ID),
        }
    }

    pub fn lookup(&self, location_key: &str) -> MonitoringLookup<'_> {
        match self.records.get(location_key) {
            [] => MonitoringLookup::Missing,
            [record] => MonitoringLookup::Found(record),
            many => MonitoringLookup::Ambiguous(many.len()),
        }
    }

    pub fn station_count(&self) -> usize {
        self.records.key_count()
    }
}
