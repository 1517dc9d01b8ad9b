mod common;
mod measuring_points;
mod monitoring;
mod photo_index;
pub mod schema;
mod stations;

use std::io::Read;
use std::path::Path;

use crate::errors::SourceError;
use crate::record::SourceRecord;

pub use common::KeyedRecords;
pub use measuring_points::{MeasuringPointFeed, MeasuringPointIndex};
pub use monitoring::{MonitoringCache, MonitoringFeed, MonitoringLookup};
pub use photo_index::{tag_columns, tags, PhotoIndexFeed};
pub use stations::StationsFeed;

/// A CSV export with a fixed set of required columns.
pub trait SourceFeed {
    fn name(&self) -> &'static str;

    fn required_columns(&self) -> &'static [&'static str];

    fn read<R: Read>(&self, reader: R) -> Result<Vec<SourceRecord>, SourceError> {
        common::read_records(self.name(), self.required_columns(), reader)
    }

    fn read_path(&self, path: &Path) -> Result<Vec<SourceRecord>, SourceError> {
        let file = std::fs::File::open(path).map_err(|source| SourceError::Open {
            feed: self.name(),
            path: path.to_path_buf(),
            source,
        })?;
        self.read(file)
    }
}
