pub mod errors;
pub mod formats;
pub mod keys;
pub mod record;

pub use errors::{RecordError, SourceError};
pub use formats::{
    KeyedRecords, MeasuringPointFeed, MeasuringPointIndex, MonitoringCache, MonitoringFeed,
    MonitoringLookup, PhotoIndexFeed, SourceFeed, StationsFeed,
};
pub use keys::location_key;
pub use record::SourceRecord;

#[cfg(test)]
mod tests;
