use super::schema::{LOCATION_IDENTIFIER, X, Y};
use super::SourceFeed;

/// Station geometry export: one row per location with projected coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationsFeed;

impl SourceFeed for StationsFeed {
    fn name(&self) -> &'static str {
        "stations"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[LOCATION_IDENTIFIER, X, Y]
    }
}
