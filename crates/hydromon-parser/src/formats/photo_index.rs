use super::schema::{COMMENT, FILE_NAME, IDENTIFIER, TAG_PREFIX, TAG_SUFFIX, UNIQUE_ID};
use super::SourceFeed;
use crate::record::SourceRecord;

/// Photo metadata export; one row per photo file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoIndexFeed;

impl SourceFeed for PhotoIndexFeed {
    fn name(&self) -> &'static str {
        "photo index"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[FILE_NAME, IDENTIFIER, UNIQUE_ID, COMMENT]
    }
}

/// `Tags_<n>_Key` column names ordered by `n`.
pub fn tag_columns(columns: &[String]) -> Vec<&str> {
    let mut numbered: Vec<(u32, &str)> = columns
        .iter()
        .filter_map(|column| {
            let number = column
                .strip_prefix(TAG_PREFIX)?
                .strip_suffix(TAG_SUFFIX)?
                .parse::<u32>()
                .ok()?;
            Some((number, column.as_str()))
        })
        .collect();
    numbered.sort_by_key(|(number, _)| *number);
    numbered.into_iter().map(|(_, column)| column).collect()
}

pub fn tags(record: &SourceRecord) -> Vec<String> {
    tag_columns(record.columns())
        .into_iter()
        .filter_map(|column| record.get(column))
        .map(str::to_string)
        .collect()
}
