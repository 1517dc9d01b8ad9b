use std::path::{Path, PathBuf};

use hydromon_parser::formats::schema::{COMMENT, FILE_NAME, IDENTIFIER, UNIQUE_ID};
use hydromon_parser::formats::tags;
use hydromon_parser::{location_key, SourceRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::config::PhotoConfig;
use crate::error::{EntityKind, ValidationError};
use crate::transform::to_json;

static MP_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"MP#([0-9a-f]{32})").expect("valid measuring point id regex"));

/// One indexed photo and the entities it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub file_name: String,
    pub path: PathBuf,
    pub location: String,
    pub photo_id: Uuid,
    pub tags: Vec<String>,
    pub is_location: bool,
    pub is_mp: bool,
    pub mp_ids: Vec<Uuid>,
}

impl Photo {
    pub fn from_index_record(
        record: &SourceRecord,
        photo_dir: &Path,
        config: &PhotoConfig,
    ) -> Result<Self, ValidationError> {
        let raw_id = record.get(UNIQUE_ID);
        let key = raw_id.unwrap_or("<unknown>");

        let file_name = record
            .get(FILE_NAME)
            .ok_or_else(|| missing(key, FILE_NAME))?;
        let raw_id = raw_id.ok_or_else(|| missing(key, UNIQUE_ID))?;
        let photo_id = Uuid::parse_str(raw_id)
            .map_err(|err| invalid(key, UNIQUE_ID, raw_id, err.to_string()))?;

        let raw_location = record
            .get(IDENTIFIER)
            .ok_or_else(|| missing(key, IDENTIFIER))?;
        let location = location_key(raw_location).ok_or_else(|| {
            invalid(key, IDENTIFIER, raw_location, "not a location number".to_string())
        })?;

        let tags = tags(record);
        let has_tag = |wanted: &str| tags.iter().any(|tag| tag == wanted);
        let is_location = has_tag(&config.location_tag);
        let is_mp = has_tag(&config.measuring_point_tag);

        let comment = record.get(COMMENT).unwrap_or_default();
        let mp_ids = if is_mp { parse_mp_ids(comment) } else { Vec::new() };

        if is_mp && mp_ids.is_empty() {
            return Err(invalid(
                key,
                COMMENT,
                comment,
                "photo is tagged as a measuring point photo but names no MP#<id>".to_string(),
            ));
        }
        if !is_location && !is_mp {
            return Err(invalid(
                key,
                "Tags",
                &tags.join(", "),
                format!(
                    "neither '{}' nor '{}' tag present",
                    config.location_tag, config.measuring_point_tag
                ),
            ));
        }

        Ok(Self {
            file_name: file_name.to_string(),
            path: photo_dir.join(file_name),
            location,
            photo_id,
            tags,
            is_location,
            is_mp,
            mp_ids,
        })
    }

    /// Photo id as the upper-case hyphenated text the index uses.
    pub fn photo_id_text(&self) -> String {
        upper_hyphenated(&self.photo_id)
    }

    pub fn read_data(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

pub fn upper_hyphenated(id: &Uuid) -> String {
    id.hyphenated().to_string().to_uppercase()
}

/// Every distinct `MP#<32 hex>` reference in `comment`, in order.
pub fn parse_mp_ids(comment: &str) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for captures in MP_ID_PATTERN.captures_iter(comment) {
        if let Ok(id) = Uuid::parse_str(&captures[1]) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

fn missing(key: &str, field: &'static str) -> ValidationError {
    ValidationError::Missing {
        entity: EntityKind::Photo,
        key: key.to_string(),
        field,
    }
}

fn invalid(key: &str, field: &'static str, value: &str, reason: String) -> ValidationError {
    ValidationError::Invalid {
        entity: EntityKind::Photo,
        key: key.to_string(),
        field,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_record(tags: [&str; 2], comment: &str) -> SourceRecord {
        SourceRecord::from_pairs([
            ("FileName", "IMG_0001.JPG"),
            ("Identifier", "1234"),
            ("UniqueId", "5c1e0c4b9a8d4e2f8b7a6c5d4e3f2a1b"),
            ("Comment", comment),
            ("Tags_0_Key", tags[0]),
            ("Tags_1_Key", tags[1]),
        ])
        .unwrap()
    }

    #[test]
    fn location_photo_is_recognised() {
        let photo = Photo::from_index_record(
            &index_record(["Site Photo", ""], ""),
            Path::new("/photos"),
            &PhotoConfig::default(),
        )
        .unwrap();
        assert!(photo.is_location);
        assert!(!photo.is_mp);
        assert_eq!(photo.location, "001234");
        assert_eq!(photo.path, Path::new("/photos/IMG_0001.JPG"));
        assert_eq!(photo.photo_id_text(), "5C1E0C4B-9A8D-4E2F-8B7A-6C5D4E3F2A1B");
    }

    #[test]
    fn mp_ids_are_parsed_from_comment() {
        let photo = Photo::from_index_record(
            &index_record(
                ["MP", "Site Photo"],
                "Bolt MP#0f9c2a4e5b6d4c8e9a1b2c3d4e5f6a7b and MP#1a2b3c4d5e6f47a8b9c0d1e2f3a4b5c6",
            ),
            Path::new("/photos"),
            &PhotoConfig::default(),
        )
        .unwrap();
        assert!(photo.is_location);
        assert!(photo.is_mp);
        let ids: Vec<String> = photo.mp_ids.iter().map(upper_hyphenated).collect();
        assert_eq!(
            ids,
            vec![
                "0F9C2A4E-5B6D-4C8E-9A1B-2C3D4E5F6A7B".to_string(),
                "1A2B3C4D-5E6F-47A8-B9C0-D1E2F3A4B5C6".to_string()
            ]
        );
    }

    #[test]
    fn mp_photo_without_id_is_an_error() {
        let err = Photo::from_index_record(
            &index_record(["MP", ""], "no reference here"),
            Path::new("/photos"),
            &PhotoConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Invalid {
                field: "Comment",
                ..
            }
        ));
    }

    #[test]
    fn tags_match_exactly() {
        let err = Photo::from_index_record(
            &index_record(["site photo", "mp"], ""),
            Path::new("/photos"),
            &PhotoConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "Tags", .. }));
    }

    #[test]
    fn untagged_photo_is_rejected() {
        assert!(Photo::from_index_record(
            &index_record(["Landscape", ""], ""),
            Path::new("/photos"),
            &PhotoConfig::default(),
        )
        .is_err());
    }

    #[test]
    fn upper_case_hex_is_not_an_mp_reference() {
        assert!(parse_mp_ids("MP#0F9C2A4E5B6D4C8E9A1B2C3D4E5F6A7B").is_empty());
        assert_eq!(parse_mp_ids("MP#0f9c2a4e5b6d4c8e9a1b2c3d4e5f6a7b MP#0f9c2a4e5b6d4c8e9a1b2c3d4e5f6a7b").len(), 1);
    }
}
