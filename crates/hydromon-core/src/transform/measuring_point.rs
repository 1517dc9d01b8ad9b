use std::fmt;

use hydromon_parser::formats::schema::{
    DECOMMISSIONED_DATE, DESCRIPTION, ELEVATION, MEASURED_AGAINST_LOCAL_DATUM, NAME, UNIQUE_ID,
};
use hydromon_parser::SourceRecord;
use serde::Serialize;
use uuid::Uuid;

use super::{to_json, TransformRules};
use crate::error::{EntityKind, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Only points measured against the real datum are loaded; a missing
    /// flag counts as not measured against it.
    LocalAssumedDatum { flag: Option<String> },
    PlaceholderName { name: String },
    Decommissioned { date: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::LocalAssumedDatum { flag } => write!(
                f,
                "measured against a local assumed datum (flag: {})",
                flag.as_deref().unwrap_or("<absent>")
            ),
            RejectionReason::PlaceholderName { name } => {
                write!(f, "'{name}' is not a physical reference point")
            }
            RejectionReason::Decommissioned { date } => write!(f, "decommissioned on {date}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    Accepted,
    Rejected(RejectionReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedMeasuringPoint {
    pub name: Option<String>,
    pub external_id: Option<String>,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuringPoint {
    pub name: Option<String>,
    pub external_id: Uuid,
    pub description: Option<String>,
    pub elevation: f64,
    pub display_order: u32,
    pub is_active: bool,
}

impl MeasuringPoint {
    pub fn screen(record: &SourceRecord, rules: &TransformRules) -> Screening {
        let flag = record.get(MEASURED_AGAINST_LOCAL_DATUM);
        if !flag.is_some_and(|flag| flag.eq_ignore_ascii_case("false")) {
            return Screening::Rejected(RejectionReason::LocalAssumedDatum {
                flag: flag.map(str::to_string),
            });
        }
        if let Some(name) = record.get(NAME) {
            if rules.is_rejected_name(name) {
                return Screening::Rejected(RejectionReason::PlaceholderName {
                    name: name.to_string(),
                });
            }
        }
        if let Some(date) = record.get(DECOMMISSIONED_DATE) {
            return Screening::Rejected(RejectionReason::Decommissioned {
                date: date.to_string(),
            });
        }
        Screening::Accepted
    }

    /// Builds an accepted point. `display_order` is the 1-based position
    /// among the accepted points of its location.
    pub fn transform(
        key: &str,
        record: &SourceRecord,
        display_order: u32,
    ) -> Result<Self, ValidationError> {
        let raw_id = record.get(UNIQUE_ID).ok_or_else(|| missing(key, "UniqueId"))?;
        let external_id = Uuid::parse_str(raw_id).map_err(|err| ValidationError::Invalid {
            entity: EntityKind::MeasuringPoint,
            key: key.to_string(),
            field: "UniqueId",
            value: raw_id.to_string(),
            reason: err.to_string(),
        })?;

        let raw_elevation = record.get(ELEVATION).ok_or_else(|| missing(key, "Elevation"))?;
        let elevation = raw_elevation
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ValidationError::Invalid {
                entity: EntityKind::MeasuringPoint,
                key: key.to_string(),
                field: "Elevation",
                value: raw_elevation.to_string(),
                reason: "not a number".to_string(),
            })?;

        Ok(Self {
            name: record.get(NAME).map(str::to_string),
            external_id,
            description: record.get(DESCRIPTION).map(str::to_string),
            elevation,
            display_order,
            is_active: true,
        })
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl RejectedMeasuringPoint {
    pub fn from_record(record: &SourceRecord, reason: RejectionReason) -> Self {
        Self {
            name: record.get(NAME).map(str::to_string),
            external_id: record.get(UNIQUE_ID).map(str::to_string),
            reason,
        }
    }
}

fn missing(key: &str, field: &'static str) -> ValidationError {
    ValidationError::Missing {
        entity: EntityKind::MeasuringPoint,
        key: key.to_string(),
        field,
    }
}
