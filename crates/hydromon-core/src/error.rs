// crates/hydromon-core/src/error.rs

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::metrics::Tally;
use crate::store::{AttachmentTarget, TargetTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Location,
    DataLogger,
    Sensor,
    MeasuringPoint,
    Photo,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Location => "Location",
            EntityKind::DataLogger => "Data Logger",
            EntityKind::Sensor => "Sensor",
            EntityKind::MeasuringPoint => "Measuring Point",
            EntityKind::Photo => "Photo",
        };
        f.write_str(label)
    }
}

fn shown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<absent>")
}

/// A source row that cannot become a valid entity. Row-local: the loader
/// counts it and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{entity} {key}: missing required field '{field}'")]
    Missing {
        entity: EntityKind,
        key: String,
        field: &'static str,
    },

    #[error("{entity} {key}: invalid {field} '{value}': {reason}")]
    Invalid {
        entity: EntityKind,
        key: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "{entity} {key}: {label} type and serial number must both be present or both absent (type: {}, serial: {})",
        shown(.type_value),
        shown(.serial_value)
    )]
    Pairing {
        entity: EntityKind,
        key: String,
        label: String,
        type_value: Option<String>,
        serial_value: Option<String>,
    },

    #[error(
        "{entity} {key}: {type_count} sensor types ({types}) but {serial_count} serial numbers ({serials})"
    )]
    SensorListMismatch {
        entity: EntityKind,
        key: String,
        types: String,
        serials: String,
        type_count: usize,
        serial_count: usize,
    },

    #[error("{entity} {key}: {message}")]
    Invariant {
        entity: EntityKind,
        key: String,
        message: String,
    },

    #[error("{entity} {key}: {message}")]
    Source {
        entity: EntityKind,
        key: String,
        message: String,
    },
}

impl ValidationError {
    pub fn entity(&self) -> EntityKind {
        match self {
            ValidationError::Missing { entity, .. }
            | ValidationError::Invalid { entity, .. }
            | ValidationError::Pairing { entity, .. }
            | ValidationError::SensorListMismatch { entity, .. }
            | ValidationError::Invariant { entity, .. }
            | ValidationError::Source { entity, .. } => *entity,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ValidationError::Missing { key, .. }
            | ValidationError::Invalid { key, .. }
            | ValidationError::Pairing { key, .. }
            | ValidationError::SensorListMismatch { key, .. }
            | ValidationError::Invariant { key, .. }
            | ValidationError::Source { key, .. } => key,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("{metrics}: {kind} {counter} count must not be negative (got {value})")]
    NegativeCount {
        metrics: String,
        kind: Tally,
        counter: &'static str,
        value: i64,
    },

    #[error("{metrics}: {kind} is not tracked by this metrics set")]
    UntrackedKind { metrics: String, kind: Tally },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{table} write rejected: {message}")]
    Rejected { table: TargetTable, message: String },

    #[error("transaction already finished")]
    TransactionClosed,
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("{target}: unknown content type for photo file '{file_name}'")]
    UnknownContentType {
        target: AttachmentTarget,
        file_name: String,
    },

    #[error("{target}: did not find a parent row for filter [{filter}]")]
    NoMatch {
        target: AttachmentTarget,
        filter: String,
    },

    #[error("{target}: found {count} parent rows for filter [{filter}]")]
    MultipleMatches {
        target: AttachmentTarget,
        filter: String,
        count: usize,
    },

    #[error("{target}: attachment already exists (parent {parent_id}, file name '{file_name}')")]
    AlreadyExists {
        target: AttachmentTarget,
        parent_id: Uuid,
        file_name: String,
    },

    #[error("{target}: {source}")]
    Store {
        target: AttachmentTarget,
        #[source]
        source: StoreError,
    },
}

/// Conditions that make the whole run pointless. Never row-local.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error(
        "invalid OS credentials: this process must run as one of [{}], but is running as {actual}",
        .expected.join(", ")
    )]
    Credentials {
        expected: Vec<String>,
        actual: String,
    },

    #[error("no database URL: pass --server or set DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("target store unreachable: {message}")]
    Unreachable { message: String },

    #[error("target store schema is incomplete, missing tables: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error(
        "target store has no values for coded domains: {}; run `hydromon-admin db-seed`",
        .domains.join(", ")
    )]
    Unseeded { domains: Vec<String> },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open a write transaction for Location {location_id}: {source}")]
    Begin {
        location_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to roll back the transaction for Location {location_id}: {source}")]
    Rollback {
        location_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to list photo files in {pattern}: {message}")]
    PhotoDirectory { pattern: String, message: String },
}
