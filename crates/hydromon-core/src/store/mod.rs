//! Target store seam. The loaders only talk to these traits; `PgStore`
//! writes to PostgreSQL, `MemoryStore` keeps everything in process.

mod memory;
mod postgres;
mod rows;

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::metrics::Tally;
use crate::transform::{DataLogger, Location, MeasuringPoint, Sensor};

pub use memory::{MemoryStore, MemoryTables};
pub use postgres::{PgStore, PgWriteTransaction};
pub use rows::{
    yes_no, AttachmentRow, DataLoggerRow, LocationRow, LocationTree, MeasuringPointRow, SensorRow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetTable {
    Location,
    DataLogger,
    Sensor,
    MeasuringPoint,
    LocationAttachment,
    MeasuringPointAttachment,
}

impl TargetTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            TargetTable::Location => "location",
            TargetTable::DataLogger => "data_logger",
            TargetTable::Sensor => "sensor",
            TargetTable::MeasuringPoint => "measuring_point",
            TargetTable::LocationAttachment => "location_attachment",
            TargetTable::MeasuringPointAttachment => "measuring_point_attachment",
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Entity a photo can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentTarget {
    Location,
    MeasuringPoint,
}

impl AttachmentTarget {
    pub fn keywords(&self) -> &'static str {
        match self {
            AttachmentTarget::Location => "Location_image",
            AttachmentTarget::MeasuringPoint => "MeasuringPoint_image",
        }
    }

    pub fn parent_table(&self) -> TargetTable {
        match self {
            AttachmentTarget::Location => TargetTable::Location,
            AttachmentTarget::MeasuringPoint => TargetTable::MeasuringPoint,
        }
    }

    pub fn attachment_table(&self) -> TargetTable {
        match self {
            AttachmentTarget::Location => TargetTable::LocationAttachment,
            AttachmentTarget::MeasuringPoint => TargetTable::MeasuringPointAttachment,
        }
    }

    pub fn tally(&self) -> Tally {
        match self {
            AttachmentTarget::Location => Tally::LocationPhoto,
            AttachmentTarget::MeasuringPoint => Tally::MeasuringPointPhoto,
        }
    }
}

impl fmt::Display for AttachmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentTarget::Location => f.write_str("Location"),
            AttachmentTarget::MeasuringPoint => f.write_str("Measuring Point"),
        }
    }
}

/// Parent selector for an attachment, rendered SQL-style in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetFilter {
    LocationId(String),
    MeasuringPointExternalId(Uuid),
}

impl TargetFilter {
    pub fn target(&self) -> AttachmentTarget {
        match self {
            TargetFilter::LocationId(_) => AttachmentTarget::Location,
            TargetFilter::MeasuringPointExternalId(_) => AttachmentTarget::MeasuringPoint,
        }
    }
}

impl fmt::Display for TargetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFilter::LocationId(id) => write!(f, "location_id = '{id}'"),
            TargetFilter::MeasuringPointExternalId(id) => write!(
                f,
                "external_id = '{}'",
                id.hyphenated().to_string().to_uppercase()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub target: AttachmentTarget,
    pub parent_id: Uuid,
    pub att_name: String,
    pub content_type: String,
    pub keywords: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn WriteTransaction + '_>, StoreError>;

    async fn find_parent_ids(&self, filter: &TargetFilter) -> Result<Vec<Uuid>, StoreError>;

    async fn attachment_exists(
        &self,
        target: AttachmentTarget,
        parent_id: Uuid,
        att_name: &str,
    ) -> Result<bool, StoreError>;

    async fn insert_attachment(&self, attachment: &NewAttachment) -> Result<Uuid, StoreError>;

    async fn fetch_location(&self, location_id: &str) -> Result<Option<LocationTree>, StoreError>;
}

/// One location's worth of writes. Nothing is visible to readers until
/// `commit`; `rollback` discards everything written through it.
#[async_trait]
pub trait WriteTransaction: Send {
    async fn insert_location(&mut self, location: &Location) -> Result<Uuid, StoreError>;

    async fn insert_data_logger(
        &mut self,
        location_global_id: Uuid,
        logger: &DataLogger,
    ) -> Result<Uuid, StoreError>;

    async fn insert_sensor(
        &mut self,
        data_logger_global_id: Uuid,
        sensor: &Sensor,
    ) -> Result<Uuid, StoreError>;

    async fn insert_measuring_point(
        &mut self,
        location_global_id: Uuid,
        point: &MeasuringPoint,
    ) -> Result<Uuid, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
