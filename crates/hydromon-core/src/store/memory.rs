use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    AttachmentRow, AttachmentTarget, DataLoggerRow, LocationRow, LocationTree, MeasuringPointRow,
    NewAttachment, SensorRow, TargetFilter, TargetStore, TargetTable, WriteTransaction,
};
use crate::error::StoreError;
use crate::transform::{DataLogger, Location, MeasuringPoint, Sensor};

/// Committed contents of a `MemoryStore`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTables {
    pub locations: Vec<LocationRow>,
    pub data_loggers: Vec<DataLoggerRow>,
    pub sensors: Vec<SensorRow>,
    pub measuring_points: Vec<MeasuringPointRow>,
    pub attachments: Vec<AttachmentRow>,
}

impl MemoryTables {
    fn append(&mut self, staged: MemoryTables) {
        self.locations.extend(staged.locations);
        self.data_loggers.extend(staged.data_loggers);
        self.sensors.extend(staged.sensors);
        self.measuring_points.extend(staged.measuring_points);
        self.attachments.extend(staged.attachments);
    }

    fn has_location_id(&self, location_id: &str) -> bool {
        self.locations
            .iter()
            .any(|row| row.location_id == location_id)
    }
}

#[derive(Debug, Default)]
struct Faults {
    tables: HashSet<TargetTable>,
    begin: bool,
    commit: bool,
    rollback: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: MemoryTables,
    faults: Faults,
}

/// In-process store used for dry runs and tests. Writes are staged per
/// transaction and applied on commit. Faults can be injected per table or
/// per transaction step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MemoryTables {
        self.lock().tables.clone()
    }

    pub fn fail_writes_to(&self, table: TargetTable) {
        self.lock().faults.tables.insert(table);
    }

    pub fn fail_begins(&self, fail: bool) {
        self.lock().faults.begin = fail;
    }

    pub fn fail_commits(&self, fail: bool) {
        self.lock().faults.commit = fail;
    }

    pub fn fail_rollbacks(&self, fail: bool) {
        self.lock().faults.rollback = fail;
    }

    pub fn clear_faults(&self) {
        self.lock().faults = Faults::default();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_table(&self, table: TargetTable) -> Result<(), StoreError> {
        if self.lock().faults.tables.contains(&table) {
            return Err(StoreError::Rejected {
                table,
                message: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TargetStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn WriteTransaction + '_>, StoreError> {
        if self.lock().faults.begin {
            return Err(StoreError::Rejected {
                table: TargetTable::Location,
                message: "injected begin failure".to_string(),
            });
        }
        Ok(Box::new(MemoryTransaction {
            store: self,
            staged: MemoryTables::default(),
        }))
    }

    async fn find_parent_ids(&self, filter: &TargetFilter) -> Result<Vec<Uuid>, StoreError> {
        let state = self.lock();
        let ids = match filter {
            TargetFilter::LocationId(location_id) => state
                .tables
                .locations
                .iter()
                .filter(|row| &row.location_id == location_id)
                .map(|row| row.global_id)
                .collect(),
            TargetFilter::MeasuringPointExternalId(external_id) => state
                .tables
                .measuring_points
                .iter()
                .filter(|row| &row.external_id == external_id)
                .map(|row| row.global_id)
                .collect(),
        };
        Ok(ids)
    }

    async fn attachment_exists(
        &self,
        target: AttachmentTarget,
        parent_id: Uuid,
        att_name: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.lock().tables.attachments.iter().any(|row| {
            row.target == target && row.rel_global_id == parent_id && row.att_name == att_name
        }))
    }

    async fn insert_attachment(&self, attachment: &NewAttachment) -> Result<Uuid, StoreError> {
        let table = attachment.target.attachment_table();
        self.check_table(table)?;
        let data_size = i32::try_from(attachment.data.len()).map_err(|_| StoreError::Rejected {
            table,
            message: format!("attachment of {} bytes is too large", attachment.data.len()),
        })?;
        let attachment_id = Uuid::new_v4();
        self.lock().tables.attachments.push(AttachmentRow {
            attachment_id,
            target: attachment.target,
            rel_global_id: attachment.parent_id,
            content_type: attachment.content_type.clone(),
            att_name: attachment.att_name.clone(),
            data_size,
            keywords: Some(attachment.keywords.clone()),
        });
        Ok(attachment_id)
    }

    async fn fetch_location(&self, location_id: &str) -> Result<Option<LocationTree>, StoreError> {
        let state = self.lock();
        let tables = &state.tables;
        let Some(location) = tables
            .locations
            .iter()
            .find(|row| row.location_id == location_id)
        else {
            return Ok(None);
        };

        let data_loggers: Vec<DataLoggerRow> = tables
            .data_loggers
            .iter()
            .filter(|row| row.location_global_id == location.global_id)
            .cloned()
            .collect();
        let sensors = tables
            .sensors
            .iter()
            .filter(|row| {
                data_loggers
                    .iter()
                    .any(|logger| logger.global_id == row.data_logger_global_id)
            })
            .cloned()
            .collect();
        let measuring_points = tables
            .measuring_points
            .iter()
            .filter(|row| row.location_global_id == location.global_id)
            .cloned()
            .collect();

        Ok(Some(LocationTree {
            location: location.clone(),
            data_loggers,
            sensors,
            measuring_points,
        }))
    }
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    staged: MemoryTables,
}

#[async_trait]
impl WriteTransaction for MemoryTransaction<'_> {
    async fn insert_location(&mut self, location: &Location) -> Result<Uuid, StoreError> {
        self.store.check_table(TargetTable::Location)?;
        if self.staged.has_location_id(&location.location_id)
            || self.store.lock().tables.has_location_id(&location.location_id)
        {
            return Err(StoreError::Rejected {
                table: TargetTable::Location,
                message: format!("location_id '{}' already exists", location.location_id),
            });
        }
        let global_id = Uuid::new_v4();
        self.staged
            .locations
            .push(LocationRow::from_entity(global_id, location));
        Ok(global_id)
    }

    async fn insert_data_logger(
        &mut self,
        location_global_id: Uuid,
        logger: &DataLogger,
    ) -> Result<Uuid, StoreError> {
        self.store.check_table(TargetTable::DataLogger)?;
        let global_id = Uuid::new_v4();
        self.staged.data_loggers.push(DataLoggerRow::from_entity(
            global_id,
            location_global_id,
            logger,
        ));
        Ok(global_id)
    }

    async fn insert_sensor(
        &mut self,
        data_logger_global_id: Uuid,
        sensor: &Sensor,
    ) -> Result<Uuid, StoreError> {
        self.store.check_table(TargetTable::Sensor)?;
        let global_id = Uuid::new_v4();
        self.staged.sensors.push(SensorRow::from_entity(
            global_id,
            data_logger_global_id,
            sensor,
        ));
        Ok(global_id)
    }

    async fn insert_measuring_point(
        &mut self,
        location_global_id: Uuid,
        point: &MeasuringPoint,
    ) -> Result<Uuid, StoreError> {
        self.store.check_table(TargetTable::MeasuringPoint)?;
        let global_id = Uuid::new_v4();
        self.staged
            .measuring_points
            .push(MeasuringPointRow::from_entity(
                global_id,
                location_global_id,
                point,
            ));
        Ok(global_id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { store, staged } = *self;
        let mut state = store.lock();
        if state.faults.commit {
            return Err(StoreError::Rejected {
                table: TargetTable::Location,
                message: "injected commit failure".to_string(),
            });
        }
        state.tables.append(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        if self.store.lock().faults.rollback {
            return Err(StoreError::Rejected {
                table: TargetTable::Location,
                message: "injected rollback failure".to_string(),
            });
        }
        Ok(())
    }
}
