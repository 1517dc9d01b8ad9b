use async_trait::async_trait;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use super::{
    yes_no, AttachmentTarget, DataLoggerRow, LocationRow, LocationTree, MeasuringPointRow,
    NewAttachment, SensorRow, TargetFilter, TargetStore, TargetTable, WriteTransaction,
};
use crate::db::DbPool;
use crate::error::StoreError;
use crate::transform::{DataLogger, Location, MeasuringPoint, Sensor, SensorRole};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

pub struct PgWriteTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TargetStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn WriteTransaction + '_>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgWriteTransaction { tx }))
    }

    async fn find_parent_ids(&self, filter: &TargetFilter) -> Result<Vec<Uuid>, StoreError> {
        let rows = match filter {
            TargetFilter::LocationId(location_id) => {
                sqlx::query(r#"SELECT global_id FROM location WHERE location_id = $1"#)
                    .bind(location_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            TargetFilter::MeasuringPointExternalId(external_id) => {
                sqlx::query(r#"SELECT global_id FROM measuring_point WHERE external_id = $1"#)
                    .bind(external_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("global_id")?);
        }
        Ok(ids)
    }

    async fn attachment_exists(
        &self,
        target: AttachmentTarget,
        parent_id: Uuid,
        att_name: &str,
    ) -> Result<bool, StoreError> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE rel_global_id = $1 AND att_name = $2) AS present",
            target.attachment_table().table_name()
        );
        let row = sqlx::query(&query)
            .bind(parent_id)
            .bind(att_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("present")?)
    }

    async fn insert_attachment(&self, attachment: &NewAttachment) -> Result<Uuid, StoreError> {
        let table = attachment.target.attachment_table();
        let data_size = i32::try_from(attachment.data.len()).map_err(|_| StoreError::Rejected {
            table,
            message: format!("attachment of {} bytes is too large", attachment.data.len()),
        })?;
        let attachment_id = Uuid::new_v4();
        let query = format!(
            r#"
                INSERT INTO {} (attachment_id, rel_global_id, content_type, att_name, data_size, data, keywords)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            table.table_name()
        );
        sqlx::query(&query)
            .bind(attachment_id)
            .bind(attachment.parent_id)
            .bind(&attachment.content_type)
            .bind(&attachment.att_name)
            .bind(data_size)
            .bind(&attachment.data)
            .bind(&attachment.keywords)
            .execute(&self.pool)
            .await?;
        Ok(attachment_id)
    }

    async fn fetch_location(&self, location_id: &str) -> Result<Option<LocationTree>, StoreError> {
        let location = sqlx::query_as::<_, LocationRow>(
            r#"
                SELECT global_id, location_id, name, project, shape_geojson, srid,
                       has_rainfall = 'Yes' AS has_rainfall,
                       has_stage = 'Yes' AS has_stage,
                       has_groundwater = 'Yes' AS has_groundwater,
                       has_conductivity = 'Yes' AS has_conductivity,
                       has_velocity_sensor = 'Yes' AS has_velocity_sensor,
                       has_discharge = 'Yes' AS has_discharge,
                       has_temperature = 'Yes' AS has_temperature,
                       has_water_quality = 'Yes' AS has_water_quality,
                       has_data_logger = 'Yes' AS has_data_logger,
                       has_generic_sensor = 'Yes' AS has_generic_sensor,
                       has_measuring_point = 'Yes' AS has_measuring_point,
                       is_active = 'Yes' AS is_active,
                       comments
                FROM location
                WHERE location_id = $1
            "#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(location) = location else {
            return Ok(None);
        };

        let data_loggers = sqlx::query_as::<_, DataLoggerRow>(
            r#"
                SELECT global_id, location_global_id, data_logger_type, serial_number,
                       low_battery_threshold, low_battery_units,
                       is_active = 'Yes' AS is_active
                FROM data_logger
                WHERE location_global_id = $1
            "#,
        )
        .bind(location.global_id)
        .fetch_all(&self.pool)
        .await?;

        let sensors = sqlx::query_as::<_, SensorRow>(
            r#"
                SELECT s.global_id, s.data_logger_global_id, s.sensor_type, s.serial_number,
                       s.is_tipping_bucket = 'Yes' AS is_tipping_bucket,
                       s.is_active = 'Yes' AS is_active
                FROM sensor s
                JOIN data_logger d ON d.global_id = s.data_logger_global_id
                WHERE d.location_global_id = $1
                ORDER BY s.created_at, s.global_id
            "#,
        )
        .bind(location.global_id)
        .fetch_all(&self.pool)
        .await?;

        let measuring_points = sqlx::query_as::<_, MeasuringPointRow>(
            r#"
                SELECT global_id, location_global_id, name, external_id, description,
                       elevation, display_order,
                       is_active = 'Yes' AS is_active
                FROM measuring_point
                WHERE location_global_id = $1
                ORDER BY display_order
            "#,
        )
        .bind(location.global_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(LocationTree {
            location,
            data_loggers,
            sensors,
            measuring_points,
        }))
    }
}

#[async_trait]
impl WriteTransaction for PgWriteTransaction {
    async fn insert_location(&mut self, location: &Location) -> Result<Uuid, StoreError> {
        let global_id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO location (
                    global_id, location_id, name, project, shape_geojson, srid,
                    has_rainfall, has_stage, has_groundwater, has_conductivity,
                    has_velocity_sensor, has_discharge, has_temperature, has_water_quality,
                    has_data_logger, has_generic_sensor, has_measuring_point,
                    is_active, comments
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(global_id)
        .bind(&location.location_id)
        .bind(&location.name)
        .bind(location.project)
        .bind(location.shape.to_geojson())
        .bind(location.shape.srid)
        .bind(yes_no(location.has_rainfall))
        .bind(yes_no(location.has_stage))
        .bind(yes_no(location.has_groundwater))
        .bind(yes_no(location.has_conductivity))
        .bind(yes_no(location.has_velocity_sensor))
        .bind(yes_no(location.has_discharge))
        .bind(yes_no(location.has_temperature))
        .bind(yes_no(location.has_water_quality))
        .bind(yes_no(location.has_data_logger))
        .bind(yes_no(location.has_generic_sensor))
        .bind(yes_no(location.has_measuring_point))
        .bind(yes_no(location.is_active))
        .bind(&location.comments)
        .execute(&mut *self.tx)
        .await?;
        Ok(global_id)
    }

    async fn insert_data_logger(
        &mut self,
        location_global_id: Uuid,
        logger: &DataLogger,
    ) -> Result<Uuid, StoreError> {
        let global_id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO data_logger (
                    global_id, location_global_id, data_logger_type, serial_number,
                    low_battery_threshold, low_battery_units, is_active
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(global_id)
        .bind(location_global_id)
        .bind(&logger.logger_type)
        .bind(&logger.serial_number)
        .bind(logger.low_battery_threshold)
        .bind(&logger.low_battery_units)
        .bind(yes_no(logger.is_active))
        .execute(&mut *self.tx)
        .await?;
        Ok(global_id)
    }

    async fn insert_sensor(
        &mut self,
        data_logger_global_id: Uuid,
        sensor: &Sensor,
    ) -> Result<Uuid, StoreError> {
        let global_id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO sensor (
                    global_id, data_logger_global_id, sensor_type, serial_number,
                    is_tipping_bucket, is_active
                )
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(global_id)
        .bind(data_logger_global_id)
        .bind(&sensor.sensor_type)
        .bind(&sensor.serial_number)
        .bind(yes_no(sensor.role == SensorRole::TippingBucket))
        .bind(yes_no(sensor.is_active))
        .execute(&mut *self.tx)
        .await?;
        Ok(global_id)
    }

    async fn insert_measuring_point(
        &mut self,
        location_global_id: Uuid,
        point: &MeasuringPoint,
    ) -> Result<Uuid, StoreError> {
        let global_id = Uuid::new_v4();
        let display_order =
            i32::try_from(point.display_order).map_err(|_| StoreError::Rejected {
                table: TargetTable::MeasuringPoint,
                message: format!("display order {} out of range", point.display_order),
            })?;
        sqlx::query(
            r#"
                INSERT INTO measuring_point (
                    global_id, location_global_id, name, external_id, description,
                    elevation, display_order, is_active
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(global_id)
        .bind(location_global_id)
        .bind(&point.name)
        .bind(point.external_id)
        .bind(&point.description)
        .bind(point.elevation)
        .bind(display_order)
        .bind(yes_no(point.is_active))
        .execute(&mut *self.tx)
        .await?;
        Ok(global_id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
