//! Data load driver: one store transaction per station row.

use hydromon_parser::formats::schema::LOCATION_IDENTIFIER;
use hydromon_parser::{
    location_key, MeasuringPointIndex, MonitoringCache, MonitoringLookup, SourceRecord,
};
use tracing::{debug, info, trace, warn};

use crate::error::{EntityKind, LoadError, StoreError, ValidationError};
use crate::metrics::{Metrics, Tally};
use crate::store::{TargetStore, WriteTransaction};
use crate::transform::{Location, LocationSources, TransformRules};
use crate::DATA_TARGET;

/// The feeds a data load reads from.
#[derive(Debug, Clone, Default)]
pub struct LoadSources {
    pub stations: Vec<SourceRecord>,
    pub monitoring: MonitoringCache,
    pub measuring_points: MeasuringPointIndex,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Log running metrics every `feedback` rows; zero disables.
    pub feedback: u32,
    /// Validate only; no transaction is opened.
    pub dry_run: bool,
    pub rules: TransformRules,
}

/// Write step that failed inside a row's transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Location,
    DataLogger,
    Sensor,
    MeasuringPoint,
    Commit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub locations: u64,
    pub data_loggers: u64,
    pub sensors: u64,
    pub measuring_points: u64,
}

impl WriteCounts {
    /// Everything one location's transaction writes.
    pub fn planned(location: &Location) -> Self {
        Self {
            locations: 1,
            data_loggers: u64::from(location.data_logger.is_some()),
            sensors: location.sensors.len() as u64,
            measuring_points: location.measuring_points.len() as u64,
        }
    }

    fn add_succeeded(&self, metrics: &mut Metrics) {
        metrics.add_succeeded(Tally::Location, self.locations);
        metrics.add_succeeded(Tally::DataLogger, self.data_loggers);
        metrics.add_succeeded(Tally::Sensor, self.sensors);
        metrics.add_succeeded(Tally::MeasuringPoint, self.measuring_points);
    }

    fn add_failed(&self, metrics: &mut Metrics) {
        metrics.add_failed(Tally::Location, self.locations);
        metrics.add_failed(Tally::DataLogger, self.data_loggers);
        metrics.add_failed(Tally::Sensor, self.sensors);
        metrics.add_failed(Tally::MeasuringPoint, self.measuring_points);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Rejected { error: ValidationError },
    Validated,
    Committed { written: WriteCounts },
    RolledBack { stage: WriteStage, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub row_index: usize,
    pub location_id: Option<String>,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub input: Metrics,
    pub output: Metrics,
    pub rows: Vec<RowReport>,
}

impl LoadReport {
    pub fn committed(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row.outcome, RowOutcome::Committed { .. }))
            .count()
    }
}

/// Loads every station row. Row-level failures are counted and logged;
/// only a store that can no longer open or roll back a transaction ends
/// the run early.
pub async fn load_data<S>(
    store: &S,
    sources: &LoadSources,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError>
where
    S: TargetStore + ?Sized,
{
    let mut input = Metrics::data_input();
    let mut output = Metrics::data_output(options.dry_run);
    let mut rows = Vec::with_capacity(sources.stations.len());

    info!(
        stations = sources.stations.len(),
        dry_run = options.dry_run,
        "Starting Location processing"
    );

    for (row_index, station) in sources.stations.iter().enumerate() {
        if options.feedback > 0 && row_index > 0 && row_index % options.feedback as usize == 0 {
            info!("Processed {row_index} rows\n{input}\n{output}");
        }

        let location_id = station.get(LOCATION_IDENTIFIER).and_then(location_key);
        trace!(target: DATA_TARGET, row_index, "Station record:\n{}", station.to_json());

        let location = match build_location(station, sources, &options.rules) {
            Ok(location) => location,
            Err(error) => {
                warn!(row_index, "{error}");
                input.add_failed(Tally::Location, 1);
                rows.push(RowReport {
                    row_index,
                    location_id,
                    outcome: RowOutcome::Rejected { error },
                });
                continue;
            }
        };

        count_input(&mut input, &location);
        debug!(target: DATA_TARGET, "Location:\n{}", location.to_json());

        let outcome = if options.dry_run {
            RowOutcome::Validated
        } else {
            write_location(store, &location, &mut output).await?
        };

        rows.push(RowReport {
            row_index,
            location_id: Some(location.location_id.clone()),
            outcome,
        });
    }

    let report = LoadReport {
        input,
        output,
        rows,
    };
    info!(committed = report.committed(), "Finished Location processing");
    Ok(report)
}

fn build_location(
    station: &SourceRecord,
    sources: &LoadSources,
    rules: &TransformRules,
) -> Result<Location, ValidationError> {
    let raw_id = station.get(LOCATION_IDENTIFIER).unwrap_or("<absent>");
    let key = location_key(raw_id).ok_or_else(|| ValidationError::Invalid {
        entity: EntityKind::Location,
        key: raw_id.to_string(),
        field: LOCATION_IDENTIFIER,
        value: raw_id.to_string(),
        reason: "not a location number".to_string(),
    })?;

    let monitoring = match sources.monitoring.lookup(&key) {
        MonitoringLookup::Found(record) => record,
        MonitoringLookup::Missing => {
            return Err(ValidationError::Source {
                entity: EntityKind::Location,
                key,
                message: "no monitoring record found".to_string(),
            })
        }
        MonitoringLookup::Ambiguous(count) => {
            return Err(ValidationError::Source {
                entity: EntityKind::Location,
                key,
                message: format!("{count} monitoring records found"),
            })
        }
    };

    Location::transform(
        LocationSources {
            station,
            monitoring,
            measuring_points: sources.measuring_points.for_location(&key),
        },
        rules,
    )
}

fn count_input(input: &mut Metrics, location: &Location) {
    let planned = WriteCounts::planned(location);
    planned.add_succeeded(input);
    input.add_failed(
        Tally::MeasuringPoint,
        location.rejected_measuring_points.len() as u64,
    );
    for rejected in &location.rejected_measuring_points {
        debug!(
            location_id = %location.location_id,
            name = rejected.name.as_deref().unwrap_or("<absent>"),
            "Measuring point rejected: {}",
            rejected.reason
        );
    }
}

async fn write_location<S>(
    store: &S,
    location: &Location,
    output: &mut Metrics,
) -> Result<RowOutcome, LoadError>
where
    S: TargetStore + ?Sized,
{
    let planned = WriteCounts::planned(location);
    let mut tx = store.begin().await.map_err(|source| LoadError::Begin {
        location_id: location.location_id.clone(),
        source,
    })?;

    match write_entities(tx.as_mut(), location).await {
        Ok(()) => match tx.commit().await {
            Ok(()) => {
                planned.add_succeeded(output);
                info!(location_id = %location.location_id, "Location loaded");
                Ok(RowOutcome::Committed { written: planned })
            }
            Err(err) => {
                warn!(location_id = %location.location_id, "Commit failed: {err}");
                planned.add_failed(output);
                Ok(RowOutcome::RolledBack {
                    stage: WriteStage::Commit,
                    message: err.to_string(),
                })
            }
        },
        Err((stage, err)) => {
            warn!(
                location_id = %location.location_id,
                ?stage,
                "Write failed, rolling back: {err}"
            );
            tx.rollback().await.map_err(|source| LoadError::Rollback {
                location_id: location.location_id.clone(),
                source,
            })?;
            planned.add_failed(output);
            Ok(RowOutcome::RolledBack {
                stage,
                message: err.to_string(),
            })
        }
    }
}

async fn write_entities(
    tx: &mut (dyn WriteTransaction + '_),
    location: &Location,
) -> Result<(), (WriteStage, StoreError)> {
    let location_gid = tx
        .insert_location(location)
        .await
        .map_err(|err| (WriteStage::Location, err))?;

    if let Some(logger) = &location.data_logger {
        let logger_gid = tx
            .insert_data_logger(location_gid, logger)
            .await
            .map_err(|err| (WriteStage::DataLogger, err))?;
        for sensor in &location.sensors {
            tx.insert_sensor(logger_gid, sensor)
                .await
                .map_err(|err| (WriteStage::Sensor, err))?;
        }
    }

    for point in &location.measuring_points {
        tx.insert_measuring_point(location_gid, point)
            .await
            .map_err(|err| (WriteStage::MeasuringPoint, err))?;
    }
    Ok(())
}
