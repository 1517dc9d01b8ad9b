use std::fmt;

use comfy_table::{presets, Cell, CellAlignment, Table};

use crate::error::MetricsError;

/// Kinds of things a run counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tally {
    Location,
    DataLogger,
    Sensor,
    MeasuringPoint,
    PhotoIndexRecord,
    PhotoMetadata,
    PhotoFile,
    LocationPhoto,
    MeasuringPointPhoto,
}

impl Tally {
    pub fn label(&self) -> &'static str {
        match self {
            Tally::Location => "Location",
            Tally::DataLogger => "Data Logger",
            Tally::Sensor => "Sensor",
            Tally::MeasuringPoint => "Measuring Point",
            Tally::PhotoIndexRecord => "Photo Index Record",
            Tally::PhotoMetadata => "Photo Metadata",
            Tally::PhotoFile => "Photo File",
            Tally::LocationPhoto => "Location Photo",
            Tally::MeasuringPointPhoto => "Measuring Point Photo",
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `None` marks a counter that does not apply to this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub succeeded: Option<u64>,
    pub failed: Option<u64>,
}

impl Counts {
    const ZERO: Counts = Counts {
        succeeded: Some(0),
        failed: Some(0),
    };

    pub fn total(&self) -> Option<u64> {
        match (self.succeeded, self.failed) {
            (None, None) => None,
            (succeeded, failed) => Some(succeeded.unwrap_or(0) + failed.unwrap_or(0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    header: String,
    rows: Vec<(Tally, Counts)>,
}

impl Metrics {
    pub fn new(header: impl Into<String>, kinds: &[Tally]) -> Self {
        Self {
            header: header.into(),
            rows: kinds.iter().map(|kind| (*kind, Counts::ZERO)).collect(),
        }
    }

    /// Entities built from the source feeds. Data loggers and sensors only
    /// fail as part of their location, and a failed measuring point is one
    /// that screening rejected.
    pub fn data_input() -> Self {
        let mut metrics = Self::new(
            "Input Metrics",
            &[
                Tally::Location,
                Tally::DataLogger,
                Tally::Sensor,
                Tally::MeasuringPoint,
            ],
        );
        metrics.disable_failed(Tally::DataLogger);
        metrics.disable_failed(Tally::Sensor);
        metrics
    }

    /// Entities written to the target store. Disabled entirely on dry runs.
    pub fn data_output(dry_run: bool) -> Self {
        let kinds = [
            Tally::Location,
            Tally::DataLogger,
            Tally::Sensor,
            Tally::MeasuringPoint,
        ];
        let mut metrics = Self::new("Output Metrics", &kinds);
        if dry_run {
            for kind in kinds {
                metrics.disable_succeeded(kind);
                metrics.disable_failed(kind);
            }
        }
        metrics
    }

    pub fn photo_input() -> Self {
        let mut metrics = Self::new(
            "Input Metrics",
            &[
                Tally::PhotoIndexRecord,
                Tally::PhotoMetadata,
                Tally::PhotoFile,
            ],
        );
        metrics.disable_failed(Tally::PhotoIndexRecord);
        metrics
    }

    pub fn photo_output() -> Self {
        Self::new(
            "Output Metrics",
            &[Tally::LocationPhoto, Tally::MeasuringPointPhoto],
        )
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn kinds(&self) -> impl Iterator<Item = Tally> + '_ {
        self.rows.iter().map(|(kind, _)| *kind)
    }

    pub fn counts(&self, kind: Tally) -> Option<Counts> {
        self.rows
            .iter()
            .find(|(tracked, _)| *tracked == kind)
            .map(|(_, counts)| *counts)
    }

    pub fn succeeded(&self, kind: Tally) -> Option<u64> {
        self.counts(kind).and_then(|counts| counts.succeeded)
    }

    pub fn failed(&self, kind: Tally) -> Option<u64> {
        self.counts(kind).and_then(|counts| counts.failed)
    }

    pub fn total(&self, kind: Tally) -> Option<u64> {
        self.counts(kind).and_then(|counts| counts.total())
    }

    pub fn set_succeeded(&mut self, kind: Tally, value: Option<i64>) -> Result<(), MetricsError> {
        let checked = self.check(kind, "succeeded", value)?;
        if let Some(counts) = self.counts_mut(kind) {
            counts.succeeded = checked;
        }
        Ok(())
    }

    pub fn set_failed(&mut self, kind: Tally, value: Option<i64>) -> Result<(), MetricsError> {
        let checked = self.check(kind, "failed", value)?;
        if let Some(counts) = self.counts_mut(kind) {
            counts.failed = checked;
        }
        Ok(())
    }

    /// Adding to a disabled or untracked counter is a no-op.
    pub fn add_succeeded(&mut self, kind: Tally, amount: u64) {
        if let Some(value) = self
            .counts_mut(kind)
            .and_then(|counts| counts.succeeded.as_mut())
        {
            *value += amount;
        }
    }

    pub fn add_failed(&mut self, kind: Tally, amount: u64) {
        if let Some(value) = self
            .counts_mut(kind)
            .and_then(|counts| counts.failed.as_mut())
        {
            *value += amount;
        }
    }

    fn disable_succeeded(&mut self, kind: Tally) {
        if let Some(counts) = self.counts_mut(kind) {
            counts.succeeded = None;
        }
    }

    fn disable_failed(&mut self, kind: Tally) {
        if let Some(counts) = self.counts_mut(kind) {
            counts.failed = None;
        }
    }

    fn counts_mut(&mut self, kind: Tally) -> Option<&mut Counts> {
        self.rows
            .iter_mut()
            .find(|(tracked, _)| *tracked == kind)
            .map(|(_, counts)| counts)
    }

    fn check(
        &self,
        kind: Tally,
        counter: &'static str,
        value: Option<i64>,
    ) -> Result<Option<u64>, MetricsError> {
        if self.counts(kind).is_none() {
            return Err(MetricsError::UntrackedKind {
                metrics: self.header.clone(),
                kind,
            });
        }
        match value {
            None => Ok(None),
            Some(value) => u64::try_from(value)
                .map(Some)
                .map_err(|_| MetricsError::NegativeCount {
                    metrics: self.header.clone(),
                    kind,
                    counter,
                    value,
                }),
        }
    }
}

fn count_cell(value: Option<u64>) -> Cell {
    let text = value.map_or_else(|| "n/a".to_string(), |value| value.to_string());
    Cell::new(text).set_alignment(CellAlignment::Right)
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_header(vec!["", "Total", "Succeeded", "Failed"]);
        for (kind, counts) in &self.rows {
            table.add_row(vec![
                Cell::new(kind.label()),
                count_cell(counts.total()),
                count_cell(counts.succeeded),
                count_cell(counts.failed),
            ]);
        }
        writeln!(f, "{}", self.header)?;
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_and_disabled_counts_as_zero() {
        let mut metrics = Metrics::data_input();
        metrics.add_succeeded(Tally::Location, 3);
        metrics.add_failed(Tally::Location, 2);
        assert_eq!(metrics.total(Tally::Location), Some(5));

        metrics.add_succeeded(Tally::DataLogger, 4);
        metrics.add_failed(Tally::DataLogger, 7);
        assert_eq!(metrics.failed(Tally::DataLogger), None);
        assert_eq!(metrics.total(Tally::DataLogger), Some(4));
    }

    #[test]
    fn total_is_none_only_when_both_disabled() {
        let mut metrics = Metrics::new("Test", &[Tally::Sensor]);
        metrics.set_succeeded(Tally::Sensor, None).unwrap();
        assert_eq!(metrics.total(Tally::Sensor), Some(0));
        metrics.set_failed(Tally::Sensor, None).unwrap();
        assert_eq!(metrics.total(Tally::Sensor), None);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut metrics = Metrics::photo_output();
        let err = metrics
            .set_failed(Tally::LocationPhoto, Some(-1))
            .unwrap_err();
        assert!(matches!(err, MetricsError::NegativeCount { value: -1, .. }));
        assert_eq!(metrics.failed(Tally::LocationPhoto), Some(0));

        metrics.set_succeeded(Tally::LocationPhoto, Some(9)).unwrap();
        assert_eq!(metrics.succeeded(Tally::LocationPhoto), Some(9));
    }

    #[test]
    fn untracked_kinds_are_rejected() {
        let mut metrics = Metrics::photo_output();
        assert!(matches!(
            metrics.set_succeeded(Tally::Location, Some(1)),
            Err(MetricsError::UntrackedKind { .. })
        ));
        metrics.add_succeeded(Tally::Location, 1);
        assert_eq!(metrics.counts(Tally::Location), None);
    }

    #[test]
    fn dry_run_output_is_disabled() {
        let mut metrics = Metrics::data_output(true);
        metrics.add_succeeded(Tally::Location, 1);
        assert_eq!(metrics.total(Tally::Location), None);
    }

    #[test]
    fn display_renders_disabled_as_na() {
        let mut metrics = Metrics::data_input();
        metrics.add_succeeded(Tally::Sensor, 12);
        let text = metrics.to_string();
        assert!(text.starts_with("Input Metrics\n"));
        let sensor_line = text
            .lines()
            .find(|line| line.trim_start().starts_with("Sensor"))
            .unwrap();
        assert!(sensor_line.contains("12"));
        assert!(sensor_line.contains("n/a"));
    }
}
