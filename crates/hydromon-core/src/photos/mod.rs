//! Photo index to attachment workflow.

mod attachment;
mod photo;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hydromon_parser::formats::schema::FILE_NAME;
use hydromon_parser::SourceRecord;
use tracing::{debug, info, warn};

pub use attachment::{content_type_for, filters_for, Attachment};
pub use photo::{parse_mp_ids, upper_hyphenated, Photo};

use crate::config::PhotoConfig;
use crate::error::{AttachmentError, LoadError};
use crate::metrics::{Metrics, Tally};
use crate::store::{AttachmentTarget, TargetStore};
use crate::DATA_TARGET;

#[derive(Debug, Clone, Default)]
pub struct PhotoOptions {
    pub feedback: u32,
    pub tags: PhotoConfig,
}

#[derive(Debug)]
pub struct PhotoReport {
    pub input: Metrics,
    pub output: Metrics,
    pub errors: Vec<AttachmentError>,
    /// Files in the photo directory that no index row refers to.
    pub unindexed_files: Vec<PathBuf>,
}

pub async fn load_photos<S>(
    store: &S,
    index: &[SourceRecord],
    photo_dir: &Path,
    options: &PhotoOptions,
) -> Result<PhotoReport, LoadError>
where
    S: TargetStore + ?Sized,
{
    let mut input = Metrics::photo_input();
    let mut output = Metrics::photo_output();
    let mut errors = Vec::new();

    info!(records = index.len(), photo_dir = %photo_dir.display(), "Starting photo processing");

    for (row_index, record) in index.iter().enumerate() {
        if options.feedback > 0 && row_index > 0 && row_index % options.feedback as usize == 0 {
            info!("Processed {row_index} index records\n{input}\n{output}");
        }
        input.add_succeeded(Tally::PhotoIndexRecord, 1);
        debug!(target: DATA_TARGET, "Photo index record:\n{}", record.to_json());

        let photo = match Photo::from_index_record(record, photo_dir, &options.tags) {
            Ok(photo) => photo,
            Err(err) => {
                warn!(row_index, "{err}");
                input.add_failed(Tally::PhotoMetadata, 1);
                continue;
            }
        };
        input.add_succeeded(Tally::PhotoMetadata, 1);
        debug!(target: DATA_TARGET, "Photo:\n{}", photo.to_json());

        let data = match photo.read_data() {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %photo.path.display(), "Failed to read photo file: {err}");
                input.add_failed(Tally::PhotoFile, 1);
                continue;
            }
        };
        input.add_succeeded(Tally::PhotoFile, 1);

        let mut targets = Vec::with_capacity(2);
        if photo.is_location {
            targets.push(AttachmentTarget::Location);
        }
        if photo.is_mp {
            targets.push(AttachmentTarget::MeasuringPoint);
        }

        for target in targets {
            let target_errors = match Attachment::prepare(store, &photo, target).await {
                Ok(attachment) => attachment.load(store, &data).await,
                Err(err) => vec![err],
            };
            if target_errors.is_empty() {
                output.add_succeeded(target.tally(), 1);
            } else {
                for err in &target_errors {
                    warn!(file_name = %photo.file_name, "{err}");
                }
                output.add_failed(target.tally(), target_errors.len() as u64);
                errors.extend(target_errors);
            }
        }
    }

    let unindexed_files = unindexed_files(index, photo_dir)?;
    for path in &unindexed_files {
        warn!(path = %path.display(), "Photo file is not in the index");
    }

    info!(errors = errors.len(), "Finished photo processing");
    Ok(PhotoReport {
        input,
        output,
        errors,
        unindexed_files,
    })
}

fn unindexed_files(index: &[SourceRecord], photo_dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let indexed: HashSet<&str> = index
        .iter()
        .filter_map(|record| record.get(FILE_NAME))
        .collect();

    let pattern = photo_dir.join("*").to_string_lossy().into_owned();
    let entries = glob::glob(&pattern).map_err(|err| LoadError::PhotoDirectory {
        pattern: pattern.clone(),
        message: err.to_string(),
    })?;

    let mut unindexed = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("Skipping unreadable directory entry: {err}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let indexed_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| indexed.contains(name));
        if !indexed_name {
            unindexed.push(path);
        }
    }
    unindexed.sort();
    Ok(unindexed)
}
