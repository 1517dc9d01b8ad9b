use std::path::Path;

use tracing::{debug, info};
use uuid::Uuid;

use super::Photo;
use crate::error::AttachmentError;
use crate::store::{AttachmentTarget, NewAttachment, TargetFilter, TargetStore};

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
];

pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, content_type)| *content_type)
}

pub fn filters_for(photo: &Photo, target: AttachmentTarget) -> Vec<TargetFilter> {
    match target {
        AttachmentTarget::Location => vec![TargetFilter::LocationId(photo.location.clone())],
        AttachmentTarget::MeasuringPoint => photo
            .mp_ids
            .iter()
            .map(|id| TargetFilter::MeasuringPointExternalId(*id))
            .collect(),
    }
}

/// A photo bound for one target table, with its parents resolved.
#[derive(Debug)]
pub struct Attachment<'p> {
    pub photo: &'p Photo,
    pub target: AttachmentTarget,
    pub content_type: &'static str,
    pub parent_ids: Vec<Uuid>,
    /// Filters that did not resolve to exactly one parent. Any entry here
    /// keeps the photo off every parent of this target.
    pub errors: Vec<AttachmentError>,
}

impl<'p> Attachment<'p> {
    pub async fn prepare<S>(
        store: &S,
        photo: &'p Photo,
        target: AttachmentTarget,
    ) -> Result<Attachment<'p>, AttachmentError>
    where
        S: TargetStore + ?Sized,
    {
        let content_type = content_type_for(&photo.file_name).ok_or_else(|| {
            AttachmentError::UnknownContentType {
                target,
                file_name: photo.file_name.clone(),
            }
        })?;

        let mut parent_ids = Vec::new();
        let mut errors = Vec::new();
        for filter in filters_for(photo, target) {
            match store.find_parent_ids(&filter).await {
                Ok(ids) => match ids.as_slice() {
                    [id] => parent_ids.push(*id),
                    [] => errors.push(AttachmentError::NoMatch {
                        target,
                        filter: filter.to_string(),
                    }),
                    many => errors.push(AttachmentError::MultipleMatches {
                        target,
                        filter: filter.to_string(),
                        count: many.len(),
                    }),
                },
                Err(source) => errors.push(AttachmentError::Store { target, source }),
            }
        }

        Ok(Self {
            photo,
            target,
            content_type,
            parent_ids,
            errors,
        })
    }

    /// Inserts the photo under every resolved parent that does not already
    /// hold a file of the same name. Nothing is inserted when preparing left
    /// an unresolved filter. Returns all errors for this target.
    pub async fn load<S>(self, store: &S, data: &[u8]) -> Vec<AttachmentError>
    where
        S: TargetStore + ?Sized,
    {
        let Attachment {
            photo,
            target,
            content_type,
            parent_ids,
            mut errors,
        } = self;

        if !errors.is_empty() {
            debug!(
                %target,
                file_name = %photo.file_name,
                resolved = parent_ids.len(),
                "Unresolved parents, attachment skipped"
            );
            return errors;
        }

        for parent_id in parent_ids {
            match store
                .attachment_exists(target, parent_id, &photo.file_name)
                .await
            {
                Ok(true) => {
                    errors.push(AttachmentError::AlreadyExists {
                        target,
                        parent_id,
                        file_name: photo.file_name.clone(),
                    });
                    continue;
                }
                Ok(false) => {}
                Err(source) => {
                    errors.push(AttachmentError::Store { target, source });
                    continue;
                }
            }

            let attachment = NewAttachment {
                target,
                parent_id,
                att_name: photo.file_name.clone(),
                content_type: content_type.to_string(),
                keywords: target.keywords().to_string(),
                data: data.to_vec(),
            };
            match store.insert_attachment(&attachment).await {
                Ok(attachment_id) => {
                    info!(
                        %target,
                        %parent_id,
                        %attachment_id,
                        file_name = %photo.file_name,
                        "Attachment loaded"
                    );
                }
                Err(source) => errors.push(AttachmentError::Store { target, source }),
            }
        }

        debug!(%target, file_name = %photo.file_name, errors = errors.len(), "Attachment processed");
        errors
    }
}
