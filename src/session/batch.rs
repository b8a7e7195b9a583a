//! Bulk processing driver.
//!
//! Decodes many source files (the worker context cannot decode on its own),
//! submits them to the background worker, and collects responses by id.
//! Failures stay per-item: one bad file never aborts the batch, and a
//! batch-level error is raised only when literally every item failed.

use std::collections::HashMap;
use std::time::Duration;

use rayon::prelude::*;

use crate::config::FrameConfig;
use crate::export::naming::suggested_filename;
use crate::export::sink::ExportItem;
use crate::foundation::error::{FrameError, FrameResult};
use crate::session::worker::{FrameWorker, WorkResponse};
use crate::source::decode_raw_rgba8;

/// Poll interval while waiting for the pending set to drain.
const BATCH_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One selected input file: display name plus encoded bytes.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Original filename, used to derive the suggested output name.
    pub name: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

/// A per-item failure inside an otherwise successful batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchItemError {
    /// Name of the failing input file.
    pub filename: String,
    /// Failure description.
    pub message: String,
}

/// Completed batch: finished exports plus the per-item error list.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully rendered items in input order.
    pub items: Vec<ExportItem>,
    /// Per-item failures in input order.
    pub errors: Vec<BatchItemError>,
}

/// Progress snapshot reported after each completed item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchProgress {
    /// Items finished so far, successes and failures both counting.
    pub completed: usize,
    /// Total items in the batch.
    pub total: usize,
}

/// Process a batch of files through the background worker.
pub fn process_batch(files: &[SourceFile], config: &FrameConfig) -> FrameResult<BatchOutcome> {
    process_batch_with(files, config, |_| {})
}

/// [`process_batch`] with a progress callback invoked after every completed
/// item (success or failure).
#[tracing::instrument(skip_all, fields(total = files.len()))]
pub fn process_batch_with(
    files: &[SourceFile],
    config: &FrameConfig,
    mut on_progress: impl FnMut(BatchProgress),
) -> FrameResult<BatchOutcome> {
    let total = files.len();
    if total == 0 {
        return Ok(BatchOutcome::default());
    }

    // The worker cannot decode files; decode everything to raw buffers here.
    let decoded: Vec<_> = files
        .par_iter()
        .map(|f| decode_raw_rgba8(&f.bytes).map_err(|e| e.to_string()))
        .collect();

    let mut worker = FrameWorker::spawn()?;
    let mut completed = 0usize;
    // Input index per request id; completion order is not submission order.
    let mut index_by_id = HashMap::<u64, usize>::new();
    let mut failures: Vec<(usize, BatchItemError)> = Vec::new();
    let mut successes: Vec<(usize, ExportItem)> = Vec::new();

    for (i, result) in decoded.into_iter().enumerate() {
        match result {
            Ok(raw) => {
                let id = worker.submit(raw, config.clone())?;
                index_by_id.insert(id, i);
            }
            Err(message) => {
                failures.push((
                    i,
                    BatchItemError {
                        filename: files[i].name.clone(),
                        message,
                    },
                ));
                completed += 1;
                on_progress(BatchProgress { completed, total });
            }
        }
    }

    while worker.pending_len() > 0 {
        let Some(response) = worker.recv_timeout(BATCH_POLL_INTERVAL)? else {
            continue;
        };
        let i = index_by_id.remove(&response.id()).ok_or_else(|| {
            FrameError::surface_unavailable("worker answered an unknown request id")
        })?;
        match response {
            WorkResponse::Result { blob, .. } => {
                successes.push((
                    i,
                    ExportItem {
                        filename: suggested_filename(&files[i].name, blob.format),
                        result: blob,
                    },
                ));
            }
            WorkResponse::Error { message, .. } => {
                failures.push((
                    i,
                    BatchItemError {
                        filename: files[i].name.clone(),
                        message,
                    },
                ));
            }
        }
        completed += 1;
        on_progress(BatchProgress { completed, total });
    }

    successes.sort_by_key(|(i, _)| *i);
    failures.sort_by_key(|(i, _)| *i);

    if successes.is_empty() && !failures.is_empty() {
        tracing::debug!(failed = failures.len(), "batch failed entirely");
        return Err(FrameError::BatchFailed {
            count: failures.len(),
        });
    }

    Ok(BatchOutcome {
        items: successes.into_iter().map(|(_, item)| item).collect(),
        errors: failures.into_iter().map(|(_, err)| err).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_file(name: &str, rgba: [u8; 4]) -> SourceFile {
        let img = image::RgbaImage::from_raw(4, 4, rgba.repeat(16)).unwrap();
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        SourceFile {
            name: name.to_owned(),
            bytes,
        }
    }

    fn small_config() -> FrameConfig {
        FrameConfig {
            width: 16,
            height: 16,
            ..FrameConfig::default()
        }
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let outcome = process_batch(&[], &small_config()).unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn one_bad_file_yields_partial_results() {
        let files = vec![
            png_file("First Photo.png", [255, 0, 0, 255]),
            SourceFile {
                name: "broken.png".to_owned(),
                bytes: vec![1, 2, 3],
            },
            png_file("third.jpeg", [0, 0, 255, 255]),
        ];
        let outcome = process_batch(&files, &small_config()).unwrap();

        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.items[0].filename, "first_photo.png");
        assert_eq!(outcome.items[1].filename, "third.png");
        assert_eq!(outcome.errors[0].filename, "broken.png");
    }

    #[test]
    fn all_failures_raise_batch_error() {
        let files = vec![
            SourceFile {
                name: "a".to_owned(),
                bytes: vec![0],
            },
            SourceFile {
                name: "b".to_owned(),
                bytes: vec![1],
            },
        ];
        match process_batch(&files, &small_config()) {
            Err(FrameError::BatchFailed { count }) => assert_eq!(count, 2),
            other => panic!("expected BatchFailed, got {other:?}"),
        }
    }

    #[test]
    fn progress_counts_every_item_once() {
        let files = vec![
            png_file("one.png", [1, 1, 1, 255]),
            SourceFile {
                name: "bad".to_owned(),
                bytes: vec![9],
            },
            png_file("two.png", [2, 2, 2, 255]),
        ];
        let mut seen = Vec::new();
        process_batch_with(&files, &small_config(), |p| seen.push(p)).unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen.last(),
            Some(&BatchProgress {
                completed: 3,
                total: 3
            })
        );
    }
}
