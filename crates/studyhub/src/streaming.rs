//! Streaming helpers for directory-backed collections.

use std::{path::PathBuf, pin::Pin};

use async_stream::stream;
use tokio_stream::Stream;
use tokio::fs as tokio_fs;

use crate::{Result, DOCUMENT_EXTENSION};

/// Streams document ids from a collection directory.
///
/// Only regular `{id}.json` files count as documents; hidden entries and
/// subdirectories (such as a batch staging area) are skipped. Ids come out in
/// directory order, which is unspecified.
pub fn stream_document_ids(collection_path: PathBuf) -> Pin<Box<dyn Stream<Item = Result<String>> + Send>> {
    Box::pin(stream! {
        let mut entries = match tokio_fs::read_dir(&collection_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                yield Err(e.into());
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    yield Err(e.into());
                    break;
                }
            };

            let path = entry.path();
            let is_file = match entry.file_type().await {
                Ok(file_type) => file_type.is_file(),
                Err(e) => {
                    yield Err(e.into());
                    continue;
                }
            };
            if is_file
                && let Some(file_name) = path.file_name().and_then(|n| n.to_str())
                && !file_name.starts_with('.')
                && let Some(id) = file_name.strip_suffix(DOCUMENT_EXTENSION).and_then(|s| s.strip_suffix('.')) {
                yield Ok(id.to_owned());
            }
        }
    })
}

/// Returns `true` once the first document id shows up in the directory.
pub async fn has_documents(collection_path: PathBuf) -> Result<bool> {
    use futures::StreamExt as _;

    let mut ids = stream_document_ids(collection_path);
    match ids.next().await {
        Some(Ok(_)) => Ok(true),
        Some(Err(e)) => Err(e),
        None => Ok(false),
    }
}
