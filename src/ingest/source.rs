use chrono::{DateTime, Utc};
use std::path::Path;

use super::content::classify;
use super::metadata::{decompose_filename, non_empty};
use super::post::PostRecord;
use super::title::extract_title;
use crate::error::{ImportError, Result};

/// Raw bytes of one file or archive entry, alive only for a single parse.
#[derive(Debug, Clone, Copy)]
pub struct RawSource<'a> {
    /// File path or archive entry name the bytes came from.
    pub origin: &'a str,
    pub bytes: &'a [u8],
    /// Modification time of the origin, when known.
    pub modified: Option<DateTime<Utc>>,
}

impl<'a> RawSource<'a> {
    pub fn new(origin: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            origin,
            bytes,
            modified: None,
        }
    }

    pub fn modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.modified = modified;
        self
    }
}

/// Turn a text payload into a post without any source metadata.
///
/// Content that is nothing but a title line yields [`ImportError::EmptyContent`]
/// so that every produced post has a non-empty body.
pub fn parse_bytes(bytes: &[u8]) -> Result<PostRecord> {
    classify(bytes)?;

    let text = String::from_utf8_lossy(bytes);
    let (title, body) = extract_title(&text);
    if body.is_empty() {
        return Err(ImportError::EmptyContent);
    }
    Ok(PostRecord::new(title, body))
}

/// Parse a raw source, stamping its modification time on the post.
///
/// With `decompose_origin` the origin is treated as an archive entry name and
/// split into id, slug and collection.
pub fn parse_source(source: &RawSource<'_>, decompose_origin: bool) -> Result<PostRecord> {
    let mut post = parse_bytes(source.bytes)?.with_created_at(source.modified);

    if decompose_origin {
        let parts = decompose_filename(source.origin);
        post.source_id = non_empty(parts.id);
        post.slug = non_empty(parts.slug);
        post.collection_id = non_empty(parts.collection);
    }

    log::debug!("Parsed {} (title: {:?})", source.origin, post.title);
    Ok(post)
}

/// Read a single file and parse it into a post dated by the file's mtime.
pub fn parse_file(path: &Path) -> Result<PostRecord> {
    let bytes = std::fs::read(path).map_err(|e| ImportError::io(path, e))?;
    let metadata = std::fs::metadata(path).map_err(|e| ImportError::io(path, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| ImportError::io(path, e))?;

    let origin = path.to_string_lossy();
    let source = RawSource::new(&origin, &bytes).modified(Some(DateTime::<Utc>::from(modified)));
    parse_source(&source, false)
}
