//! Zip archive import: flat post lists and directory-derived collections.
//!
//! Every entry is offered to an [`EntrySelector`]. Entries the selector skips
//! (or that turn out empty) are left out; any other failure aborts the walk
//! and discards what was collected so far.

mod selectors;

pub use selectors::{
    parse_entry, AllEntries, EntrySelector, Selection, SelectorKind, TextFilesOnly, TopLevelOnly,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use super::post::PostRecord;
use super::source::RawSource;
use crate::error::{ImportError, Result};

/// Collection key for posts that sit at the root of an archive.
pub const DRAFTS_KEY: &str = "drafts";

/// Largest uncompressed entry read from an archive (100 MB).
///
/// Bigger entries are skipped so a zip bomb cannot exhaust memory.
pub const MAX_ENTRY_BYTES: u64 = 100_000_000;

/// One archive member, read into memory.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Full name inside the archive, `/`-separated.
    pub name: String,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
    /// Uncompressed bytes; empty for directories.
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    pub fn as_source(&self) -> RawSource<'_> {
        RawSource::new(&self.name, &self.contents).modified(self.modified)
    }

    /// True when the entry has no enclosing directory.
    pub fn is_top_level(&self) -> bool {
        !self.name.trim_end_matches('/').contains('/')
    }

    /// Name of the innermost directory enclosing this entry, if any.
    ///
    /// `blog/2020/post.txt` belongs to `2020`; a directory entry such as
    /// `blog/` belongs to `blog`.
    pub fn collection(&self) -> Option<&str> {
        collection_of(&self.name)
    }
}

/// Posts grouped by collection name. The drafts bucket is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Collections(BTreeMap<String, Vec<PostRecord>>);

impl Collections {
    pub fn new() -> Self {
        let mut map = BTreeMap::new();
        map.insert(DRAFTS_KEY.to_string(), Vec::new());
        Collections(map)
    }

    pub fn drafts(&self) -> &[PostRecord] {
        self.get(DRAFTS_KEY).unwrap_or(&[])
    }

    pub fn get(&self, name: &str) -> Option<&[PostRecord]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of collections, drafts included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn post_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<PostRecord>> {
        self.0
    }

    fn bucket(&mut self, name: &str) -> &mut Vec<PostRecord> {
        self.0.entry(name.to_string()).or_default()
    }
}

impl Default for Collections {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for Collections {
    type Item = (String, Vec<PostRecord>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<PostRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Walks zip archives, turning selected entries into posts.
#[derive(Debug, Clone)]
pub struct ArchiveWalker {
    max_entry_bytes: u64,
}

impl ArchiveWalker {
    pub fn new() -> Self {
        Self {
            max_entry_bytes: MAX_ENTRY_BYTES,
        }
    }

    pub fn with_max_entry_bytes(mut self, max_entry_bytes: u64) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self
    }

    /// All selected posts, in archive order.
    ///
    /// An archive that yields no posts gives an empty list, not an error.
    pub fn walk_flat<S>(&self, archive: &Path, selector: &S) -> Result<Vec<PostRecord>>
    where
        S: EntrySelector + ?Sized,
    {
        let mut posts = Vec::new();
        self.for_each_entry(archive, |member| {
            if let Some(post) = self.select(&member, selector)? {
                posts.push(post);
            }
            Ok(())
        })?;

        log::info!("Imported {} posts from {}", posts.len(), archive.display());
        Ok(posts)
    }

    /// Selected posts grouped by their innermost enclosing directory.
    ///
    /// Root-level entries go to [`DRAFTS_KEY`]. A collection appears as soon
    /// as any entry maps to it, even if none of its entries become posts.
    pub fn walk_grouped<S>(&self, archive: &Path, selector: &S) -> Result<Collections>
    where
        S: EntrySelector + ?Sized,
    {
        let mut collections = Collections::new();
        self.for_each_entry(archive, |member| {
            let key = collection_of(member.name()).unwrap_or(DRAFTS_KEY).to_string();
            let selected = self.select(&member, selector)?;
            let bucket = collections.bucket(&key);
            if let Some(post) = selected {
                bucket.push(post);
            }
            Ok(())
        })?;

        log::info!(
            "Imported {} posts in {} collections from {}",
            collections.post_count(),
            collections.len(),
            archive.display()
        );
        Ok(collections)
    }

    fn select<S>(&self, member: &Member, selector: &S) -> Result<Option<PostRecord>>
    where
        S: EntrySelector + ?Sized,
    {
        let entry = match member {
            Member::Read(entry) => entry,
            Member::Oversized { .. } => return Ok(None),
        };
        match selector.select(entry) {
            Ok(Selection::Post(post)) => Ok(Some(post)),
            Ok(Selection::Skip) => Ok(None),
            Err(e) if e.is_empty_content() => {
                log::debug!("Skipping empty entry {}", entry.name);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Open `archive` and feed each entry to `visit` in central directory order.
    ///
    /// The archive file is closed when this returns, on success or failure.
    fn for_each_entry<F>(&self, archive: &Path, mut visit: F) -> Result<()>
    where
        F: FnMut(Member) -> Result<()>,
    {
        let file = File::open(archive).map_err(|e| ImportError::io(archive, e))?;
        let mut zip = ZipArchive::new(file).map_err(|source| ImportError::ArchiveOpen {
            path: archive.to_path_buf(),
            source,
        })?;

        for index in 0..zip.len() {
            let mut file = zip.by_index(index).map_err(|source| ImportError::ArchiveRead {
                entry: format!("#{}", index),
                source,
            })?;

            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let modified = file.last_modified().and_then(zip_time_to_utc);

            let contents = if is_dir {
                Some(Vec::new())
            } else if file.size() > self.max_entry_bytes {
                None
            } else {
                read_limited(&mut file, self.max_entry_bytes)
                    .map_err(|e| ImportError::io(&name, e))?
            };
            drop(file);

            let member = match contents {
                Some(contents) => Member::Read(ArchiveEntry {
                    name,
                    is_dir,
                    modified,
                    contents,
                }),
                None => {
                    log::warn!(
                        "Skipping {}: exceeds limit of {} bytes",
                        name,
                        self.max_entry_bytes
                    );
                    Member::Oversized { name }
                }
            };
            visit(member)?;
        }
        Ok(())
    }
}

impl Default for ArchiveWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// An archive member as seen by a walk: read into memory, or too big to read.
enum Member {
    Read(ArchiveEntry),
    Oversized { name: String },
}

impl Member {
    fn name(&self) -> &str {
        match self {
            Member::Read(entry) => &entry.name,
            Member::Oversized { name } => name,
        }
    }
}

/// Read at most `limit` bytes; `None` when the reader holds more than that.
fn read_limited<R: Read>(reader: R, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut contents = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut contents)?;
    if contents.len() as u64 > limit {
        Ok(None)
    } else {
        Ok(Some(contents))
    }
}

/// Innermost non-empty directory segment of a `/`-separated entry name.
fn collection_of(name: &str) -> Option<&str> {
    let (dir, _) = name.rsplit_once('/')?;
    dir.rsplit('/').find(|segment| !segment.is_empty())
}

/// Zip timestamps carry no zone; they are read as UTC.
fn zip_time_to_utc(time: zip::DateTime) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(time.year().into(), time.month().into(), time.day().into())?
        .and_hms_opt(time.hour().into(), time.minute().into(), time.second().into())
        .map(|naive| naive.and_utc())
}
