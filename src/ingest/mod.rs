pub mod archive;
pub mod content;
pub mod metadata;
pub mod post;
pub mod source;
pub mod title;
pub mod walker;

use std::path::Path;

pub use archive::{
    AllEntries, ArchiveEntry, ArchiveWalker, Collections, EntrySelector, Selection, SelectorKind,
    TextFilesOnly, TopLevelOnly, DRAFTS_KEY,
};
pub use content::{classify, sniff};
pub use metadata::{decompose_filename, FilenameParts};
pub use post::PostRecord;
pub use source::{parse_bytes, parse_file, parse_source, RawSource};
pub use title::extract_title;
pub use walker::{import_directory, DirectoryImport};

use crate::error::Result;

/// Parse one file. The title comes from a leading `# ` heading.
pub fn from_file(path: &Path) -> Result<PostRecord> {
    parse_file(path)
}

/// Parse every file directly inside `dir`.
pub fn from_directory(dir: &Path) -> Result<DirectoryImport> {
    import_directory(dir, None)
}

/// Parse the files directly inside `dir` whose names match the regex `pattern`.
pub fn from_directory_match(dir: &Path, pattern: &str) -> Result<DirectoryImport> {
    import_directory(dir, Some(pattern))
}

/// Every non-directory entry of a zip archive as a flat list.
pub fn from_zip(archive: &Path) -> Result<Vec<PostRecord>> {
    from_zip_by(archive, &AllEntries)
}

/// Entries of a zip archive chosen by `selector`, as a flat list.
pub fn from_zip_by<S>(archive: &Path, selector: &S) -> Result<Vec<PostRecord>>
where
    S: EntrySelector + ?Sized,
{
    ArchiveWalker::new().walk_flat(archive, selector)
}

/// Every non-directory entry of a zip archive, grouped by directory.
pub fn from_zip_dirs(archive: &Path) -> Result<Collections> {
    from_zip_dirs_by(archive, &AllEntries)
}

/// Entries of a zip archive chosen by `selector`, grouped by directory.
pub fn from_zip_dirs_by<S>(archive: &Path, selector: &S) -> Result<Collections>
where
    S: EntrySelector + ?Sized,
{
    ArchiveWalker::new().walk_grouped(archive, selector)
}
