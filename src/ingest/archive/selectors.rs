use std::str::FromStr;

use super::ArchiveEntry;
use crate::error::Result;
use crate::ingest::post::PostRecord;
use crate::ingest::source::parse_source;

/// What a selector decided for one archive entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Post(PostRecord),
    /// Leave the entry out without failing the walk.
    Skip,
}

/// Decides whether and how an archive entry becomes a post.
///
/// Returning [`ImportError::EmptyContent`](crate::error::ImportError::EmptyContent)
/// counts as [`Selection::Skip`]; any other error aborts the walk.
/// Plain functions and closures of the right shape are selectors too.
pub trait EntrySelector {
    fn select(&self, entry: &ArchiveEntry) -> Result<Selection>;
}

impl<F> EntrySelector for F
where
    F: Fn(&ArchiveEntry) -> Result<Selection>,
{
    fn select(&self, entry: &ArchiveEntry) -> Result<Selection> {
        self(entry)
    }
}

/// Parse an entry into a post, filling id, slug and collection from its name.
pub fn parse_entry(entry: &ArchiveEntry) -> Result<Selection> {
    parse_source(&entry.as_source(), true).map(Selection::Post)
}

/// Every non-directory entry, at any depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllEntries;

impl EntrySelector for AllEntries {
    fn select(&self, entry: &ArchiveEntry) -> Result<Selection> {
        if entry.is_dir {
            return Ok(Selection::Skip);
        }
        parse_entry(entry)
    }
}

/// Non-directory entries whose name ends in `.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFilesOnly;

impl EntrySelector for TextFilesOnly {
    fn select(&self, entry: &ArchiveEntry) -> Result<Selection> {
        if entry.is_dir || !entry.name.ends_with(".txt") {
            return Ok(Selection::Skip);
        }
        parse_entry(entry)
    }
}

/// Non-directory entries at the root of the archive only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopLevelOnly;

impl EntrySelector for TopLevelOnly {
    fn select(&self, entry: &ArchiveEntry) -> Result<Selection> {
        if entry.is_dir || !entry.is_top_level() {
            return Ok(Selection::Skip);
        }
        parse_entry(entry)
    }
}

/// Built-in selectors by name, as used in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorKind {
    #[default]
    All,
    Text,
    TopLevel,
}

impl SelectorKind {
    pub fn selector(&self) -> Box<dyn EntrySelector> {
        match self {
            SelectorKind::All => Box::new(AllEntries),
            SelectorKind::Text => Box::new(TextFilesOnly),
            SelectorKind::TopLevel => Box::new(TopLevelOnly),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::All => "all",
            SelectorKind::Text => "text",
            SelectorKind::TopLevel => "top-level",
        }
    }
}

impl FromStr for SelectorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(SelectorKind::All),
            "text" => Ok(SelectorKind::Text),
            "top-level" => Ok(SelectorKind::TopLevel),
            other => Err(format!(
                "unknown selector '{}' (expected all, text or top-level)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;

    fn entry(name: &str, contents: &[u8]) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            is_dir: name.ends_with('/'),
            modified: None,
            contents: contents.to_vec(),
        }
    }

    #[test]
    fn test_all_entries_accepts_any_depth() {
        let nested = AllEntries.select(&entry("blog/deep/post.md", b"hello")).unwrap();
        assert!(matches!(nested, Selection::Post(_)));
        assert_eq!(AllEntries.select(&entry("blog/", b"")).unwrap(), Selection::Skip);
    }

    #[test]
    fn test_text_files_only() {
        assert_eq!(TextFilesOnly.select(&entry("books.md", b"# t\nb")).unwrap(), Selection::Skip);
        match TextFilesOnly.select(&entry("rob/slug_id.txt", b"body")).unwrap() {
            Selection::Post(post) => {
                assert_eq!(post.source_id.as_deref(), Some("id"));
                assert_eq!(post.slug.as_deref(), Some("slug"));
                assert_eq!(post.collection_id.as_deref(), Some("rob"));
            }
            Selection::Skip => panic!("expected a post"),
        }
    }

    #[test]
    fn test_top_level_only() {
        assert_eq!(TopLevelOnly.select(&entry("blog/post.txt", b"x")).unwrap(), Selection::Skip);
        assert!(matches!(
            TopLevelOnly.select(&entry("post.txt", b"x")).unwrap(),
            Selection::Post(_)
        ));
    }

    #[test]
    fn test_selectors_propagate_parse_errors() {
        assert!(matches!(
            AllEntries.select(&entry("empty.txt", b"")),
            Err(ImportError::EmptyContent)
        ));
        assert!(matches!(
            AllEntries.select(&entry("photo.jpg", b"\xFF\xD8\xFF\xDB")),
            Err(ImportError::NotText { .. })
        ));
    }

    #[test]
    fn test_closure_selector() {
        let shouting = |e: &ArchiveEntry| -> Result<Selection> {
            let text = String::from_utf8_lossy(&e.contents).to_uppercase();
            Ok(Selection::Post(PostRecord::new("", text)))
        };
        match shouting.select(&entry("a.txt", b"quiet")).unwrap() {
            Selection::Post(post) => assert_eq!(post.body, "QUIET"),
            Selection::Skip => panic!("expected a post"),
        }
    }

    #[test]
    fn test_selector_kind_from_str() {
        assert_eq!("all".parse::<SelectorKind>().unwrap(), SelectorKind::All);
        assert_eq!("text".parse::<SelectorKind>().unwrap(), SelectorKind::Text);
        assert_eq!("top-level".parse::<SelectorKind>().unwrap(), SelectorKind::TopLevel);
        assert!("everything".parse::<SelectorKind>().is_err());
        assert_eq!(SelectorKind::TopLevel.as_str(), "top-level");
    }
}
