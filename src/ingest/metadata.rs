/// Identity parts recovered from an archive entry name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilenameParts {
    pub id: String,
    pub slug: String,
    pub collection: String,
}

/// Decompose an archive entry name of the form `[collection/][slug_]id[.txt]`.
///
/// The split is purely positional:
/// - a `/` makes the first segment the collection and the second the remainder,
/// - an `_` in the remainder makes its first segment the slug and the second the id.
///
/// # Examples
///
/// ```text
/// "rob/ubuntu-next_839ruu389ru9.txt" → id "839ruu389ru9", slug "ubuntu-next", collection "rob"
/// "839ruu389ru9.txt"                 → id "839ruu389ru9", slug "",            collection ""
/// "rob/839ruu389ru9.txt"             → id "839ruu389ru9", slug "",            collection "rob"
/// ```
pub fn decompose_filename(name: &str) -> FilenameParts {
    let mut rest = name.strip_suffix(".txt").unwrap_or(name);

    let mut collection = "";
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() > 1 {
        collection = segments[0];
        rest = segments[1];
    }

    let mut slug = "";
    let segments: Vec<&str> = rest.split('_').collect();
    if segments.len() > 1 {
        slug = segments[0];
        rest = segments[1];
    }

    FilenameParts {
        id: rest.to_string(),
        slug: slug.to_string(),
        collection: collection.to_string(),
    }
}

/// Non-empty string as `Some`, empty as `None`.
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
