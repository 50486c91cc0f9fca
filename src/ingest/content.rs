//! Content classification: decide whether a byte payload is text worth importing.
//!
//! The sniffer follows the WHATWG MIME sniffing table that most HTTP stacks
//! implement: only the first 512 bytes are inspected, well-known binary
//! signatures win, and anything left without "binary data bytes" is plain text.

use crate::error::{ImportError, Result};

/// Number of leading bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 512;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN: &str = "text/plain";

/// Tags that mark a payload as HTML when they open it (after whitespace).
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Exact prefixes, checked in order.
const EXACT_SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", "text/plain; charset=utf-8"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
    (b"BM", "image/bmp"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b".snd", "audio/basic"),
    (b"OggS\x00", "application/ogg"),
    (b"MThd\x00\x00\x00\x06", "audio/midi"),
    (b"ID3", "audio/mpeg"),
    (b"\x1A\x45\xDF\xA3", "video/webm"),
    (b"wOFF", "font/woff"),
    (b"wOF2", "font/woff2"),
    (b"\x00\x01\x00\x00", "font/ttf"),
    (b"OTTO", "font/otf"),
    (b"ttcf", "font/collection"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
];

/// Container formats identified by a prefix plus a tag at byte offset 8.
const TAGGED_CONTAINERS: &[(&[u8], &[u8], &str)] = &[
    (b"RIFF", b"WEBP", "image/webp"),
    (b"RIFF", b"WAVE", "audio/wave"),
    (b"RIFF", b"AVI ", "video/avi"),
    (b"FORM", b"AIFF", "audio/aiff"),
];

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// Control bytes that never occur in text.
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn starts_with_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() <= tag.len() {
        return false;
    }
    let matches = data
        .iter()
        .zip(tag)
        .all(|(d, t)| d.to_ascii_uppercase() == *t);
    // "<!--" needs no terminator; element tags must end in a space or '>'
    matches && (tag == b"<!--" || matches!(data[tag.len()], b' ' | b'>'))
}

/// Best-guess MIME type for `data`, inspecting at most [`SNIFF_LEN`] bytes.
pub fn sniff(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let first_non_ws = data.iter().position(|b| !is_whitespace(*b)).unwrap_or(data.len());
    let trimmed = &data[first_non_ws..];
    if HTML_TAGS.iter().any(|tag| starts_with_tag(trimmed, tag)) {
        return "text/html";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml";
    }

    if let Some((_, mime)) = EXACT_SIGNATURES.iter().find(|(sig, _)| data.starts_with(sig)) {
        return *mime;
    }

    if data.len() >= 12 {
        if let Some((_, _, mime)) = TAGGED_CONTAINERS
            .iter()
            .find(|(prefix, tag, _)| data.starts_with(prefix) && &data[8..12] == *tag)
        {
            return *mime;
        }
        if &data[4..8] == b"ftyp" {
            return "video/mp4";
        }
    }

    if data.iter().any(|b| is_binary_byte(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

/// Accept `data` as importable text, returning its sniffed MIME type.
///
/// Fails with [`ImportError::EmptyContent`] for zero bytes and
/// [`ImportError::NotText`] when the sniffed type is not `text/*`.
pub fn classify(data: &[u8]) -> Result<&'static str> {
    if data.is_empty() {
        return Err(ImportError::EmptyContent);
    }
    let mime = sniff(data);
    if mime.starts_with("text/") {
        Ok(mime)
    } else {
        Err(ImportError::NotText { mime })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plain_text() {
        assert_eq!(classify(b"This is a post from somewhere.").unwrap(), "text/plain");
        assert_eq!(classify("# Ünïcode heading\n\nbody".as_bytes()).unwrap(), "text/plain");
        assert_eq!(classify(b"  <html><body>hi</body></html>").unwrap(), "text/html");
        assert_eq!(classify(b"<?xml version=\"1.0\"?><a/>").unwrap(), "text/xml");
    }

    #[test]
    fn test_classify_empty() {
        assert!(matches!(classify(b""), Err(ImportError::EmptyContent)));
    }

    #[test]
    fn test_classify_binary_signatures() {
        assert!(matches!(
            classify(b"\xFF\xD8\xFF\xE0 jpeg data"),
            Err(ImportError::NotText { mime: "image/jpeg" })
        ));
        assert!(matches!(
            classify(b"\x89PNG\r\n\x1a\n"),
            Err(ImportError::NotText { mime: "image/png" })
        ));
        assert!(matches!(
            classify(b"%PDF-1.7 ..."),
            Err(ImportError::NotText { mime: "application/pdf" })
        ));
        assert!(matches!(
            classify(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Err(ImportError::NotText { mime: "image/webp" })
        ));
    }

    #[test]
    fn test_classify_control_bytes() {
        assert!(matches!(
            classify(b"text with a \x00 null byte"),
            Err(ImportError::NotText { mime: "application/octet-stream" })
        ));
        // tabs, newlines, form feeds and escapes are all allowed
        assert!(classify(b"a\tb\r\nc\x0Cd\x1Be").is_ok());
    }

    #[test]
    fn test_sniff_only_inspects_prefix() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(sniff(&data), "text/plain");
    }

    #[test]
    fn test_html_tag_needs_terminator() {
        assert_eq!(sniff(b"<p>para</p>"), "text/html");
        assert_eq!(sniff(b"<pre>"), "text/plain");
    }
}
