//! Content sniffing for files whose extension says nothing.
//!
//! Markup is matched by its opening tag, binary formats by their magic
//! numbers. Whatever is left counts as plain text unless it holds control
//! bytes.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes inspected from the start of a file.
pub const SNIFF_LEN: u64 = 512;

pub const HTML_MIME_TYPE: &str = "text/html; charset=utf-8";
pub const XML_MIME_TYPE: &str = "text/xml; charset=utf-8";
pub const TEXT_MIME_TYPE: &str = "text/plain; charset=utf-8";

/// Tags that mark a document as HTML when they open it.
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

/// Read the head of `path` and sniff it.
pub fn sniff_file(path: &Path) -> io::Result<&'static str> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(sniff(&head))
}

/// MIME type of a buffer holding the start of a file.
pub fn sniff(head: &[u8]) -> &'static str {
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let trimmed = &head[start..];

    if HTML_TAGS.iter().any(|tag| opens_with_tag(trimmed, tag)) {
        return HTML_MIME_TYPE;
    }
    if trimmed.starts_with(b"<?xml") {
        return XML_MIME_TYPE;
    }
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if !head.iter().copied().any(is_binary_byte) {
        return TEXT_MIME_TYPE;
    }
    super::FALLBACK_MIME_TYPE
}

/// `tag` (case-insensitive) followed by a space or `>`.
fn opens_with_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() <= tag.len() || !data[..tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(data[tag.len()], b' ' | b'>')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
