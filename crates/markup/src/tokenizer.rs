//! Structure tokenizer.
//!
//! Stateless over `(buffer, offsets)`: every call either recognizes one
//! complete artifact starting at the read head, reports `NeedMoreInput`
//! without consuming anything, or fails. A structure is never emitted until
//! it sits entirely inside the buffer, which keeps tokenization restartable
//! at structure boundaries after a refill.
//!
//! `rescan_from` hints let terminator searches (comment `-->`, CDATA `]]>`,
//! raw-text close sequences, text `<` scans) resume where the previous
//! attempt stopped instead of rescanning the whole pending structure, so
//! adversarial inputs stay linear. Tags and DOCTYPEs reparse from the
//! structure start; they are small.

use crate::text;

/// Contiguous byte range of the buffer, without position information.
/// Zero-length pieces anchor absent sub-structures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Piece {
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Piece {
    pub(crate) fn span(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self {
            offset: start,
            len: end - start,
        }
    }

    pub(crate) fn empty(at: usize) -> Self {
        Self { offset: at, len: 0 }
    }

    pub(crate) fn end(self) -> usize {
        self.offset + self.len
    }

    pub(crate) fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// One attribute inside an element tag.
///
/// `operator` covers exactly the `=` and its surrounding whitespace;
/// `value_content` excludes quotes, `value_outer` includes them. Absent
/// parts are zero-length pieces anchored where they would appear.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AttrParts {
    pub(crate) name: Piece,
    pub(crate) operator: Piece,
    pub(crate) value_content: Piece,
    pub(crate) value_outer: Piece,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum TagItem {
    WhiteSpace(Piece),
    Attribute(AttrParts),
}

#[derive(Debug)]
pub(crate) enum Artifact {
    Text {
        content: Piece,
    },
    Comment {
        content: Piece,
        outer: Piece,
    },
    Cdata {
        content: Piece,
        outer: Piece,
    },
    Doctype {
        keyword: Piece,
        element_name: Piece,
        kind: Piece,
        public_id: Piece,
        system_id: Piece,
        internal_subset: Piece,
        outer: Piece,
    },
    XmlDeclaration {
        keyword: Piece,
        version: Piece,
        encoding: Piece,
        standalone: Piece,
        outer: Piece,
    },
    ProcessingInstruction {
        target: Piece,
        content: Piece,
        outer: Piece,
    },
    OpenTag {
        name: Piece,
        items: Vec<TagItem>,
        minimized: bool,
        outer: Piece,
    },
    CloseTag {
        name: Piece,
        trailing_ws: Piece,
        outer: Piece,
    },
}

impl Artifact {
    /// End offset of the artifact; the parser advances the head here.
    pub(crate) fn end(&self) -> usize {
        match self {
            Artifact::Text { content } => content.end(),
            Artifact::Comment { outer, .. }
            | Artifact::Cdata { outer, .. }
            | Artifact::Doctype { outer, .. }
            | Artifact::XmlDeclaration { outer, .. }
            | Artifact::ProcessingInstruction { outer, .. }
            | Artifact::OpenTag { outer, .. }
            | Artifact::CloseTag { outer, .. } => outer.end(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Scan {
    /// The structure at the head is incomplete; refill and retry from
    /// `rescan_from`.
    NeedMoreInput { rescan_from: usize },
    Artifact(Artifact),
}

/// Tokenizer-level failure; the parser maps it to a positioned
/// `MalformedStructure` error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub(crate) detail: &'static str,
    pub(crate) offset: usize,
}

const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";
const CDATA_OPEN: &[u8] = b"<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";
const DOCTYPE_OPEN: &[u8] = b"<!DOCTYPE";
const PI_CLOSE: &[u8] = b"?>";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MatchResult {
    Matched,
    /// The buffer ends inside the pattern; more input could complete it.
    Partial,
    NoMatch,
}

fn match_prefix(bytes: &[u8], at: usize, pattern: &[u8], ci: bool) -> MatchResult {
    let available = bytes.len().saturating_sub(at);
    if available >= pattern.len() {
        let window = &bytes[at..at + pattern.len()];
        let matched = if ci {
            window.eq_ignore_ascii_case(pattern)
        } else {
            window == pattern
        };
        return if matched {
            MatchResult::Matched
        } else {
            MatchResult::NoMatch
        };
    }
    let window = &bytes[at..];
    let matched = if ci {
        window.eq_ignore_ascii_case(&pattern[..available])
    } else {
        window == &pattern[..available]
    };
    if matched {
        MatchResult::Partial
    } else {
        MatchResult::NoMatch
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LtClass {
    /// `<` begins a recognizable structure.
    Structure,
    /// `<` is literal text (lenient dialects only).
    Literal,
    /// Not enough lookahead to decide.
    Undecidable,
}

fn classify_lt(bytes: &[u8], pos: usize, at_eof: bool, lenient: bool) -> LtClass {
    debug_assert_eq!(bytes[pos], b'<');
    if !lenient {
        // Strict dialects terminate text at every `<`; the dispatcher
        // raises the precise error for unrecognizable structures.
        if pos + 1 < bytes.len() || at_eof {
            return LtClass::Structure;
        }
        return LtClass::Undecidable;
    }
    if pos + 1 >= bytes.len() {
        return if at_eof {
            LtClass::Literal
        } else {
            LtClass::Undecidable
        };
    }
    match bytes[pos + 1] {
        b'!' => {
            let mut partial = false;
            for (pattern, ci) in [
                (COMMENT_OPEN, false),
                (CDATA_OPEN, false),
                (DOCTYPE_OPEN, true),
            ] {
                match match_prefix(bytes, pos, pattern, ci) {
                    MatchResult::Matched => return LtClass::Structure,
                    MatchResult::Partial => partial = true,
                    MatchResult::NoMatch => {}
                }
            }
            if partial && !at_eof {
                LtClass::Undecidable
            } else {
                LtClass::Literal
            }
        }
        b'/' => {
            if pos + 2 >= bytes.len() {
                if at_eof {
                    LtClass::Literal
                } else {
                    LtClass::Undecidable
                }
            } else if text::is_name_start(bytes[pos + 2]) {
                LtClass::Structure
            } else {
                LtClass::Literal
            }
        }
        b'?' => LtClass::Structure,
        b => {
            if text::is_name_start(b) {
                LtClass::Structure
            } else {
                LtClass::Literal
            }
        }
    }
}

/// Recognize the artifact starting at `at`.
///
/// `scan_from` is the resume hint for content searches; pass `at` on the
/// first attempt. `limit` is the active raw-text terminator, if any.
pub(crate) fn next_artifact(
    buf: &str,
    at: usize,
    scan_from: usize,
    at_eof: bool,
    lenient: bool,
    limit: Option<&str>,
) -> Result<Scan, ScanError> {
    let bytes = buf.as_bytes();
    debug_assert!(at < bytes.len(), "tokenizer requires unread input");

    if let Some(limit) = limit {
        return Ok(scan_raw_text(bytes, at, scan_from, at_eof, limit));
    }
    if bytes[at] != b'<' {
        return scan_text(bytes, at, scan_from.max(at), at_eof, lenient);
    }
    match classify_lt(bytes, at, at_eof, lenient) {
        LtClass::Undecidable => Ok(Scan::NeedMoreInput { rescan_from: at }),
        LtClass::Literal => scan_text(bytes, at, scan_from.max(at + 1), at_eof, lenient),
        LtClass::Structure => dispatch_structure(bytes, at, scan_from, at_eof, lenient),
    }
}

fn dispatch_structure(
    bytes: &[u8],
    at: usize,
    scan_from: usize,
    at_eof: bool,
    lenient: bool,
) -> Result<Scan, ScanError> {
    if at + 1 >= bytes.len() {
        debug_assert!(at_eof, "classify_lt admits short strict input only at EOF");
        return Err(ScanError {
            detail: "markup structure never opened",
            offset: at,
        });
    }
    match bytes[at + 1] {
        b'!' => {
            if match_prefix(bytes, at, COMMENT_OPEN, false) == MatchResult::Matched {
                return scan_delimited(
                    bytes,
                    at,
                    COMMENT_OPEN.len(),
                    COMMENT_CLOSE,
                    scan_from,
                    at_eof,
                    lenient,
                    "comment never closed",
                    |content, outer| Artifact::Comment { content, outer },
                );
            }
            if match_prefix(bytes, at, CDATA_OPEN, false) == MatchResult::Matched {
                return scan_delimited(
                    bytes,
                    at,
                    CDATA_OPEN.len(),
                    CDATA_CLOSE,
                    scan_from,
                    at_eof,
                    lenient,
                    "CDATA section never closed",
                    |content, outer| Artifact::Cdata { content, outer },
                );
            }
            if match_prefix(bytes, at, DOCTYPE_OPEN, true) == MatchResult::Matched {
                return scan_doctype(bytes, at, at_eof, lenient);
            }
            if lenient {
                return scan_text(bytes, at, at + 1, at_eof, lenient);
            }
            Err(ScanError {
                detail: "unrecognized declaration",
                offset: at,
            })
        }
        b'?' => scan_question_mark(bytes, at, scan_from, at_eof, lenient),
        b'/' => scan_close_tag(bytes, at, at_eof, lenient),
        b if text::is_name_start(b) => scan_open_tag(bytes, at, at_eof, lenient),
        _ => {
            if lenient {
                scan_text(bytes, at, at + 1, at_eof, lenient)
            } else {
                Err(ScanError {
                    detail: "invalid character after '<'",
                    offset: at,
                })
            }
        }
    }
}

fn scan_text(
    bytes: &[u8],
    at: usize,
    from: usize,
    at_eof: bool,
    lenient: bool,
) -> Result<Scan, ScanError> {
    let len = bytes.len();
    let mut i = from.max(at);
    loop {
        let Some(rel) = memchr::memchr(b'<', &bytes[i..len]) else {
            if at_eof {
                return Ok(Scan::Artifact(Artifact::Text {
                    content: Piece::span(at, len),
                }));
            }
            return Ok(Scan::NeedMoreInput { rescan_from: len });
        };
        let pos = i + rel;
        debug_assert!(pos > at || bytes[at] != b'<');
        match classify_lt(bytes, pos, at_eof, lenient) {
            LtClass::Structure => {
                debug_assert!(pos > at, "structure start cannot open a text run");
                return Ok(Scan::Artifact(Artifact::Text {
                    content: Piece::span(at, pos),
                }));
            }
            LtClass::Undecidable => {
                return Ok(Scan::NeedMoreInput { rescan_from: pos });
            }
            LtClass::Literal => {
                i = pos + 1;
            }
        }
    }
}

fn scan_raw_text(bytes: &[u8], at: usize, scan_from: usize, at_eof: bool, limit: &str) -> Scan {
    let len = bytes.len();
    match text::find_ignore_ascii_case(bytes, scan_from.max(at), limit.as_bytes()) {
        Some(pos) => {
            debug_assert!(pos > at, "the parser consumes a head-positioned match");
            Scan::Artifact(Artifact::Text {
                content: Piece::span(at, pos),
            })
        }
        None if at_eof => Scan::Artifact(Artifact::Text {
            content: Piece::span(at, len),
        }),
        None => Scan::NeedMoreInput {
            rescan_from: len.saturating_sub(limit.len() - 1).max(at),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn scan_delimited(
    bytes: &[u8],
    at: usize,
    open_len: usize,
    close: &[u8],
    scan_from: usize,
    at_eof: bool,
    lenient: bool,
    unterminated: &'static str,
    build: impl FnOnce(Piece, Piece) -> Artifact,
) -> Result<Scan, ScanError> {
    let len = bytes.len();
    let content_start = at + open_len;
    let from = scan_from.max(content_start);
    if from <= len {
        if let Some(pos) = find_literal(bytes, from, close) {
            let outer = Piece::span(at, pos + close.len());
            let content = Piece::span(content_start, pos);
            return Ok(Scan::Artifact(build(content, outer)));
        }
    }
    if at_eof {
        if lenient {
            // Reinterpret the unterminated structure as literal text.
            return Ok(Scan::Artifact(Artifact::Text {
                content: Piece::span(at, len),
            }));
        }
        return Err(ScanError {
            detail: unterminated,
            offset: at,
        });
    }
    Ok(Scan::NeedMoreInput {
        rescan_from: len.saturating_sub(close.len() - 1).max(content_start),
    })
}

fn find_literal(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let len = bytes.len();
    let mut i = from;
    while i + needle.len() <= len {
        let rel = memchr::memchr(needle[0], &bytes[i..])?;
        let pos = i + rel;
        if pos + needle.len() > len {
            return None;
        }
        if text::starts_with_at(bytes, pos, needle) {
            return Some(pos);
        }
        i = pos + 1;
    }
    None
}

fn skip_ws(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i < end && text::is_markup_whitespace(bytes[i]) {
        i += 1;
    }
    i
}

fn scan_doctype(bytes: &[u8], at: usize, at_eof: bool, lenient: bool) -> Result<Scan, ScanError> {
    let len = bytes.len();
    // Locate the terminating `>` first, honoring quotes and the bracketed
    // internal subset; the detail grammar is parsed on the complete span.
    let mut j = at + DOCTYPE_OPEN.len();
    let mut quote = 0u8;
    let mut depth = 0usize;
    let gt = loop {
        if j >= len {
            if at_eof {
                if lenient {
                    return Ok(Scan::Artifact(Artifact::Text {
                        content: Piece::span(at, len),
                    }));
                }
                return Err(ScanError {
                    detail: "DOCTYPE never closed",
                    offset: at,
                });
            }
            return Ok(Scan::NeedMoreInput { rescan_from: at });
        }
        let b = bytes[j];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else {
            match b {
                b'"' | b'\'' => quote = b,
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => break j,
                _ => {}
            }
        }
        j += 1;
    };

    let err = |detail: &'static str, offset: usize| Err(ScanError { detail, offset });
    let keyword = Piece::span(at + 2, at + DOCTYPE_OPEN.len());
    let mut i = keyword.end();
    if i >= gt || !text::is_markup_whitespace(bytes[i]) {
        return err("DOCTYPE requires an element name", i);
    }
    i = skip_ws(bytes, i, gt);
    let name_start = i;
    while i < gt && !text::is_markup_whitespace(bytes[i]) && bytes[i] != b'[' {
        i += 1;
    }
    if i == name_start {
        return err("DOCTYPE requires an element name", i);
    }
    let element_name = Piece::span(name_start, i);
    i = skip_ws(bytes, i, gt);

    let mut kind = Piece::empty(i);
    let mut public_id = Piece::empty(i);
    let mut system_id = Piece::empty(i);
    if i < gt && bytes[i] != b'[' {
        let kind_start = i;
        while i < gt
            && !text::is_markup_whitespace(bytes[i])
            && bytes[i] != b'['
            && bytes[i] != b'"'
            && bytes[i] != b'\''
        {
            i += 1;
        }
        let kind_slice = &bytes[kind_start..i];
        let is_public = kind_slice.eq_ignore_ascii_case(b"PUBLIC");
        let is_system = kind_slice.eq_ignore_ascii_case(b"SYSTEM");
        if !is_public && !is_system {
            return err("DOCTYPE type must be PUBLIC or SYSTEM", kind_start);
        }
        kind = Piece::span(kind_start, i);
        i = skip_ws(bytes, i, gt);

        let mut ids: [Piece; 2] = [Piece::empty(i), Piece::empty(i)];
        let mut id_count = 0;
        let max_ids = if is_public { 2 } else { 1 };
        while id_count < max_ids && i < gt && (bytes[i] == b'"' || bytes[i] == b'\'') {
            let q = bytes[i];
            let content_start = i + 1;
            let Some(rel) = memchr::memchr(q, &bytes[content_start..gt]) else {
                return err("unterminated quoted identifier in DOCTYPE", i);
            };
            ids[id_count] = Piece::span(content_start, content_start + rel);
            id_count += 1;
            i = content_start + rel + 1;
            i = skip_ws(bytes, i, gt);
        }
        if is_public {
            public_id = ids[0];
            system_id = if id_count == 2 { ids[1] } else { Piece::empty(i) };
        } else {
            system_id = ids[0];
            public_id = Piece::empty(kind.end());
        }
    }

    let mut internal_subset = Piece::empty(i);
    if i < gt && bytes[i] == b'[' {
        let subset_start = i + 1;
        let mut depth = 1usize;
        let mut quote = 0u8;
        let mut k = subset_start;
        while k < gt {
            let b = bytes[k];
            if quote != 0 {
                if b == quote {
                    quote = 0;
                }
            } else {
                match b {
                    b'"' | b'\'' => quote = b,
                    b'[' => depth += 1,
                    b']' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            k += 1;
        }
        if depth != 0 {
            return err("unterminated DOCTYPE internal subset", i);
        }
        internal_subset = Piece::span(subset_start, k);
        i = skip_ws(bytes, k + 1, gt);
    }

    if i != gt {
        return err("unexpected content in DOCTYPE", i);
    }
    Ok(Scan::Artifact(Artifact::Doctype {
        keyword,
        element_name,
        kind,
        public_id,
        system_id,
        internal_subset,
        outer: Piece::span(at, gt + 1),
    }))
}

fn scan_question_mark(
    bytes: &[u8],
    at: usize,
    scan_from: usize,
    at_eof: bool,
    lenient: bool,
) -> Result<Scan, ScanError> {
    let len = bytes.len();
    let content_base = at + 2;
    let from = scan_from.max(content_base);
    let Some(end) = find_literal(bytes, from.min(len), PI_CLOSE) else {
        if at_eof {
            if lenient {
                return Ok(Scan::Artifact(Artifact::Text {
                    content: Piece::span(at, len),
                }));
            }
            return Err(ScanError {
                detail: "processing instruction never closed",
                offset: at,
            });
        }
        return Ok(Scan::NeedMoreInput {
            rescan_from: len.saturating_sub(PI_CLOSE.len() - 1).max(content_base),
        });
    };

    let mut i = content_base;
    while i < end
        && !text::is_markup_whitespace(bytes[i])
        && bytes[i] != b'?'
        && bytes[i] != b'>'
    {
        i += 1;
    }
    if i == content_base {
        if lenient {
            return scan_text(bytes, at, at + 1, at_eof, lenient);
        }
        return Err(ScanError {
            detail: "processing instruction requires a target",
            offset: at,
        });
    }
    let target = Piece::span(content_base, i);
    let outer = Piece::span(at, end + PI_CLOSE.len());

    if bytes[target.offset..target.end()].eq_ignore_ascii_case(b"xml") {
        return scan_xml_declaration(bytes, at, target, end, lenient);
    }

    let content_start = skip_ws(bytes, i, end);
    let content = if content_start < end {
        Piece::span(content_start, end)
    } else {
        Piece::empty(end)
    };
    Ok(Scan::Artifact(Artifact::ProcessingInstruction {
        target,
        content,
        outer,
    }))
}

fn scan_xml_declaration(
    bytes: &[u8],
    at: usize,
    keyword: Piece,
    end: usize,
    lenient: bool,
) -> Result<Scan, ScanError> {
    let err = |detail: &'static str, offset: usize| Err(ScanError { detail, offset });
    let mut version = Piece::empty(keyword.end());
    let mut encoding = Piece::empty(keyword.end());
    let mut standalone = Piece::empty(keyword.end());
    // version -> encoding -> standalone, each at most once, in order.
    let mut next_slot = 0usize;

    let mut i = keyword.end();
    loop {
        let rest = skip_ws(bytes, i, end);
        if rest == end {
            break;
        }
        if rest == i {
            return err("expected whitespace in XML declaration", i);
        }
        i = rest;
        let name_start = i;
        while i < end && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let name = &bytes[name_start..i];
        let slot = match name {
            b"version" => 0,
            b"encoding" => 1,
            b"standalone" => 2,
            _ => return err("unexpected attribute in XML declaration", name_start),
        };
        if slot < next_slot {
            return err("XML declaration attributes out of order", name_start);
        }
        next_slot = slot + 1;

        i = skip_ws(bytes, i, end);
        if i >= end || bytes[i] != b'=' {
            return err("XML declaration attribute requires '='", i);
        }
        i = skip_ws(bytes, i + 1, end);
        if i >= end || (bytes[i] != b'"' && bytes[i] != b'\'') {
            return err("XML declaration value must be quoted", i);
        }
        let q = bytes[i];
        let value_start = i + 1;
        let Some(rel) = memchr::memchr(q, &bytes[value_start..end]) else {
            return err("unterminated value in XML declaration", i);
        };
        let value = Piece::span(value_start, value_start + rel);
        match slot {
            0 => version = value,
            1 => encoding = value,
            _ => standalone = value,
        }
        i = value_start + rel + 1;
    }
    // An XML declaration without a version is tolerated in lenient mode
    // only; partitions stay zero-length either way.
    if version.is_empty() && !lenient {
        return err("XML declaration requires a version", keyword.end());
    }
    Ok(Scan::Artifact(Artifact::XmlDeclaration {
        keyword,
        version,
        encoding,
        standalone,
        outer: Piece::span(at, end + PI_CLOSE.len()),
    }))
}

/// Attribute/element name run. In lenient mode `/` joins the name unless it
/// introduces `/>`; strict mode stops at every `/`.
fn scan_name_run(bytes: &[u8], mut i: usize, len: usize, lenient: bool) -> usize {
    while i < len {
        let b = bytes[i];
        if text::is_markup_whitespace(b) || b == b'>' || b == b'=' {
            break;
        }
        if b == b'/' {
            if !lenient {
                break;
            }
            if i + 1 < len && bytes[i + 1] == b'>' {
                break;
            }
            if i + 1 >= len {
                break;
            }
        }
        i += 1;
    }
    i
}

fn scan_open_tag(bytes: &[u8], at: usize, at_eof: bool, lenient: bool) -> Result<Scan, ScanError> {
    let len = bytes.len();
    let incomplete = || -> Result<Scan, ScanError> {
        if at_eof {
            if lenient {
                Ok(Scan::Artifact(Artifact::Text {
                    content: Piece::span(at, len),
                }))
            } else {
                Err(ScanError {
                    detail: "element tag never closed",
                    offset: at,
                })
            }
        } else {
            Ok(Scan::NeedMoreInput { rescan_from: at })
        }
    };

    let name_start = at + 1;
    let mut i = scan_name_run(bytes, name_start, len, false);
    if i >= len && !at_eof {
        return incomplete();
    }
    let name = Piece::span(name_start, i);
    let mut items: Vec<TagItem> = Vec::new();
    let mut pending_ws: Option<Piece> = None;

    loop {
        if i >= len {
            return incomplete();
        }
        let b = bytes[i];
        if b == b'>' {
            if let Some(ws) = pending_ws.take() {
                items.push(TagItem::WhiteSpace(ws));
            }
            return Ok(Scan::Artifact(Artifact::OpenTag {
                name,
                items,
                minimized: false,
                outer: Piece::span(at, i + 1),
            }));
        }
        if b == b'/' {
            if i + 1 >= len {
                return incomplete();
            }
            if bytes[i + 1] == b'>' {
                if let Some(ws) = pending_ws.take() {
                    items.push(TagItem::WhiteSpace(ws));
                }
                return Ok(Scan::Artifact(Artifact::OpenTag {
                    name,
                    items,
                    minimized: true,
                    outer: Piece::span(at, i + 2),
                }));
            }
            if !lenient {
                return Err(ScanError {
                    detail: "unexpected '/' inside element tag",
                    offset: i,
                });
            }
            // falls through: lenient recovery folds the slash into an
            // attribute name so the input round-trips
        }
        if text::is_markup_whitespace(b) {
            let ws_end = skip_ws(bytes, i, len);
            if ws_end >= len {
                // Cannot classify the run (operator vs inner whitespace)
                // without the next character.
                return incomplete();
            }
            pending_ws = Some(Piece::span(i, ws_end));
            i = ws_end;
            continue;
        }
        if b == b'=' {
            // `=` with no preceding attribute name; recover leniently by
            // treating it as the start of a nameless attribute operator.
            if !lenient {
                return Err(ScanError {
                    detail: "attribute operator without a name",
                    offset: i,
                });
            }
        }

        // Attribute.
        if let Some(ws) = pending_ws.take() {
            items.push(TagItem::WhiteSpace(ws));
        }
        let attr_name_start = i;
        let mut j = scan_name_run(bytes, i, len, lenient);
        if j >= len && !at_eof {
            return incomplete();
        }
        if j == attr_name_start && bytes.get(j) != Some(&b'=') {
            // No progress and no operator ahead; consume one byte as a
            // name so the loop always terminates.
            j += 1;
        }
        let attr_name = Piece::span(attr_name_start, j);

        // Operator lookahead: whitespace adjacent to `=` belongs to it.
        let ws2_end = skip_ws(bytes, j, len);
        if ws2_end >= len && !at_eof {
            return incomplete();
        }
        if ws2_end < len && bytes[ws2_end] == b'=' {
            let op_ws_end = skip_ws(bytes, ws2_end + 1, len);
            if op_ws_end >= len && !at_eof {
                return incomplete();
            }
            let operator = Piece::span(j, op_ws_end.min(len));
            let v = op_ws_end;
            if v >= len {
                // `name=` at end of input (lenient EOF recovery path).
                items.push(TagItem::Attribute(AttrParts {
                    name: attr_name,
                    operator,
                    value_content: Piece::empty(operator.end()),
                    value_outer: Piece::empty(operator.end()),
                }));
                i = v;
                continue;
            }
            let vb = bytes[v];
            if vb == b'"' || vb == b'\'' {
                let content_start = v + 1;
                let Some(rel) = memchr::memchr(vb, &bytes[content_start..len]) else {
                    return incomplete();
                };
                let content_end = content_start + rel;
                items.push(TagItem::Attribute(AttrParts {
                    name: attr_name,
                    operator,
                    value_content: Piece::span(content_start, content_end),
                    value_outer: Piece::span(v, content_end + 1),
                }));
                i = content_end + 1;
            } else {
                let mut w = v;
                while w < len {
                    let b = bytes[w];
                    if text::is_markup_whitespace(b) || b == b'>' || b == b'/' {
                        break;
                    }
                    w += 1;
                }
                if w >= len && !at_eof {
                    return incomplete();
                }
                let value = Piece::span(v, w);
                items.push(TagItem::Attribute(AttrParts {
                    name: attr_name,
                    operator,
                    value_content: value,
                    value_outer: value,
                }));
                i = w;
            }
        } else {
            // No operator: the attribute stands alone; ws2 (if any) is
            // ordinary inner whitespace for the next loop turn.
            items.push(TagItem::Attribute(AttrParts {
                name: attr_name,
                operator: Piece::empty(attr_name.end()),
                value_content: Piece::empty(attr_name.end()),
                value_outer: Piece::empty(attr_name.end()),
            }));
            if ws2_end > j {
                pending_ws = Some(Piece::span(j, ws2_end));
            }
            i = ws2_end;
        }
    }
}

fn scan_close_tag(bytes: &[u8], at: usize, at_eof: bool, lenient: bool) -> Result<Scan, ScanError> {
    let len = bytes.len();
    let name_start = at + 2;
    let mut i = scan_name_run(bytes, name_start, len, false);
    if i >= len && !at_eof {
        return Ok(Scan::NeedMoreInput { rescan_from: at });
    }
    let name = Piece::span(name_start, i);
    let ws_end = skip_ws(bytes, i, len);
    if ws_end >= len {
        if !at_eof {
            return Ok(Scan::NeedMoreInput { rescan_from: at });
        }
        if lenient {
            return Ok(Scan::Artifact(Artifact::Text {
                content: Piece::span(at, len),
            }));
        }
        return Err(ScanError {
            detail: "close tag never closed",
            offset: at,
        });
    }
    if bytes[ws_end] != b'>' {
        if lenient {
            // `</name junk>` is not a close tag; fall back to literal text.
            return scan_text(bytes, at, at + 1, at_eof, lenient);
        }
        return Err(ScanError {
            detail: "malformed close tag",
            offset: ws_end,
        });
    }
    let trailing_ws = if ws_end > i {
        Piece::span(i, ws_end)
    } else {
        Piece::empty(i)
    };
    Ok(Scan::Artifact(Artifact::CloseTag {
        name,
        trailing_ws,
        outer: Piece::span(at, ws_end + 1),
    }))
}
