//! Parser core: drives the tokenizer, consults the configuration and the
//! balancer, and dispatches events to the handler.
//!
//! The loop shape is fill -> tokenize -> dispatch -> observe status. Every
//! artifact is held entirely in the scan buffer while its events run, so
//! partitions stay valid for the duration of each handler call; the buffer
//! may shift or refill between artifacts.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::balancer::{self, CloseOutcome, ElementStack};
use crate::buffer::{MAX_STRUCTURE_BYTES, ScanBuffer};
use crate::config::{
    AttributeUniqueness, ElementBalancing, ParseConfig, ParseSelection, Presence, UniqueRoot,
};
use crate::elements;
use crate::error::{ParseError, ParseErrorKind};
use crate::handler::MarkupHandler;
use crate::source::TextSource;
use crate::span::Partition;
use crate::status::ParseStatus;
use crate::text;
use crate::tokenizer::{self, Artifact, Piece, Scan, TagItem};

/// Streaming markup parser for one configuration.
///
/// A parser instance is reusable across documents but not reentrant; each
/// `parse` call owns its buffer, status and element stack.
#[derive(Debug)]
pub struct MarkupParser {
    config: ParseConfig,
}

impl MarkupParser {
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse `source` to completion, dispatching events into `handler`.
    pub fn parse<S: TextSource, H: MarkupHandler>(
        &self,
        source: S,
        handler: &mut H,
    ) -> Result<(), ParseError> {
        let mut session = Session {
            config: &self.config,
            handler,
            buffer: ScanBuffer::new(),
            status: ParseStatus::new(),
            stack: ElementStack::new(),
            scan_hint: 0,
            seen_xml_declaration: false,
            seen_doctype: false,
            seen_root: false,
            seen_body_text: false,
            root_count: 0,
        };
        session.run(source)
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new(ParseConfig::default())
    }
}

fn wall_clock_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

struct Session<'p, H> {
    config: &'p ParseConfig,
    handler: &'p mut H,
    buffer: ScanBuffer,
    status: ParseStatus,
    stack: ElementStack,
    /// Resume hint for the tokenizer's terminator searches, absolute into
    /// the buffer; adjusted when the buffer shifts.
    scan_hint: usize,
    seen_xml_declaration: bool,
    seen_doctype: bool,
    seen_root: bool,
    /// Non-whitespace text has been seen; strict dialects use this to pin
    /// prolog structures to the document start.
    seen_body_text: bool,
    root_count: usize,
}

impl<H: MarkupHandler> Session<'_, H> {
    fn run(&mut self, mut source: impl TextSource) -> Result<(), ParseError> {
        let start_nanos = wall_clock_nanos();
        let started = Instant::now();
        let selection = ParseSelection::default();
        self.handler.set_parse_config(self.config);
        self.handler.set_parse_selection(&selection);
        self.handler.document_start(start_nanos, 1, 1, &mut self.status)?;

        loop {
            if !self.buffer.has_unread() {
                if self.buffer.at_eof() {
                    break;
                }
                self.refill(&mut source)?;
                continue;
            }
            if self.consume_limit_match(&mut source)? {
                continue;
            }

            let at = self.buffer.head();
            let scan = tokenizer::next_artifact(
                self.buffer.as_str(),
                at,
                self.scan_hint.max(at),
                self.buffer.at_eof(),
                self.config.is_lenient(),
                self.status.limit_sequence(),
            );
            match scan {
                Err(err) => {
                    let (line, col) = self.buffer.locate(err.offset);
                    return Err(ParseError::malformed(err.detail, line, col));
                }
                Ok(Scan::NeedMoreInput { rescan_from }) => {
                    debug_assert!(
                        !self.buffer.at_eof(),
                        "the tokenizer must resolve every structure at end of input"
                    );
                    self.scan_hint = rescan_from;
                    if self.buffer.window_len() >= MAX_STRUCTURE_BYTES {
                        let (line, col) = self.buffer.position();
                        return Err(ParseError::malformed(
                            "structure exceeds the buffer capacity limit",
                            line,
                            col,
                        ));
                    }
                    self.refill(&mut source)?;
                }
                Ok(Scan::Artifact(artifact)) => {
                    self.scan_hint = 0;
                    self.dispatch(artifact)?;
                }
            }
        }

        self.finish()?;
        let (line, col) = self.buffer.position();
        let total_nanos = started.elapsed().as_nanos() as u64;
        self.handler
            .document_end(wall_clock_nanos(), total_nanos, line, col, &mut self.status)
    }

    fn refill(&mut self, source: &mut impl TextSource) -> Result<(), ParseError> {
        let shifted = self.buffer.fill_from(source).map_err(|err| {
            let (line, col) = self.buffer.position();
            ParseError::new(
                ParseErrorKind::Source {
                    message: err.to_string(),
                },
                line,
                col,
            )
        })?;
        self.scan_hint = self.scan_hint.saturating_sub(shifted);
        Ok(())
    }

    /// When the raw-text terminator sits exactly at the read head, normal
    /// recognition resumes and the close tag is tokenized as usual.
    ///
    /// Returns true when the caller should restart the loop (more input was
    /// needed to decide).
    fn consume_limit_match(&mut self, source: &mut impl TextSource) -> Result<bool, ParseError> {
        let Some(limit) = self.status.limit_sequence() else {
            return Ok(false);
        };
        let bytes = self.buffer.as_str().as_bytes();
        let at = self.buffer.head();
        let available = bytes.len() - at;
        if available >= limit.len() {
            if text::starts_with_ignore_ascii_case_at(bytes, at, limit.as_bytes()) {
                self.status.clear_limit();
            }
            return Ok(false);
        }
        let prefix_matches =
            bytes[at..].eq_ignore_ascii_case(&limit.as_bytes()[..available]);
        if prefix_matches && !self.buffer.at_eof() {
            self.refill(source)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Partition for a piece, with its source position.
    fn part(&mut self, piece: Piece) -> Partition {
        let (line, col) = self.buffer.locate(piece.offset);
        Partition::new(piece.offset, piece.len, line, col)
    }

    fn dispatch(&mut self, artifact: Artifact) -> Result<(), ParseError> {
        log::trace!(target: "markup.parser", "artifact: {artifact:?}");
        let end = artifact.end();
        match artifact {
            Artifact::Text { content } => {
                self.apply_auto_directives()?;
                let part = self.part(content);
                let buf = self.buffer.as_str();
                self.handler
                    .text(buf, part, part.line, part.col, &mut self.status)?;
                if !self.seen_body_text {
                    let buf = self.buffer.as_str();
                    self.seen_body_text =
                        part.slice(buf).bytes().any(|b| !b.is_ascii_whitespace());
                }
            }
            Artifact::Comment { content, outer } => {
                let outer = self.part(outer);
                let content = self.part(content);
                let buf = self.buffer.as_str();
                self.handler.comment(
                    buf,
                    content,
                    outer,
                    outer.line,
                    outer.col,
                    &mut self.status,
                )?;
            }
            Artifact::Cdata { content, outer } => {
                let outer = self.part(outer);
                let content = self.part(content);
                let buf = self.buffer.as_str();
                self.handler.cdata_section(
                    buf,
                    content,
                    outer,
                    outer.line,
                    outer.col,
                    &mut self.status,
                )?;
            }
            Artifact::Doctype {
                keyword,
                element_name,
                kind,
                public_id,
                system_id,
                internal_subset,
                outer,
            } => {
                self.validate_doctype(outer)?;
                let outer = self.part(outer);
                let keyword = self.part(keyword);
                let element_name = self.part(element_name);
                let kind = self.part(kind);
                let public_id = self.part(public_id);
                let system_id = self.part(system_id);
                let internal_subset = self.part(internal_subset);
                let buf = self.buffer.as_str();
                self.handler.doctype(
                    buf,
                    keyword,
                    element_name,
                    kind,
                    public_id,
                    system_id,
                    internal_subset,
                    outer,
                    outer.line,
                    outer.col,
                    &mut self.status,
                )?;
                self.seen_doctype = true;
            }
            Artifact::XmlDeclaration {
                keyword,
                version,
                encoding,
                standalone,
                outer,
            } => {
                self.validate_xml_declaration(outer)?;
                let outer = self.part(outer);
                let keyword = self.part(keyword);
                let version = self.part(version);
                let encoding = self.part(encoding);
                let standalone = self.part(standalone);
                let buf = self.buffer.as_str();
                self.handler.xml_declaration(
                    buf,
                    keyword,
                    version,
                    encoding,
                    standalone,
                    outer,
                    outer.line,
                    outer.col,
                    &mut self.status,
                )?;
                self.seen_xml_declaration = true;
            }
            Artifact::ProcessingInstruction {
                target,
                content,
                outer,
            } => {
                let outer = self.part(outer);
                let target = self.part(target);
                let content = self.part(content);
                let buf = self.buffer.as_str();
                self.handler.processing_instruction(
                    buf,
                    target,
                    content,
                    outer,
                    outer.line,
                    outer.col,
                    &mut self.status,
                )?;
            }
            Artifact::OpenTag {
                name,
                items,
                minimized,
                outer,
            } => {
                self.apply_auto_directives()?;
                self.open_tag(name, &items, minimized, outer)?;
            }
            Artifact::CloseTag {
                name,
                trailing_ws,
                outer,
            } => {
                self.apply_auto_directives()?;
                self.close_tag(name, trailing_ws, outer)?;
            }
        }
        self.buffer.advance_to(end);
        Ok(())
    }

    fn validate_doctype(&mut self, outer: Piece) -> Result<(), ParseError> {
        let (line, col) = self.buffer.locate(outer.offset);
        if self.config.prolog_presence == Presence::Forbidden {
            return Err(ParseError::configuration("prolog is forbidden", line, col));
        }
        if self.config.doctype_presence == Presence::Forbidden {
            return Err(ParseError::configuration("DOCTYPE is forbidden", line, col));
        }
        if !self.config.is_lenient() {
            if self.seen_doctype {
                return Err(ParseError::unexpected("duplicate DOCTYPE", line, col));
            }
            if self.seen_root || self.seen_body_text {
                return Err(ParseError::unexpected(
                    "DOCTYPE after document content",
                    line,
                    col,
                ));
            }
        }
        Ok(())
    }

    fn validate_xml_declaration(&mut self, outer: Piece) -> Result<(), ParseError> {
        let (line, col) = self.buffer.locate(outer.offset);
        if self.config.prolog_presence == Presence::Forbidden {
            return Err(ParseError::configuration("prolog is forbidden", line, col));
        }
        if self.config.xml_declaration_presence == Presence::Forbidden {
            return Err(ParseError::configuration(
                "XML declaration is forbidden",
                line,
                col,
            ));
        }
        if !self.config.is_lenient()
            && (self.seen_xml_declaration
                || self.seen_doctype
                || self.seen_root
                || self.seen_body_text)
        {
            return Err(ParseError::unexpected(
                "XML declaration must open the document",
                line,
                col,
            ));
        }
        Ok(())
    }

    /// Presence rules that become checkable once the document body starts
    /// (or at end of input for element-less documents).
    fn check_required_prolog(&mut self, line: u32, col: u32) -> Result<(), ParseError> {
        if self.config.prolog_presence == Presence::Required
            && !self.seen_xml_declaration
            && !self.seen_doctype
        {
            return Err(ParseError::configuration("prolog is required", line, col));
        }
        if self.config.xml_declaration_presence == Presence::Required && !self.seen_xml_declaration
        {
            return Err(ParseError::configuration(
                "XML declaration is required",
                line,
                col,
            ));
        }
        if self.config.doctype_presence == Presence::Required && !self.seen_doctype {
            return Err(ParseError::configuration("DOCTYPE is required", line, col));
        }
        Ok(())
    }

    fn check_unique_root(&mut self, line: u32, col: u32) -> Result<(), ParseError> {
        if self.config.element_balancing == ElementBalancing::None || !self.stack.is_empty() {
            return Ok(());
        }
        self.root_count += 1;
        if self.root_count < 2 {
            return Ok(());
        }
        let violated = match self.config.unique_root_element {
            UniqueRoot::Required => true,
            UniqueRoot::DependsOnPrologDoctype => self.seen_doctype,
        };
        if violated {
            return Err(ParseError::configuration(
                "document must have a unique root element",
                line,
                col,
            ));
        }
        Ok(())
    }

    fn check_unique_attributes(&mut self, items: &[TagItem]) -> Result<(), ParseError> {
        if self.config.unique_attributes != AttributeUniqueness::Require {
            return Ok(());
        }
        let names: Vec<Piece> = items
            .iter()
            .filter_map(|item| match item {
                TagItem::Attribute(attr) => Some(attr.name),
                TagItem::WhiteSpace(_) => None,
            })
            .collect();
        for (index, a) in names.iter().enumerate() {
            for b in &names[index + 1..] {
                let duplicate = {
                    let buf = self.buffer.as_str();
                    let a_str = &buf[a.offset..a.end()];
                    let b_str = &buf[b.offset..b.end()];
                    text::equals(self.config.case_sensitive, a_str, b_str)
                        .then(|| b_str.to_string())
                };
                if let Some(name) = duplicate {
                    let (line, col) = self.buffer.locate(b.offset);
                    return Err(ParseError::configuration(
                        format!("duplicate attribute '{name}'"),
                        line,
                        col,
                    ));
                }
            }
        }
        Ok(())
    }

    fn emit_tag_items(&mut self, items: &[TagItem]) -> Result<(), ParseError> {
        for item in items {
            match item {
                TagItem::WhiteSpace(ws) => {
                    let part = self.part(*ws);
                    let buf = self.buffer.as_str();
                    self.handler
                        .inner_white_space(buf, part, part.line, part.col, &mut self.status)?;
                }
                TagItem::Attribute(attr) => {
                    let name = self.part(attr.name);
                    let operator = self.part(attr.operator);
                    let value_content = self.part(attr.value_content);
                    let value_outer = self.part(attr.value_outer);
                    let buf = self.buffer.as_str();
                    self.handler.attribute(
                        buf,
                        name,
                        operator,
                        value_content,
                        value_outer,
                        name.line,
                        name.col,
                        &mut self.status,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn open_tag(
        &mut self,
        name: Piece,
        items: &[TagItem],
        minimized: bool,
        outer: Piece,
    ) -> Result<(), ParseError> {
        let (start_line, start_col) = self.buffer.locate(outer.offset);
        if !self.seen_root && self.stack.is_empty() {
            self.check_required_prolog(start_line, start_col)?;
        }
        self.check_unique_attributes(items)?;

        let name_string = {
            let buf = self.buffer.as_str();
            buf[name.offset..name.end()].to_string()
        };
        let balancing = self.config.element_balancing;
        let html = self.config.is_html();
        let standalone = minimized || (html && elements::is_void(&name_string));

        // Implicit closes fire for any HTML element, standalone included:
        // an <hr> still closes an open <p>.
        if html && balancing == ElementBalancing::AutoOpenAndClose {
            let closes = balancer::implicit_closes(&self.stack, &name_string);
            for _ in 0..closes {
                self.auto_close_top(start_line, start_col)?;
            }
        }
        self.check_unique_root(start_line, start_col)?;
        self.seen_root = true;

        let name_part = self.part(name);

        if standalone {
            let buf = self.buffer.as_str();
            self.handler.standalone_element_start(
                buf,
                name_part,
                minimized,
                start_line,
                start_col,
                &mut self.status,
            )?;
            self.emit_tag_items(items)?;
            let end_pos = self.buffer.locate(outer.end());
            let buf = self.buffer.as_str();
            self.handler.standalone_element_end(
                buf,
                name_part,
                minimized,
                end_pos.0,
                end_pos.1,
                &mut self.status,
            )?;
            // A standalone element is never stacked; a pending suppression
            // request is spent regardless.
            let _ = self.status.take_avoid_stacking();
            return Ok(());
        }

        let buf = self.buffer.as_str();
        self.handler.open_element_start(
            buf,
            name_part,
            start_line,
            start_col,
            &mut self.status,
        )?;
        self.emit_tag_items(items)?;
        let end_pos = self.buffer.locate(outer.end());
        let buf = self.buffer.as_str();
        self.handler.open_element_end(
            buf,
            name_part,
            end_pos.0,
            end_pos.1,
            &mut self.status,
        )?;

        // Consumed after the open events so a handler can suppress the
        // element it is currently seeing.
        let suppress_push = self.status.take_avoid_stacking();
        if balancing != ElementBalancing::None && !suppress_push {
            self.stack.push(&name_string);
        }
        if html && elements::has_opaque_body(&name_string) {
            self.status.set_limit_sequence(format!("</{name_string}>"));
        }
        Ok(())
    }

    fn close_tag(
        &mut self,
        name: Piece,
        trailing_ws: Piece,
        outer: Piece,
    ) -> Result<(), ParseError> {
        let (start_line, start_col) = self.buffer.locate(outer.offset);
        let name_string = {
            let buf = self.buffer.as_str();
            buf[name.offset..name.end()].to_string()
        };
        let balancing = self.config.element_balancing;

        let outcome = if balancing == ElementBalancing::None {
            CloseOutcome::Matched
        } else {
            balancer::close_outcome(&self.stack, &name_string, self.config.case_sensitive)
        };

        match outcome {
            CloseOutcome::Matched => {
                self.emit_close_events(name, trailing_ws, outer, false)?;
                if balancing != ElementBalancing::None {
                    self.stack.pop();
                }
            }
            CloseOutcome::AutoClose { above } => {
                if balancing != ElementBalancing::AutoOpenAndClose {
                    return Err(ParseError::unexpected(
                        format!(
                            "close tag '{}' does not match the open element '{}'",
                            name_string,
                            self.stack.top().unwrap_or_default()
                        ),
                        start_line,
                        start_col,
                    ));
                }
                for _ in 0..above {
                    self.auto_close_top(start_line, start_col)?;
                }
                self.emit_close_events(name, trailing_ws, outer, false)?;
                self.stack.pop();
            }
            CloseOutcome::Unmatched => {
                if self.config.no_unmatched_close_elements {
                    return Err(ParseError::configuration(
                        format!("unmatched close tag '{name_string}'"),
                        start_line,
                        start_col,
                    ));
                }
                if balancing == ElementBalancing::Required {
                    return Err(ParseError::unexpected(
                        format!("close tag '{name_string}' has no open element"),
                        start_line,
                        start_col,
                    ));
                }
                self.emit_close_events(name, trailing_ws, outer, true)?;
            }
        }
        Ok(())
    }

    fn emit_close_events(
        &mut self,
        name: Piece,
        trailing_ws: Piece,
        outer: Piece,
        unmatched: bool,
    ) -> Result<(), ParseError> {
        let (start_line, start_col) = self.buffer.locate(outer.offset);
        let name_part = self.part(name);
        let ws_part = (!trailing_ws.is_empty()).then(|| self.part(trailing_ws));
        let end_pos = self.buffer.locate(outer.end());

        let buf = self.buffer.as_str();
        if unmatched {
            self.handler.unmatched_close_element_start(
                buf,
                name_part,
                start_line,
                start_col,
                &mut self.status,
            )?;
        } else {
            self.handler.close_element_start(
                buf,
                name_part,
                start_line,
                start_col,
                &mut self.status,
            )?;
        }
        if let Some(ws) = ws_part {
            let buf = self.buffer.as_str();
            self.handler
                .inner_white_space(buf, ws, ws.line, ws.col, &mut self.status)?;
        }
        let buf = self.buffer.as_str();
        if unmatched {
            self.handler.unmatched_close_element_end(
                buf,
                name_part,
                end_pos.0,
                end_pos.1,
                &mut self.status,
            )?;
        } else {
            self.handler.close_element_end(
                buf,
                name_part,
                end_pos.0,
                end_pos.1,
                &mut self.status,
            )?;
        }
        Ok(())
    }

    fn auto_close_top(&mut self, line: u32, col: u32) -> Result<(), ParseError> {
        let Some(name) = self.stack.pop() else {
            return Ok(());
        };
        log::trace!(target: "markup.parser", "auto-close {name}");
        self.handler
            .auto_close_element_start(&name, line, col, &mut self.status)?;
        self.handler
            .auto_close_element_end(&name, line, col, &mut self.status)?;
        Ok(())
    }

    /// Honor handler-requested synthetic events before the next text or
    /// element artifact.
    fn apply_auto_directives(&mut self) -> Result<(), ParseError> {
        let (line, col) = self.buffer.position();
        for name in self.status.take_auto_close() {
            let top_matches = self
                .stack
                .top()
                .is_some_and(|top| text::equals(self.config.case_sensitive, top, &name));
            if top_matches {
                self.auto_close_top(line, col)?;
            }
        }
        for name in self.status.take_auto_open() {
            self.handler
                .auto_open_element_start(&name, line, col, &mut self.status)?;
            self.handler
                .auto_open_element_end(&name, line, col, &mut self.status)?;
            if self.config.element_balancing != ElementBalancing::None {
                self.stack.push(&name);
            }
            self.seen_root = true;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        self.status.clear_limit();
        let (line, col) = self.buffer.position();
        if !self.seen_root {
            self.check_required_prolog(line, col)?;
        }
        match self.config.element_balancing {
            ElementBalancing::None => {}
            ElementBalancing::Required => {
                if let Some(open) = self.stack.top() {
                    return Err(ParseError::unexpected(
                        format!("element '{open}' is still open at end of input"),
                        line,
                        col,
                    ));
                }
            }
            ElementBalancing::AutoOpenAndClose => {
                while !self.stack.is_empty() {
                    self.auto_close_top(line, col)?;
                }
            }
        }
        Ok(())
    }
}
