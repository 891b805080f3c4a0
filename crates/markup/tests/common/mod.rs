//! Shared test support: an event recorder that renders each event to one
//! snapshot line, a serializer chain link that reconstructs the source from
//! partitions, and chunked sources for boundary tests.

// Each integration test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use std::io::{self, Read};

use markup::{
    MarkupHandler, MarkupParser, ParseConfig, ParseError, ParseStatus, Partition, ReaderSource,
};

/// Records every event as a compact line, e.g. `open_start(p)` or
/// `attr(x|=|1|1)`.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<String>,
}

impl MarkupHandler for Recorder {
    fn document_start(
        &mut self,
        _start_nanos: u64,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push("doc_start".into());
        Ok(())
    }

    fn document_end(
        &mut self,
        _end_nanos: u64,
        _total_nanos: u64,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push("doc_end".into());
        Ok(())
    }

    fn xml_declaration(
        &mut self,
        buffer: &str,
        _keyword: Partition,
        version: Partition,
        encoding: Partition,
        standalone: Partition,
        _outer: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "xmldecl(version={},encoding={},standalone={})",
            version.slice(buffer),
            encoding.slice(buffer),
            standalone.slice(buffer)
        ));
        Ok(())
    }

    fn doctype(
        &mut self,
        buffer: &str,
        keyword: Partition,
        element_name: Partition,
        kind: Partition,
        public_id: Partition,
        system_id: Partition,
        internal_subset: Partition,
        _outer: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "doctype({}|{}|{}|{}|{}|{})",
            keyword.slice(buffer),
            element_name.slice(buffer),
            kind.slice(buffer),
            public_id.slice(buffer),
            system_id.slice(buffer),
            internal_subset.slice(buffer)
        ));
        Ok(())
    }

    fn cdata_section(
        &mut self,
        buffer: &str,
        content: Partition,
        _outer: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("cdata({})", content.slice(buffer)));
        Ok(())
    }

    fn comment(
        &mut self,
        buffer: &str,
        content: Partition,
        _outer: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("comment({})", content.slice(buffer)));
        Ok(())
    }

    fn text(
        &mut self,
        buffer: &str,
        content: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("text({})", content.slice(buffer)));
        Ok(())
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        minimized: bool,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "standalone_start({},minimized={minimized})",
            name.slice(buffer)
        ));
        Ok(())
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        minimized: bool,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "standalone_end({},minimized={minimized})",
            name.slice(buffer)
        ));
        Ok(())
    }

    fn open_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("open_start({})", name.slice(buffer)));
        Ok(())
    }

    fn open_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("open_end({})", name.slice(buffer)));
        Ok(())
    }

    fn close_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("close_start({})", name.slice(buffer)));
        Ok(())
    }

    fn close_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("close_end({})", name.slice(buffer)));
        Ok(())
    }

    fn auto_open_element_start(
        &mut self,
        name: &str,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("auto_open_start({name})"));
        Ok(())
    }

    fn auto_open_element_end(
        &mut self,
        name: &str,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("auto_open_end({name})"));
        Ok(())
    }

    fn auto_close_element_start(
        &mut self,
        name: &str,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("auto_close_start({name})"));
        Ok(())
    }

    fn auto_close_element_end(
        &mut self,
        name: &str,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!("auto_close_end({name})"));
        Ok(())
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("unmatched_close_start({})", name.slice(buffer)));
        Ok(())
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("unmatched_close_end({})", name.slice(buffer)));
        Ok(())
    }

    fn attribute(
        &mut self,
        buffer: &str,
        name: Partition,
        operator: Partition,
        value_content: Partition,
        value_outer: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "attr({}|{}|{}|{})",
            name.slice(buffer),
            operator.slice(buffer),
            value_content.slice(buffer),
            value_outer.slice(buffer)
        ));
        Ok(())
    }

    fn inner_white_space(
        &mut self,
        buffer: &str,
        content: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events
            .push(format!("ws({:?})", content.slice(buffer)));
        Ok(())
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Partition,
        content: Partition,
        _outer: Partition,
        _line: u32,
        _col: u32,
        _status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "pi({}|{})",
            target.slice(buffer),
            content.slice(buffer)
        ));
        Ok(())
    }
}

/// Chain link that rebuilds the source from event partitions while
/// forwarding every event to the next handler.
///
/// Synthetic auto events contribute nothing, so XML output is byte-exact
/// and HTML output differs only by repaired markup.
pub struct Serializer<H> {
    pub out: String,
    pub next: H,
}

impl<H: MarkupHandler> Serializer<H> {
    pub fn new(next: H) -> Self {
        Self {
            out: String::new(),
            next,
        }
    }
}

impl<H: MarkupHandler> MarkupHandler for Serializer<H> {
    fn document_start(
        &mut self,
        start_nanos: u64,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.next.document_start(start_nanos, line, col, status)
    }

    fn document_end(
        &mut self,
        end_nanos: u64,
        total_nanos: u64,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.next
            .document_end(end_nanos, total_nanos, line, col, status)
    }

    fn xml_declaration(
        &mut self,
        buffer: &str,
        keyword: Partition,
        version: Partition,
        encoding: Partition,
        standalone: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(outer.slice(buffer));
        self.next.xml_declaration(
            buffer, keyword, version, encoding, standalone, outer, line, col, status,
        )
    }

    fn doctype(
        &mut self,
        buffer: &str,
        keyword: Partition,
        element_name: Partition,
        kind: Partition,
        public_id: Partition,
        system_id: Partition,
        internal_subset: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(outer.slice(buffer));
        self.next.doctype(
            buffer,
            keyword,
            element_name,
            kind,
            public_id,
            system_id,
            internal_subset,
            outer,
            line,
            col,
            status,
        )
    }

    fn cdata_section(
        &mut self,
        buffer: &str,
        content: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(outer.slice(buffer));
        self.next
            .cdata_section(buffer, content, outer, line, col, status)
    }

    fn comment(
        &mut self,
        buffer: &str,
        content: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(outer.slice(buffer));
        self.next.comment(buffer, content, outer, line, col, status)
    }

    fn text(
        &mut self,
        buffer: &str,
        content: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(content.slice(buffer));
        self.next.text(buffer, content, line, col, status)
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        minimized: bool,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push('<');
        self.out.push_str(name.slice(buffer));
        self.next
            .standalone_element_start(buffer, name, minimized, line, col, status)
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        minimized: bool,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(if minimized { "/>" } else { ">" });
        self.next
            .standalone_element_end(buffer, name, minimized, line, col, status)
    }

    fn open_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push('<');
        self.out.push_str(name.slice(buffer));
        self.next
            .open_element_start(buffer, name, line, col, status)
    }

    fn open_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push('>');
        self.next.open_element_end(buffer, name, line, col, status)
    }

    fn close_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str("</");
        self.out.push_str(name.slice(buffer));
        self.next
            .close_element_start(buffer, name, line, col, status)
    }

    fn close_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push('>');
        self.next.close_element_end(buffer, name, line, col, status)
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str("</");
        self.out.push_str(name.slice(buffer));
        self.next
            .unmatched_close_element_start(buffer, name, line, col, status)
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push('>');
        self.next
            .unmatched_close_element_end(buffer, name, line, col, status)
    }

    fn attribute(
        &mut self,
        buffer: &str,
        name: Partition,
        operator: Partition,
        value_content: Partition,
        value_outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(name.slice(buffer));
        self.out.push_str(operator.slice(buffer));
        self.out.push_str(value_outer.slice(buffer));
        self.next.attribute(
            buffer,
            name,
            operator,
            value_content,
            value_outer,
            line,
            col,
            status,
        )
    }

    fn inner_white_space(
        &mut self,
        buffer: &str,
        content: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(content.slice(buffer));
        self.next
            .inner_white_space(buffer, content, line, col, status)
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Partition,
        content: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Result<(), ParseError> {
        self.out.push_str(outer.slice(buffer));
        self.next
            .processing_instruction(buffer, target, content, outer, line, col, status)
    }
}

/// Reader that yields the input in fixed-size byte chunks, so UTF-8
/// sequences and markup structures split at arbitrary boundaries.
pub struct ChunkReader {
    bytes: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self
            .chunk
            .min(self.bytes.len() - self.pos)
            .min(buf.len());
        buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

pub fn chunked_source(input: &str, chunk: usize) -> ReaderSource<ChunkReader> {
    ReaderSource::new(ChunkReader {
        bytes: input.as_bytes().to_vec(),
        pos: 0,
        chunk: chunk.max(1),
    })
}

/// Reader that yields two chunks split at `split`.
pub fn split_source(input: &str, split: usize) -> ReaderSource<impl Read> {
    let head = input.as_bytes()[..split].to_vec();
    let tail = input.as_bytes()[split..].to_vec();
    ReaderSource::new(io::Cursor::new(head).chain(io::Cursor::new(tail)))
}

pub fn record(config: ParseConfig, input: &str) -> Vec<String> {
    let parser = MarkupParser::new(config);
    let mut recorder = Recorder::default();
    parser.parse(input, &mut recorder).expect("parse failed");
    recorder.events
}

pub fn try_record(config: ParseConfig, input: &str) -> Result<Vec<String>, ParseError> {
    let parser = MarkupParser::new(config);
    let mut recorder = Recorder::default();
    parser.parse(input, &mut recorder)?;
    Ok(recorder.events)
}

pub fn record_chunked(config: ParseConfig, input: &str, chunk: usize) -> Vec<String> {
    let parser = MarkupParser::new(config);
    let mut recorder = Recorder::default();
    parser
        .parse(chunked_source(input, chunk), &mut recorder)
        .expect("chunked parse failed");
    recorder.events
}
