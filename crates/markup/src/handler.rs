//! Event interface between the parser and its consumers.
//!
//! Every event borrows the parse buffer for the duration of the call only;
//! a handler that wants to keep a substring must copy it before returning.
//! Synthetic (`auto_*`) events carry their element name as a plain `&str`
//! because the name may no longer exist in the buffer.
//!
//! All methods default to no-ops, so a handler implements only the events
//! it cares about. Handlers compose into chains by owning the next link and
//! forwarding events, optionally filtering or synthesizing along the way.

use crate::config::{ParseConfig, ParseSelection};
use crate::error::ParseError;
use crate::span::Partition;
use crate::status::ParseStatus;

type Handled = Result<(), ParseError>;

/// Receiver for parse events.
///
/// An error returned from any event aborts the parse; it is propagated to
/// the `parse` caller unchanged and no further events are emitted.
#[allow(unused_variables)]
pub trait MarkupHandler {
    /// Called once before any event, with the active configuration.
    fn set_parse_config(&mut self, config: &ParseConfig) {}

    /// Called once before any event, with the opaque per-parse context.
    fn set_parse_selection(&mut self, selection: &ParseSelection) {}

    fn document_start(
        &mut self,
        start_nanos: u64,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn document_end(
        &mut self,
        end_nanos: u64,
        total_nanos: u64,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
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
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
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
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn cdata_section(
        &mut self,
        buffer: &str,
        content: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn comment(
        &mut self,
        buffer: &str,
        content: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn text(
        &mut self,
        buffer: &str,
        content: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        minimized: bool,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        minimized: bool,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn open_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn open_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn close_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn close_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn auto_open_element_start(
        &mut self,
        name: &str,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn auto_open_element_end(
        &mut self,
        name: &str,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn auto_close_element_start(
        &mut self,
        name: &str,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn auto_close_element_end(
        &mut self,
        name: &str,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
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
    ) -> Handled {
        Ok(())
    }

    fn inner_white_space(
        &mut self,
        buffer: &str,
        content: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Partition,
        content: Partition,
        outer: Partition,
        line: u32,
        col: u32,
        status: &mut ParseStatus,
    ) -> Handled {
        Ok(())
    }
}

/// Handler that satisfies every event with the default no-op.
#[derive(Debug, Default)]
pub struct NoOpHandler;

impl MarkupHandler for NoOpHandler {}
