//! Streaming, event-driven parser for HTML and XML dialects.
//!
//! The parser ingests a character stream and emits a finely-grained
//! sequence of structural events (document boundaries, declarations,
//! DOCTYPE, elements, attributes, text, comments, CDATA sections,
//! processing instructions) into a [`MarkupHandler`]. Events carry
//! `(offset, length, line, column)` partitions of a shared read-only
//! buffer; nothing is copied or retained by the core.
//!
//! In the HTML dialect, malformed or HTML5-style markup (implicit closes,
//! void elements, raw-text bodies like `<script>`) is adapted into a
//! well-formed event stream by an auto-balancing engine; synthetic events
//! are reported as `auto_*` so consumers can tell them apart from real
//! markup. The XML dialect treats every element uniformly and fails fast
//! on malformed input.
//!
//! ```
//! use markup::{MarkupHandler, MarkupParser, ParseConfig, ParseStatus, Partition};
//!
//! #[derive(Default)]
//! struct TagCounter {
//!     opened: usize,
//! }
//!
//! impl MarkupHandler for TagCounter {
//!     fn open_element_start(
//!         &mut self,
//!         _buffer: &str,
//!         _name: Partition,
//!         _line: u32,
//!         _col: u32,
//!         _status: &mut ParseStatus,
//!     ) -> Result<(), markup::ParseError> {
//!         self.opened += 1;
//!         Ok(())
//!     }
//! }
//!
//! let parser = MarkupParser::new(ParseConfig::html());
//! let mut counter = TagCounter::default();
//! parser.parse("<ul><li>a<li>b</ul>", &mut counter).unwrap();
//! assert_eq!(counter.opened, 3);
//! ```

mod balancer;
mod buffer;
mod parser;
mod span;
mod status;
mod text;
mod tokenizer;

pub mod config;
pub mod elements;
pub mod error;
pub mod handler;
pub mod source;

pub use crate::config::{
    AttributeUniqueness, Dialect, ElementBalancing, ParseConfig, ParseSelection, Presence,
    UniqueRoot,
};
pub use crate::error::{ParseError, ParseErrorKind};
pub use crate::handler::{MarkupHandler, NoOpHandler};
pub use crate::parser::MarkupParser;
pub use crate::source::{ReaderSource, TextSource};
pub use crate::span::Partition;
pub use crate::status::ParseStatus;
