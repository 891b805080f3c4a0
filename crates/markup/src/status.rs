//! Mutable back channel between handlers and the parser.
//!
//! A `&mut ParseStatus` is passed to every handler event; directives set on
//! it are observed by the parser before the next artifact is tokenized.

/// Handler-writable parse status.
#[derive(Debug, Default)]
pub struct ParseStatus {
    /// When set, structure recognition is disabled and the tokenizer scans
    /// for an ASCII-case-insensitive literal match of this sequence (e.g.
    /// `</script>`). The parser clears it once the matching close tag has
    /// been emitted.
    pub(crate) limit_sequence: Option<String>,
    /// Elements to synthesize as auto-opens before the next element or text
    /// event, outermost first.
    pub(crate) auto_open: Vec<String>,
    /// Elements to synthesize as auto-closes before the next element or
    /// text event; each name only closes a matching stack top.
    pub(crate) auto_close: Vec<String>,
    /// Suppresses pushing the next open element onto the stack.
    pub(crate) avoid_stacking_open_element: bool,
}

impl ParseStatus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Disable structure recognition until `sequence` is seen.
    pub fn set_limit_sequence(&mut self, sequence: impl Into<String>) {
        self.limit_sequence = Some(sequence.into());
    }

    pub fn limit_sequence(&self) -> Option<&str> {
        self.limit_sequence.as_deref()
    }

    /// Request a synthetic open of `name` before the next element or text.
    pub fn request_auto_open(&mut self, name: impl Into<String>) {
        self.auto_open.push(name.into());
    }

    /// Request a synthetic close of `name` (only honored while `name` is on
    /// top of the open-element stack).
    pub fn request_auto_close(&mut self, name: impl Into<String>) {
        self.auto_close.push(name.into());
    }

    /// Keep the next open element off the stack.
    pub fn avoid_stacking_open_element(&mut self) {
        self.avoid_stacking_open_element = true;
    }

    pub(crate) fn clear_limit(&mut self) {
        self.limit_sequence = None;
    }

    pub(crate) fn take_auto_open(&mut self) -> Vec<String> {
        std::mem::take(&mut self.auto_open)
    }

    pub(crate) fn take_auto_close(&mut self) -> Vec<String> {
        std::mem::take(&mut self.auto_close)
    }

    pub(crate) fn take_avoid_stacking(&mut self) -> bool {
        std::mem::take(&mut self.avoid_stacking_open_element)
    }
}
