//! Open-element stack and HTML auto-balancing decisions.
//!
//! The stack owns its names (the scan buffer shifts underneath partitions),
//! stored as written in the source. All matching folds case according to the
//! active configuration.
//!
//! Balancing itself is decided here as pure data; the parser turns the
//! decisions into synthetic `auto_*` events so that event emission stays in
//! one place.

use crate::elements;
use crate::text;

/// Stack of open elements, top == innermost.
#[derive(Debug, Default)]
pub(crate) struct ElementStack {
    names: Vec<String>,
}

impl ElementStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub(crate) fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub(crate) fn top(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub(crate) fn depth(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index (from the bottom) of the innermost element matching `name`.
    pub(crate) fn find(&self, name: &str, case_sensitive: bool) -> Option<usize> {
        self.names
            .iter()
            .rposition(|open| text::equals(case_sensitive, open, name))
    }
}

/// How a close tag reconciles against the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CloseOutcome {
    /// The stack top matches; pop it.
    Matched,
    /// The element sits `above` levels below the top; auto-close the levels
    /// above it first, then pop the match itself.
    AutoClose { above: usize },
    /// No open element matches; the stack is left untouched.
    Unmatched,
}

pub(crate) fn close_outcome(
    stack: &ElementStack,
    name: &str,
    case_sensitive: bool,
) -> CloseOutcome {
    match stack.find(name, case_sensitive) {
        Some(index) => {
            let above = stack.depth() - 1 - index;
            if above == 0 {
                CloseOutcome::Matched
            } else {
                CloseOutcome::AutoClose { above }
            }
        }
        None => CloseOutcome::Unmatched,
    }
}

/// Number of stack tops implicitly closed by opening `incoming`, applying
/// the registry's optional-close rules to a fixed point.
pub(crate) fn implicit_closes(stack: &ElementStack, incoming: &str) -> usize {
    let mut count = 0;
    while let Some(top) = stack
        .depth()
        .checked_sub(count + 1)
        .map(|index| stack.names[index].as_str())
    {
        if elements::closes_on_open(incoming, top) {
            count += 1;
        } else {
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(names: &[&str]) -> ElementStack {
        let mut stack = ElementStack::new();
        for name in names {
            stack.push(name);
        }
        stack
    }

    #[test]
    fn close_outcome_distinguishes_match_depth() {
        let stack = stack_of(&["ul", "li", "b"]);
        assert_eq!(close_outcome(&stack, "b", false), CloseOutcome::Matched);
        assert_eq!(
            close_outcome(&stack, "ul", false),
            CloseOutcome::AutoClose { above: 2 }
        );
        assert_eq!(close_outcome(&stack, "p", false), CloseOutcome::Unmatched);
    }

    #[test]
    fn close_matching_respects_case_configuration() {
        let stack = stack_of(&["DIV"]);
        assert_eq!(close_outcome(&stack, "div", false), CloseOutcome::Matched);
        assert_eq!(close_outcome(&stack, "div", true), CloseOutcome::Unmatched);
    }

    #[test]
    fn implicit_closes_reach_a_fixed_point() {
        // A new <tbody> while inside <tbody><tr><td> unwinds all three.
        let stack = stack_of(&["table", "tbody", "tr", "td"]);
        assert_eq!(implicit_closes(&stack, "tbody"), 3);
        // A sibling <li> closes only the open <li>.
        let list = stack_of(&["ul", "li"]);
        assert_eq!(implicit_closes(&list, "li"), 1);
        assert_eq!(implicit_closes(&list, "span"), 0);
    }

    #[test]
    fn implicit_closes_stop_at_non_matching_ancestors() {
        let stack = stack_of(&["div", "p"]);
        assert_eq!(implicit_closes(&stack, "section"), 1);
        let nested = stack_of(&["p", "b"]);
        // The formatting top shields the paragraph.
        assert_eq!(implicit_closes(&nested, "div"), 0);
    }
}
