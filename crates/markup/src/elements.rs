//! Static HTML element registry.
//!
//! Keyed by lowercase element name; consulted only when the configured
//! dialect is HTML. XML treats every element uniformly (no voids, no
//! implicit closes, no raw-text bodies).
//!
//! The `closes_on_open` sets encode the HTML5 "optional tags" rules as a
//! pure function of (incoming name, stack top): while the stack top is in
//! the incoming element's set, the top is implicitly closed. Rules that
//! would need more context than the stack top are approximated by that
//! function on purpose.

/// Metadata for one HTML element name.
#[derive(Debug)]
pub struct ElementSpec {
    pub name: &'static str,
    /// Never has a body (`<br>`, `<img>`, ...).
    pub void: bool,
    /// Body is opaque until a literal `</name>` closer (`script`, `style`).
    pub raw_text: bool,
    /// Raw-text body in which character references would be honored by a
    /// decoding consumer (`textarea`, `title`); tokenized like raw text.
    pub escapable_raw_text: bool,
    pub block: bool,
    pub formatting: bool,
    /// Stack-top names implicitly closed when this element opens.
    pub closes_on_open: &'static [&'static str],
}

impl ElementSpec {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            void: false,
            raw_text: false,
            escapable_raw_text: false,
            block: false,
            formatting: false,
            closes_on_open: &[],
        }
    }

    const fn void(mut self) -> Self {
        self.void = true;
        self
    }

    const fn raw_text(mut self) -> Self {
        self.raw_text = true;
        self
    }

    const fn escapable(mut self) -> Self {
        self.escapable_raw_text = true;
        self
    }

    const fn block(mut self) -> Self {
        self.block = true;
        self
    }

    const fn formatting(mut self) -> Self {
        self.formatting = true;
        self
    }

    const fn closes(mut self, set: &'static [&'static str]) -> Self {
        self.closes_on_open = set;
        self
    }
}

const P: &[&str] = &["p"];
const LI: &[&str] = &["li"];
const DT_DD: &[&str] = &["dt", "dd"];
const RT_RP: &[&str] = &["rt", "rp"];
const OPTION: &[&str] = &["option"];
const OPTION_OPTGROUP: &[&str] = &["option", "optgroup"];
const CELLS: &[&str] = &["td", "th"];
const ROW_PARTS: &[&str] = &["td", "th", "tr"];
const SECTION_PARTS: &[&str] = &[
    "caption", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Registry table, sorted by name for binary search.
static ELEMENTS: &[ElementSpec] = &[
    ElementSpec::new("a").formatting(),
    ElementSpec::new("address").block().closes(P),
    ElementSpec::new("area").void(),
    ElementSpec::new("article").block().closes(P),
    ElementSpec::new("aside").block().closes(P),
    ElementSpec::new("b").formatting(),
    ElementSpec::new("base").void(),
    ElementSpec::new("big").formatting(),
    ElementSpec::new("blockquote").block().closes(P),
    ElementSpec::new("body").closes(&["head"]),
    ElementSpec::new("br").void(),
    ElementSpec::new("caption").closes(SECTION_PARTS),
    ElementSpec::new("code").formatting(),
    ElementSpec::new("col").void(),
    ElementSpec::new("colgroup").closes(&["caption", "colgroup"]),
    ElementSpec::new("dd").block().closes(DT_DD),
    ElementSpec::new("details").block().closes(P),
    ElementSpec::new("div").block().closes(P),
    ElementSpec::new("dl").block().closes(P),
    ElementSpec::new("dt").block().closes(DT_DD),
    ElementSpec::new("em").formatting(),
    ElementSpec::new("embed").void(),
    ElementSpec::new("fieldset").block().closes(P),
    ElementSpec::new("figcaption").block().closes(P),
    ElementSpec::new("figure").block().closes(P),
    ElementSpec::new("font").formatting(),
    ElementSpec::new("footer").block().closes(P),
    ElementSpec::new("form").block().closes(P),
    ElementSpec::new("h1").block().closes(P),
    ElementSpec::new("h2").block().closes(P),
    ElementSpec::new("h3").block().closes(P),
    ElementSpec::new("h4").block().closes(P),
    ElementSpec::new("h5").block().closes(P),
    ElementSpec::new("h6").block().closes(P),
    ElementSpec::new("head"),
    ElementSpec::new("header").block().closes(P),
    ElementSpec::new("hgroup").block().closes(P),
    ElementSpec::new("hr").void().block().closes(P),
    ElementSpec::new("html"),
    ElementSpec::new("i").formatting(),
    ElementSpec::new("img").void(),
    ElementSpec::new("input").void(),
    ElementSpec::new("li").block().closes(LI),
    ElementSpec::new("link").void(),
    ElementSpec::new("main").block().closes(P),
    ElementSpec::new("menu").block().closes(P),
    ElementSpec::new("meta").void(),
    ElementSpec::new("nav").block().closes(P),
    ElementSpec::new("nobr").formatting(),
    ElementSpec::new("ol").block().closes(P),
    ElementSpec::new("optgroup").closes(OPTION_OPTGROUP),
    ElementSpec::new("option").closes(OPTION),
    ElementSpec::new("p").block().closes(P),
    ElementSpec::new("param").void(),
    ElementSpec::new("pre").block().closes(P),
    ElementSpec::new("rp").closes(RT_RP),
    ElementSpec::new("rt").closes(RT_RP),
    ElementSpec::new("s").formatting(),
    ElementSpec::new("script").raw_text(),
    ElementSpec::new("section").block().closes(P),
    ElementSpec::new("small").formatting(),
    ElementSpec::new("source").void(),
    ElementSpec::new("strike").formatting(),
    ElementSpec::new("strong").formatting(),
    ElementSpec::new("style").raw_text(),
    ElementSpec::new("summary").block(),
    ElementSpec::new("table").block().closes(P),
    ElementSpec::new("tbody").closes(SECTION_PARTS),
    ElementSpec::new("td").closes(CELLS),
    ElementSpec::new("textarea").escapable(),
    ElementSpec::new("tfoot").closes(SECTION_PARTS),
    ElementSpec::new("th").closes(CELLS),
    ElementSpec::new("thead").closes(SECTION_PARTS),
    ElementSpec::new("title").escapable(),
    ElementSpec::new("tr").closes(ROW_PARTS),
    ElementSpec::new("track").void(),
    ElementSpec::new("tt").formatting(),
    ElementSpec::new("u").formatting(),
    ElementSpec::new("ul").block().closes(P),
    ElementSpec::new("wbr").void(),
];

fn fold_cmp(name: &str, entry: &'static str) -> std::cmp::Ordering {
    let a = name.as_bytes().iter().map(u8::to_ascii_lowercase);
    let b = entry.bytes();
    a.cmp(b)
}

/// Look up an element by name, folding ASCII case.
pub fn lookup(name: &str) -> Option<&'static ElementSpec> {
    ELEMENTS
        .binary_search_by(|entry| fold_cmp(name, entry.name).reverse())
        .ok()
        .map(|index| &ELEMENTS[index])
}

pub fn is_void(name: &str) -> bool {
    lookup(name).is_some_and(|spec| spec.void)
}

/// Raw-text and escapable-raw-text bodies both scan for a literal closer.
pub fn has_opaque_body(name: &str) -> bool {
    lookup(name).is_some_and(|spec| spec.raw_text || spec.escapable_raw_text)
}

/// True when opening `incoming` implicitly closes a stack top of `top`.
pub fn closes_on_open(incoming: &str, top: &str) -> bool {
    lookup(incoming).is_some_and(|spec| {
        spec.closes_on_open
            .iter()
            .any(|name| name.eq_ignore_ascii_case(top))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_lookup_finds_every_entry() {
        for pair in ELEMENTS.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "registry must stay sorted: {} >= {}",
                pair[0].name,
                pair[1].name
            );
        }
        for entry in ELEMENTS {
            assert!(lookup(entry.name).is_some(), "lookup missed {}", entry.name);
        }
    }

    #[test]
    fn lookup_folds_ascii_case() {
        assert!(lookup("BR").is_some_and(|spec| spec.void));
        assert!(lookup("ScRiPt").is_some_and(|spec| spec.raw_text));
        assert!(lookup("no-such-element").is_none());
    }

    #[test]
    fn flags_are_mutually_consistent() {
        for entry in ELEMENTS {
            assert!(
                !(entry.void && (entry.raw_text || entry.escapable_raw_text)),
                "{} cannot be void and carry a body",
                entry.name
            );
            assert!(
                !(entry.raw_text && entry.escapable_raw_text),
                "{} cannot be raw-text and escapable at once",
                entry.name
            );
            assert!(
                !entry.void || entry.closes_on_open.is_empty() || entry.name == "hr",
                "unexpected optional-close set on void element {}",
                entry.name
            );
        }
    }

    #[test]
    fn optional_close_rules_cover_the_list_and_table_cases() {
        assert!(closes_on_open("li", "li"));
        assert!(closes_on_open("dd", "dt"));
        assert!(closes_on_open("div", "p"));
        assert!(closes_on_open("tr", "td"));
        assert!(closes_on_open("tbody", "tr"));
        assert!(!closes_on_open("li", "ul"));
        assert!(!closes_on_open("span", "p"));
        // Case folding applies to both sides.
        assert!(closes_on_open("LI", "Li"));
    }
}
