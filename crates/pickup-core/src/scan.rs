//! # Page Scanner
//!
//! Finds barcode placeholders in a document and renders each one.
//!
//! ## Placeholder Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Per-Placeholder Decision                            │
//! │                                                                         │
//! │  data-symbology = ean13 ?  ── no ──► ignored (not ours)                │
//! │        │ yes                                                            │
//! │        ▼                                                                │
//! │  data-value is 12 digits ? ── yes ─► append check digit,               │
//! │        │                             write it back to data-value       │
//! │        ▼                                                                │
//! │  data-value is 13 digits ? ── no ──► skipped, left untouched           │
//! │        │ yes                                                            │
//! │        ▼                                                                │
//! │  render(surface, value, RenderOptions::default())                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A bad placeholder never stops the scan; the rest of the page still
//! renders. Writing the derived 13-digit value back keeps repeated scans
//! stable.
//!
//! ## HTML Documents
//! [`HtmlPage`] treats every `<svg data-symbology="ean13" data-value="...">`
//! element of an HTML string as a placeholder:
//!
//! ```rust
//! use pickup_core::scan::HtmlPage;
//!
//! let (page, report) = HtmlPage::load(
//!     r#"<p>Order 17</p><svg data-symbology="ean13" data-value="400638133393"></svg>"#,
//! );
//! assert_eq!(report.rendered, 1);
//! assert!(page.to_html().contains(r#"data-value="4006381333931""#));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ean13::PAYLOAD_LENGTH;
use crate::render::{render, RenderOptions, SceneBuilder};
use crate::svg::SvgSurface;
use crate::token::PickupToken;

/// Attribute naming the symbology of a placeholder.
pub const SYMBOLOGY_ATTRIBUTE: &str = "data-symbology";

/// Attribute carrying the 12- or 13-digit token.
pub const VALUE_ATTRIBUTE: &str = "data-value";

/// Root attributes owned by the renderer; replaced on every render.
const RENDERED_ATTRIBUTES: [&str; 6] =
    ["xmlns", "width", "height", "viewBox", "role", "aria-label"];

// =============================================================================
// Document Traits
// =============================================================================

/// One element that may receive a symbol.
pub trait Placeholder {
    /// Value of the symbology marker, if present.
    fn symbology(&self) -> Option<&str>;

    /// The data token as written in the document.
    fn value(&self) -> Option<&str>;

    /// Persists a new data token onto the element.
    fn set_value(&mut self, value: &str);

    /// The surface the symbol is drawn on.
    fn surface(&mut self) -> &mut dyn SceneBuilder;
}

/// A document holding placeholders.
pub trait Document {
    /// Calls `visit` once for every candidate placeholder, in document order.
    fn for_each_placeholder(&mut self, visit: &mut dyn FnMut(&mut dyn Placeholder));
}

/// True for the markers this crate renders (`ean13`, `EAN-13`, ...).
pub fn is_ean13_marker(symbology: &str) -> bool {
    let symbology = symbology.trim();
    symbology.eq_ignore_ascii_case("ean13") || symbology.eq_ignore_ascii_case("ean-13")
}

// =============================================================================
// Scan Report
// =============================================================================

/// Counts from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Placeholders carrying an EAN-13 marker.
    pub discovered: usize,
    /// Symbols drawn.
    pub rendered: usize,
    /// 12-digit values completed with a check digit.
    pub derived: usize,
    /// Placeholders left untouched.
    pub skipped: usize,
}

// =============================================================================
// Scanning
// =============================================================================

/// Scans a document and renders every EAN-13 placeholder with default options.
pub fn scan_document(document: &mut dyn Document) -> ScanReport {
    scan_document_with(document, &RenderOptions::default())
}

/// Scans a document with explicit render options.
pub fn scan_document_with(document: &mut dyn Document, options: &RenderOptions) -> ScanReport {
    let mut report = ScanReport::default();

    document.for_each_placeholder(&mut |placeholder: &mut dyn Placeholder| {
        if !placeholder.symbology().is_some_and(is_ean13_marker) {
            return;
        }
        report.discovered += 1;

        let raw = placeholder.value().unwrap_or_default().trim().to_string();

        let token = match PickupToken::complete(&raw) {
            Ok(token) => token,
            Err(err) => {
                debug!(value = %raw, error = %err, "Skipping placeholder without a token");
                report.skipped += 1;
                return;
            }
        };

        if raw.len() == PAYLOAD_LENGTH {
            placeholder.set_value(token.as_str());
            report.derived += 1;
            debug!(payload = %raw, token = %token, "Derived check digit for placeholder");
        }

        match render(placeholder.surface(), token.as_str(), options) {
            Ok(_) => report.rendered += 1,
            Err(err) => {
                debug!(token = %token, error = %err, "Skipping placeholder that failed to render");
                report.skipped += 1;
            }
        }
    });

    info!(
        discovered = report.discovered,
        rendered = report.rendered,
        derived = report.derived,
        skipped = report.skipped,
        "Placeholder scan complete"
    );

    report
}

// =============================================================================
// HTML Page
// =============================================================================

/// An `<svg ...>`, `<svg .../>` or `</svg>` tag; quoted values may contain `>`.
static SVG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<(/?)svg\b((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#).expect("valid svg tag regex")
});

/// `name="value"`, `name='value'`, `name=value` or a bare `name`.
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
    .expect("valid attribute regex")
});

/// A placeholder `<svg>` element inside an [`HtmlPage`].
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlPlaceholder {
    original: String,
    inner: String,
    attributes: Vec<(String, String)>,
    surface: SvgSurface,
    touched: bool,
}

impl HtmlPlaceholder {
    fn parse(original: &str, attribute_text: &str, inner: &str) -> Self {
        let attributes = ATTRIBUTE
            .captures_iter(attribute_text)
            .map(|caps| {
                let name = caps[1].to_string();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (name, value)
            })
            .collect();

        HtmlPlaceholder {
            original: original.to_string(),
            inner: inner.to_string(),
            attributes,
            surface: SvgSurface::new(),
            touched: false,
        }
    }

    /// Looks up an attribute (names are case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The drawn symbol, empty until rendered.
    pub fn svg(&self) -> &SvgSurface {
        &self.surface
    }

    /// True when a symbol has been drawn.
    pub fn is_rendered(&self) -> bool {
        !self.surface.is_empty()
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn to_html(&self) -> String {
        if !self.touched {
            return self.original.clone();
        }

        let rendered = self.is_rendered();
        let mut out = String::from("<svg");
        for (name, value) in &self.attributes {
            if rendered && RENDERED_ATTRIBUTES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
                continue;
            }
            push_attribute(&mut out, name, value);
        }

        if rendered {
            for (name, value) in self.surface.root_attributes() {
                push_attribute(&mut out, name, &value);
            }
            out.push('>');
            out.push_str(&self.surface.body());
        } else {
            out.push('>');
            out.push_str(&self.inner);
        }
        out.push_str("</svg>");
        out
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&value.replace('"', "&quot;"));
    out.push('"');
}

impl Placeholder for HtmlPlaceholder {
    fn symbology(&self) -> Option<&str> {
        self.attribute(SYMBOLOGY_ATTRIBUTE)
    }

    fn value(&self) -> Option<&str> {
        self.attribute(VALUE_ATTRIBUTE)
    }

    fn set_value(&mut self, value: &str) {
        self.touched = true;
        self.set_attribute(VALUE_ATTRIBUTE, value);
    }

    fn surface(&mut self) -> &mut dyn SceneBuilder {
        self.touched = true;
        &mut self.surface
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Placeholder(HtmlPlaceholder),
}

/// An HTML document whose EAN-13 `<svg>` placeholders can be rendered in place.
///
/// Everything outside placeholder elements is preserved byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlPage {
    segments: Vec<Segment>,
}

impl HtmlPage {
    /// Splits markup into text and `<svg>` placeholders without rendering.
    ///
    /// An `<svg>` without a symbology marker stays in the text, so
    /// placeholders nested inside it are still found.
    pub fn parse(markup: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        let mut pos = 0;

        while let Some(caps) = SVG_TAG.captures(&markup[pos..]) {
            let Some(tag) = caps.get(0) else { break };
            let (start, open_end) = (pos + tag.start(), pos + tag.end());
            pos = open_end;

            let is_closing = caps.get(1).is_some_and(|m| !m.is_empty());
            if is_closing {
                continue;
            }
            let attribute_text = caps.get(2).map_or("", |m| m.as_str());
            let self_closing = caps.get(3).is_some_and(|m| !m.is_empty());

            let (end, inner) = if self_closing {
                (open_end, "")
            } else {
                match find_closing_tag(markup, open_end) {
                    Some((inner_end, close_end)) => (close_end, &markup[open_end..inner_end]),
                    None => continue,
                }
            };

            let placeholder = HtmlPlaceholder::parse(&markup[start..end], attribute_text, inner);
            if placeholder.attribute(SYMBOLOGY_ATTRIBUTE).is_none() {
                continue;
            }

            if start > last {
                segments.push(Segment::Text(markup[last..start].to_string()));
            }
            segments.push(Segment::Placeholder(placeholder));
            last = end;
            pos = end;
        }

        if last < markup.len() {
            segments.push(Segment::Text(markup[last..].to_string()));
        }

        HtmlPage { segments }
    }

    /// Parses markup and runs the document-ready scan.
    pub fn load(markup: &str) -> (Self, ScanReport) {
        let mut page = Self::parse(markup);
        let report = page.rescan();
        (page, report)
    }

    /// Re-renders every placeholder with default options.
    pub fn rescan(&mut self) -> ScanReport {
        scan_document(self)
    }

    /// Re-renders every placeholder with explicit options.
    pub fn rescan_with(&mut self, options: &RenderOptions) -> ScanReport {
        scan_document_with(self, options)
    }

    /// Placeholders in document order.
    pub fn placeholders(&self) -> impl Iterator<Item = &HtmlPlaceholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(p) => Some(p),
            Segment::Text(_) => None,
        })
    }

    /// Serializes the page with rendered placeholders.
    pub fn to_html(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Placeholder(p) => p.to_html(),
            })
            .collect()
    }
}

impl Document for HtmlPage {
    fn for_each_placeholder(&mut self, visit: &mut dyn FnMut(&mut dyn Placeholder)) {
        for segment in &mut self.segments {
            if let Segment::Placeholder(placeholder) = segment {
                visit(placeholder);
            }
        }
    }
}

/// Finds the `</svg>` matching an element whose open tag ends at `from`.
///
/// Returns `(inner_end, close_end)`.
fn find_closing_tag(markup: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    for caps in SVG_TAG.captures_iter(&markup[from..]) {
        let tag = caps.get(0)?;
        if caps.get(1).is_some_and(|m| !m.is_empty()) {
            depth -= 1;
            if depth == 0 {
                return Some((from + tag.start(), from + tag.end()));
            }
        } else if caps.get(3).map_or(true, |m| m.is_empty()) {
            depth += 1;
        }
    }
    None
}

/// Renders every placeholder in `markup` and returns the new markup.
pub fn render_page(markup: &str) -> (String, ScanReport) {
    let (page, report) = HtmlPage::load(markup);
    (page.to_html(), report)
}

// =============================================================================
// Unit Tests
// =============================================================================
