//! # SVG Surface
//!
//! A headless [`SceneBuilder`] that accumulates SVG elements in memory.
//!
//! ```rust
//! use pickup_core::{render, RenderOptions, SvgSurface};
//!
//! let mut svg = SvgSurface::new();
//! render(&mut svg, "4006381333931", &RenderOptions::default()).unwrap();
//!
//! let markup = svg.to_markup();
//! assert!(markup.starts_with("<svg "));
//! assert!(markup.contains(r#"role="img""#));
//! ```

use std::fmt::Write as _;

use crate::render::{Rect, SceneBuilder, TextLabel};

/// SVG namespace for standalone documents.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// In-memory SVG scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    label: Option<String>,
    elements: Vec<String>,
}

impl SvgSurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Description exposed to assistive technology, if any.
    pub fn accessible_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of drawn elements (rects and texts).
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// True when nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Attributes for the root `<svg>` element, in emission order.
    pub fn root_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("width", fmt_num(self.width)),
            ("height", fmt_num(self.height)),
            (
                "viewBox",
                format!("0 0 {} {}", fmt_num(self.width), fmt_num(self.height)),
            ),
        ];
        if let Some(label) = &self.label {
            attrs.push(("role", "img".to_string()));
            attrs.push(("aria-label", label.clone()));
        }
        attrs
    }

    /// Children of the root element: `<title>` then the drawn elements.
    pub fn body(&self) -> String {
        let mut out = String::new();
        if let Some(label) = &self.label {
            let _ = write!(out, "<title>{}</title>", escape_xml(label));
        }
        for element in &self.elements {
            out.push_str(element);
        }
        out
    }

    /// Serializes a standalone `<svg>` document.
    pub fn to_markup(&self) -> String {
        let mut out = format!(r#"<svg xmlns="{SVG_NAMESPACE}""#);
        for (name, value) in self.root_attributes() {
            let _ = write!(out, r#" {}="{}""#, name, escape_xml(&value));
        }
        out.push('>');
        out.push_str(&self.body());
        out.push_str("</svg>");
        out
    }
}

impl SceneBuilder for SvgSurface {
    fn clear(&mut self) {
        self.width = 0.0;
        self.height = 0.0;
        self.label = None;
        self.elements.clear();
    }

    fn set_dimensions(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn set_accessible_label(&mut self, label: &str) {
        self.label = Some(label.to_string());
    }

    fn add_rect(&mut self, rect: &Rect) {
        let mut element = format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.width),
            fmt_num(rect.height),
            rect.fill.as_css(),
        );
        if rect.crisp {
            element.push_str(r#" shape-rendering="crispEdges""#);
        }
        element.push_str("/>");
        self.elements.push(element);
    }

    fn add_text(&mut self, text: &TextLabel) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="{}" font-size="{}" fill="{}">{}</text>"#,
            fmt_num(text.x),
            fmt_num(text.y),
            escape_xml(&text.font_family),
            text.font_size,
            text.fill.as_css(),
            escape_xml(&text.text),
        ));
    }
}

/// Formats a coordinate without a trailing `.0` for whole numbers.
fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Escapes text for use in XML content and double-quoted attributes.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, RenderOptions};

    #[test]
    fn test_empty_surface() {
        let svg = SvgSurface::new();
        assert!(svg.is_empty());
        assert_eq!(svg.accessible_label(), None);
        assert_eq!(
            svg.to_markup(),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="0" height="0" viewBox="0 0 0 0"></svg>"#
        );
    }

    #[test]
    fn test_rendered_markup() {
        let mut svg = SvgSurface::new();
        let symbol = render(&mut svg, "4006381333931", &RenderOptions::default()).unwrap();

        assert_eq!(svg.width(), 230.0);
        assert_eq!(svg.height(), 78.0);
        assert_eq!(svg.element_count(), symbol.bars.len() + 2);
        assert_eq!(svg.accessible_label(), Some("EAN-13 4006381333931"));

        let markup = svg.to_markup();
        assert!(markup.contains(r#"width="230" height="78" viewBox="0 0 230 78""#));
        assert!(markup.contains(r#"aria-label="EAN-13 4006381333931""#));
        assert!(markup.contains("<title>EAN-13 4006381333931</title>"));
        assert!(markup.contains(r##"<rect x="0" y="0" width="230" height="78" fill="#ffffff"/>"##));
        assert!(markup.contains(
            r##"<rect x="20" y="0" width="2" height="60" fill="#000000" shape-rendering="crispEdges"/>"##
        ));
        assert!(markup.contains(
            r##"<text x="115" y="74" text-anchor="middle" font-family="monospace" font-size="12" fill="#000000">4006381333931</text>"##
        ));
        assert_eq!(markup.matches("crispEdges").count(), symbol.bars.len());
    }

    #[test]
    fn test_background_precedes_bars() {
        let mut svg = SvgSurface::new();
        render(&mut svg, "4006381333931", &RenderOptions::default()).unwrap();
        let markup = svg.to_markup();
        let background = markup.find("#ffffff").unwrap();
        let first_bar = markup.find("crispEdges").unwrap();
        assert!(background < first_bar);
    }

    #[test]
    fn test_rerender_does_not_accumulate() {
        let mut svg = SvgSurface::new();
        render(&mut svg, "4006381333931", &RenderOptions::default()).unwrap();
        let first = svg.to_markup();
        render(&mut svg, "4006381333931", &RenderOptions::default()).unwrap();
        assert_eq!(svg.to_markup(), first);
    }

    #[test]
    fn test_odd_width_centers_on_half_pixel() {
        let mut svg = SvgSurface::new();
        let options = RenderOptions { module: 1, height: 40, margin: Some(10) };
        render(&mut svg, "4006381333931", &options).unwrap();
        assert!(svg.to_markup().contains(r#"<text x="57.5" y="54""#));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_xml("4006381333931"), "4006381333931");
    }
}
