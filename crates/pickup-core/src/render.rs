//! # Symbol Renderer
//!
//! Turns a module pattern into vector geometry and paints it onto a surface.
//!
//! ## Render Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Render Pipeline                                 │
//! │                                                                         │
//! │  token ──► ean13::encode ──► pattern (95 bits)                         │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                      layout(pattern, token, options)   ← PURE          │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                            RenderedSymbol                              │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                       paint(surface, &symbol)                          │
//! │               clear → dimensions → label → bg → bars → text            │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │             dyn SceneBuilder (SvgSurface, canvas, DOM, ...)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Geometry
//! ```text
//!  ◄─ margin ─►◄──────── 95 × module ────────►◄─ margin ─►
//!  ┌──────────────────────────────────────────────────────┐ ▲
//!  │            █ █  ██ █ ▌▐ █ ...  █ ██ █ █              │ │ height
//!  │            █ █  ██ █ ▌▐ █ ...  █ ██ █ █              │ ▼
//!  │                   4006381333931                      │ 18 px label row
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! Painting is idempotent: every call starts with `clear()`, so a surface
//! only ever holds the most recent symbol.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::ean13::{self, CheckDigitPolicy, TOKEN_LENGTH};
use crate::error::{BarcodeError, BarcodeResult};

// =============================================================================
// Layout Constants
// =============================================================================

/// Default width of one module in pixels.
pub const DEFAULT_MODULE_WIDTH: u32 = 2;

/// Default bar height in pixels.
pub const DEFAULT_BAR_HEIGHT: u32 = 60;

/// Quiet zone in modules when no explicit margin is given.
pub const DEFAULT_QUIET_ZONE_MODULES: u32 = 10;

/// Vertical space reserved under the bars for the digits.
pub const LABEL_ROW_HEIGHT: u32 = 18;

/// Baseline of the digits, measured from the top of the bars.
pub const LABEL_BASELINE_OFFSET: u32 = 14;

/// Font size of the human-readable digits.
pub const LABEL_FONT_SIZE: u32 = 12;

/// Font family of the human-readable digits.
pub const LABEL_FONT_FAMILY: &str = "monospace";

// =============================================================================
// Render Options
// =============================================================================

/// Size options for a rendered symbol.
///
/// Field names match the front end's `{ module, height, margin }` object.
///
/// ## Example
/// ```rust
/// use pickup_core::RenderOptions;
///
/// let options = RenderOptions::default();
/// assert_eq!(options.module, 2);
/// assert_eq!(options.height, 60);
/// assert_eq!(options.effective_margin(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct RenderOptions {
    /// Pixels per module (narrowest bar).
    pub module: u32,

    /// Bar height in pixels.
    pub height: u32,

    /// Quiet zone in pixels; `None` means `10 × module`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub margin: Option<u32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            module: DEFAULT_MODULE_WIDTH,
            height: DEFAULT_BAR_HEIGHT,
            margin: None,
        }
    }
}

impl RenderOptions {
    /// Quiet zone actually used, in pixels.
    #[inline]
    pub fn effective_margin(&self) -> u32 {
        self.margin
            .unwrap_or(DEFAULT_QUIET_ZONE_MODULES * self.module)
    }

    /// Rejects zero-sized modules or bars.
    pub fn validate(&self) -> BarcodeResult<()> {
        if self.module == 0 {
            return Err(BarcodeError::invalid_format(
                "module=0",
                "module width must be positive",
            ));
        }
        if self.height == 0 {
            return Err(BarcodeError::invalid_format(
                "height=0",
                "bar height must be positive",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Scene Primitives
// =============================================================================

/// Fill colour of a scene primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Paint {
    /// Opaque white background.
    White,
    /// Opaque black bars and digits.
    Black,
}

impl Paint {
    /// CSS colour literal.
    pub fn as_css(&self) -> &'static str {
        match self {
            Paint::White => "#ffffff",
            Paint::Black => "#000000",
        }
    }
}

/// A filled rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Paint,
    /// Draw with crisp, non-antialiased edges.
    pub crisp: bool,
}

/// A horizontally centered text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TextLabel {
    /// Horizontal center.
    pub x: f64,
    /// Baseline.
    pub y: f64,
    pub text: String,
    pub font_family: String,
    pub font_size: u32,
    pub fill: Paint,
}

/// The complete geometry of one symbol.
///
/// Produced by [`layout`]; nothing in this crate keeps a reference to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RenderedSymbol {
    pub width: f64,
    pub height: f64,
    /// Full-canvas white rectangle, painted first.
    pub background: Rect,
    /// One rectangle per dark module, left to right.
    pub bars: Vec<Rect>,
    pub label: TextLabel,
    /// Machine-readable description, e.g. `EAN-13 4006381333931`.
    pub description: String,
}

// =============================================================================
// Scene Builder
// =============================================================================

/// A drawing surface the renderer can paint on.
///
/// Implement this for whatever target holds the symbol: an SVG string
/// ([`SvgSurface`](crate::svg::SvgSurface)), a DOM node, a raster canvas.
/// The renderer only borrows the surface for the duration of one call.
pub trait SceneBuilder {
    /// Removes everything previously drawn.
    fn clear(&mut self);

    /// Sets the canvas size in pixels.
    fn set_dimensions(&mut self, width: f64, height: f64);

    /// Sets the description exposed to assistive technology.
    fn set_accessible_label(&mut self, label: &str);

    /// Appends a filled rectangle.
    fn add_rect(&mut self, rect: &Rect);

    /// Appends a text run.
    fn add_text(&mut self, text: &TextLabel);
}

// =============================================================================
// Layout
// =============================================================================

/// Computes symbol geometry from a module pattern.
///
/// ## Errors
/// - `InvalidFormat` if the pattern has characters other than `0`/`1`
/// - `InvalidFormat` if the label is not 13 digits
/// - `InvalidFormat` if the options have a zero module width or bar height
pub fn layout(
    pattern: &str,
    label: &str,
    options: &RenderOptions,
) -> BarcodeResult<RenderedSymbol> {
    options.validate()?;
    ean13::parse_digits::<TOKEN_LENGTH>(label)?;
    if pattern.is_empty() || !pattern.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(BarcodeError::invalid_format(
            pattern,
            "module pattern must be a non-empty string of 0 and 1",
        ));
    }

    let module = f64::from(options.module);
    let bar_height = f64::from(options.height);
    let margin = f64::from(options.effective_margin());

    let width = 2.0 * margin + pattern.len() as f64 * module;
    let height = bar_height + f64::from(LABEL_ROW_HEIGHT);

    let mut bars = Vec::with_capacity(pattern.len());
    let mut cursor = margin;
    for bit in pattern.bytes() {
        if bit == b'1' {
            bars.push(Rect {
                x: cursor,
                y: 0.0,
                width: module,
                height: bar_height,
                fill: Paint::Black,
                crisp: true,
            });
        }
        cursor += module;
    }

    Ok(RenderedSymbol {
        width,
        height,
        background: Rect {
            x: 0.0,
            y: 0.0,
            width,
            height,
            fill: Paint::White,
            crisp: false,
        },
        bars,
        label: TextLabel {
            x: width / 2.0,
            y: bar_height + f64::from(LABEL_BASELINE_OFFSET),
            text: label.to_string(),
            font_family: LABEL_FONT_FAMILY.to_string(),
            font_size: LABEL_FONT_SIZE,
            fill: Paint::Black,
        },
        description: format!("EAN-13 {label}"),
    })
}

/// Replays a symbol onto a surface, replacing whatever it held.
pub fn paint(surface: &mut dyn SceneBuilder, symbol: &RenderedSymbol) {
    surface.clear();
    surface.set_dimensions(symbol.width, symbol.height);
    surface.set_accessible_label(&symbol.description);
    surface.add_rect(&symbol.background);
    for bar in &symbol.bars {
        surface.add_rect(bar);
    }
    surface.add_text(&symbol.label);
}

// =============================================================================
// Entry Points
// =============================================================================

/// Encodes `token` and paints it onto `surface` (lenient check digit).
///
/// ## Example
/// ```rust
/// use pickup_core::{render, RenderOptions, SvgSurface};
///
/// let mut surface = SvgSurface::new();
/// let symbol = render(&mut surface, "4006381333931", &RenderOptions::default()).unwrap();
/// assert_eq!(symbol.width, 2.0 * 20.0 + 95.0 * 2.0);
/// assert!(surface.to_markup().contains("EAN-13 4006381333931"));
/// ```
pub fn render(
    surface: &mut dyn SceneBuilder,
    token: &str,
    options: &RenderOptions,
) -> BarcodeResult<RenderedSymbol> {
    render_with(surface, token, options, CheckDigitPolicy::Lenient)
}

/// Like [`render`], with an explicit check-digit policy.
///
/// The surface is left untouched when an error is returned.
pub fn render_with(
    surface: &mut dyn SceneBuilder,
    token: &str,
    options: &RenderOptions,
    policy: CheckDigitPolicy,
) -> BarcodeResult<RenderedSymbol> {
    let pattern = ean13::encode_with(token, policy)?;
    let symbol = layout(&pattern, token, options)?;

    debug!(
        token = %token,
        width = symbol.width,
        height = symbol.height,
        bars = symbol.bars.len(),
        "Rendering EAN-13 symbol"
    );

    paint(surface, &symbol);
    Ok(symbol)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call so tests can check ordering and clearing.
    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<String>,
        rects: usize,
        texts: usize,
    }

    impl SceneBuilder for RecordingSurface {
        fn clear(&mut self) {
            self.ops.clear();
            self.rects = 0;
            self.texts = 0;
        }

        fn set_dimensions(&mut self, width: f64, height: f64) {
            self.ops.push(format!("size {width}x{height}"));
        }

        fn set_accessible_label(&mut self, label: &str) {
            self.ops.push(format!("label {label}"));
        }

        fn add_rect(&mut self, rect: &Rect) {
            self.rects += 1;
            self.ops.push(format!("rect {:?}", rect.fill));
        }

        fn add_text(&mut self, text: &TextLabel) {
            self.texts += 1;
            self.ops.push(format!("text {}", text.text));
        }
    }

    const TOKEN: &str = "4006381333931";

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.module, 2);
        assert_eq!(options.height, 60);
        assert_eq!(options.margin, None);
        assert_eq!(options.effective_margin(), 20);

        let wide = RenderOptions { module: 3, ..Default::default() };
        assert_eq!(wide.effective_margin(), 30);
    }

    #[test]
    fn test_options_validation() {
        assert!(RenderOptions::default().validate().is_ok());
        assert!(RenderOptions { module: 0, ..Default::default() }.validate().is_err());
        assert!(RenderOptions { height: 0, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: RenderOptions = serde_json::from_str(r#"{"module": 3}"#).unwrap();
        assert_eq!(options.module, 3);
        assert_eq!(options.height, 60);
        assert_eq!(options.effective_margin(), 30);

        let options: RenderOptions = serde_json::from_str(r#"{"margin": 4}"#).unwrap();
        assert_eq!(options.effective_margin(), 4);
    }

    #[test]
    fn test_layout_dimensions() {
        let pattern = ean13::encode(TOKEN).unwrap();
        let symbol = layout(&pattern, TOKEN, &RenderOptions::default()).unwrap();
        assert_eq!(symbol.width, 2.0 * 20.0 + 95.0 * 2.0);
        assert_eq!(symbol.height, 60.0 + 18.0);

        let options = RenderOptions { module: 1, height: 40, margin: Some(5) };
        let symbol = layout(&pattern, TOKEN, &options).unwrap();
        assert_eq!(symbol.width, 10.0 + 95.0);
        assert_eq!(symbol.height, 58.0);
    }

    #[test]
    fn test_layout_one_bar_per_dark_module() {
        let pattern = ean13::encode(TOKEN).unwrap();
        let symbol = layout(&pattern, TOKEN, &RenderOptions::default()).unwrap();
        let dark = pattern.bytes().filter(|&b| b == b'1').count();
        assert_eq!(symbol.bars.len(), dark);

        // Start guard "101": bars at module 0 and 2
        assert_eq!(symbol.bars[0].x, 20.0);
        assert_eq!(symbol.bars[1].x, 24.0);
        assert!(symbol.bars.iter().all(|b| b.width == 2.0 && b.height == 60.0));
        assert!(symbol.bars.iter().all(|b| b.fill == Paint::Black && b.crisp));

        // End guard: last bar at the final module
        let last = symbol.bars.last().unwrap();
        assert_eq!(last.x, 20.0 + 94.0 * 2.0);
    }

    #[test]
    fn test_layout_label_and_background() {
        let pattern = ean13::encode(TOKEN).unwrap();
        let symbol = layout(&pattern, TOKEN, &RenderOptions::default()).unwrap();

        assert_eq!(symbol.background.fill, Paint::White);
        assert_eq!(symbol.background.width, symbol.width);
        assert_eq!(symbol.background.height, symbol.height);

        assert_eq!(symbol.label.x, symbol.width / 2.0);
        assert_eq!(symbol.label.y, 74.0);
        assert_eq!(symbol.label.text, TOKEN);
        assert_eq!(symbol.label.font_family, "monospace");
        assert_eq!(symbol.description, "EAN-13 4006381333931");
    }

    #[test]
    fn test_layout_rejects_bad_input() {
        let pattern = ean13::encode(TOKEN).unwrap();
        assert!(layout("10201", TOKEN, &RenderOptions::default()).is_err());
        assert!(layout("", TOKEN, &RenderOptions::default()).is_err());
        assert!(layout(&pattern, "123", &RenderOptions::default()).is_err());
    }

    #[test]
    fn test_render_paints_in_order() {
        let mut surface = RecordingSurface::default();
        let symbol = render(&mut surface, TOKEN, &RenderOptions::default()).unwrap();

        assert_eq!(surface.ops[0], format!("size {}x{}", symbol.width, symbol.height));
        assert_eq!(surface.ops[1], "label EAN-13 4006381333931");
        assert_eq!(surface.ops[2], "rect White");
        assert_eq!(surface.ops.last().unwrap(), &format!("text {TOKEN}"));
        assert_eq!(surface.rects, symbol.bars.len() + 1);
        assert_eq!(surface.texts, 1);
    }

    #[test]
    fn test_render_twice_replaces_content() {
        let mut surface = RecordingSurface::default();
        let first = render(&mut surface, TOKEN, &RenderOptions::default()).unwrap();
        let ops_after_first = surface.ops.clone();
        let second = render(&mut surface, TOKEN, &RenderOptions::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(surface.ops, ops_after_first);
        assert_eq!(surface.rects, first.bars.len() + 1);
    }

    #[test]
    fn test_render_invalid_token_leaves_surface_alone() {
        let mut surface = RecordingSurface::default();
        render(&mut surface, TOKEN, &RenderOptions::default()).unwrap();
        let before = surface.ops.clone();

        let err = render(&mut surface, "12345", &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, BarcodeError::InvalidFormat { .. }));
        assert_eq!(surface.ops, before);
    }

    #[test]
    fn test_render_strict_policy() {
        let mut surface = RecordingSurface::default();
        assert!(render(&mut surface, "4006381333932", &RenderOptions::default()).is_ok());
        assert!(matches!(
            render_with(
                &mut surface,
                "4006381333932",
                &RenderOptions::default(),
                CheckDigitPolicy::Strict
            ),
            Err(BarcodeError::CheckDigitMismatch { .. })
        ));
    }
}
