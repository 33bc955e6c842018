//! # pickup-core: EAN-13 Pickup Tokens for the Cafeteria Counter
//!
//! This crate turns an order's numeric pickup token into a printable EAN-13
//! symbol. Everything here is pure: no database, no network, no files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pickup Barcode Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Order pages / printouts (external collaborator)       │   │
//! │  │     supplies 12- or 13-digit tokens, asks for a symbol          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pickup-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │  ean13   │─►│  render  │─►│   svg    │  │    scan      │   │   │
//! │  │   │ tables   │  │ layout   │  │ surface  │◄─│ placeholders │   │   │
//! │  │   │ encode   │  │ paint    │  │ markup   │  │ HtmlPage     │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │   ┌──────────┐  ┌──────────┐                                    │   │
//! │  │   │  token   │  │  error   │                                    │   │
//! │  │   └──────────┘  └──────────┘                                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ean13`] - Check digit, encoding tables and the 95-module encoder
//! - [`token`] - `PickupToken`, scanner input, random allocation
//! - [`render`] - Symbol geometry and the `SceneBuilder` trait
//! - [`svg`] - Headless SVG surface
//! - [`scan`] - Placeholder discovery and batch rendering
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same token + options = same symbol
//! 2. **Static Tables**: L/G/R codes and the parity plan are constants
//! 3. **Lenient Check Digit**: a wrong 13th digit is logged, never fatal,
//!    unless the caller opts into `CheckDigitPolicy::Strict`
//! 4. **Surfaces Are Borrowed**: a render call owns its surface only while it runs
//!
//! ## Example Usage
//!
//! ```rust
//! use pickup_core::{render, PickupToken, RenderOptions, SvgSurface};
//!
//! let token = PickupToken::complete("400638133393").unwrap();
//! assert_eq!(token.as_str(), "4006381333931");
//!
//! let mut svg = SvgSurface::new();
//! let symbol = render(&mut svg, token.as_str(), &RenderOptions::default()).unwrap();
//! assert_eq!(symbol.width, 230.0);
//! assert_eq!(symbol.height, 78.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod ean13;
pub mod error;
pub mod render;
pub mod scan;
pub mod svg;
pub mod token;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use ean13::{compute_check_digit, encode, encode_with, is_valid, CheckDigitPolicy};
pub use error::{BarcodeError, BarcodeResult};
pub use render::{layout, paint, render, render_with, RenderOptions, RenderedSymbol, SceneBuilder};
pub use scan::{render_page, scan_document, Document, HtmlPage, Placeholder, ScanReport};
pub use svg::SvgSurface;
pub use token::PickupToken;
