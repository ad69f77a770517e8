//! SVG renderer for bracket layouts
//!
//! Takes a BracketLayout from either layout backend and produces an SVG
//! string with CSS classes for styling.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, render_svg_with_backdrop, Backdrop, SvgBuilder};
