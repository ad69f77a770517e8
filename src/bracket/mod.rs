//! Bracket geometry
//!
//! Turns an ordered list of entrants sharing a category into a seeding tree
//! and a layout of boxes and connector lines that a renderer can draw.

pub mod config;
pub mod draw;
pub mod engine;
pub mod label;
pub mod types;

pub use config::BracketConfig;
pub use draw::DrawNode;
pub use engine::{BracketDraw, BracketEngine};
pub use label::{truncate_label, Entrant};
pub use types::*;

/// Anything that can place entrants for a renderer
pub trait LayoutBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Layout for the entrants in order; `None` when this backend cannot
    /// lay them out
    fn layout(&self, entrants: &[Entrant]) -> Option<BracketLayout>;
}

impl LayoutBackend for BracketEngine {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn layout(&self, entrants: &[Entrant]) -> Option<BracketLayout> {
        BracketEngine::layout(self, entrants)
    }
}
