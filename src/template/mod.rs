//! Template marker backend
//!
//! Places entrants on pre-drawn bracket sheets instead of computing the
//! geometry. A sheet exists per entrant count; entrants are assigned to its
//! markers and the result is expressed as an ordinary [`BracketLayout`], so
//! renderers do not care which backend produced it.

mod markers;
mod registry;

pub use markers::{assign_markers, place_label, MarkerAssignment, TemplateConfig};
pub use registry::{TemplateError, TemplateRegistry, TemplateSpec};

use std::sync::Arc;

use tracing::debug;

use crate::bracket::{
    truncate_label, Accent, BoundingBox, BoxPlacement, BracketLayout, ConnectorKind,
    ConnectorSegment, Entrant, LayoutBackend,
};

/// Lays entrants out on registered templates
#[derive(Debug, Clone)]
pub struct TemplateMarkerEngine {
    registry: Arc<TemplateRegistry>,
    config: TemplateConfig,
    label_limit: usize,
}

impl TemplateMarkerEngine {
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self {
            registry,
            config: TemplateConfig::default(),
            label_limit: 50,
        }
    }

    pub fn with_config(mut self, config: TemplateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_label_limit(mut self, limit: usize) -> Self {
        self.label_limit = limit;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Template used for `count` entrants, if any
    pub fn template_for(&self, count: usize) -> Option<&TemplateSpec> {
        self.registry.get(count)
    }

    /// Layout on the template registered for this many entrants. Entrants
    /// beyond the template's markers are left out.
    pub fn layout_on_template(&self, entrants: &[Entrant]) -> Option<BracketLayout> {
        if entrants.len() < 2 {
            return None;
        }
        let Some(spec) = self.registry.get(entrants.len()) else {
            debug!(count = entrants.len(), "no template for entrant count");
            return None;
        };

        let assignments = assign_markers(
            entrants.len(),
            &spec.slot_markers,
            &spec.line_markers,
            &self.config,
        );
        if assignments.len() < entrants.len() {
            debug!(
                count = entrants.len(),
                placed = assignments.len(),
                "template has fewer markers than entrants"
            );
        }

        let mut boxes = Vec::with_capacity(assignments.len());
        let mut connectors = Vec::with_capacity(assignments.len());
        for (index, (entrant, assignment)) in entrants.iter().zip(&assignments).enumerate() {
            let label = truncate_label(&entrant.label(), self.label_limit);
            let at = place_label(assignment, &label, &self.config);
            boxes.push(BoxPlacement {
                x: at.x,
                y: at.y,
                w: self.config.text_width(&label),
                h: self.config.text_height(),
                label,
                accent: Accent::for_index(index),
                bye: false,
            });
            connectors.push(ConnectorSegment::new(
                assignment.slot,
                assignment.line_end,
                ConnectorKind::Feed,
            ));
        }

        let mut layout = BracketLayout::new(boxes, connectors);
        layout.bounds = BoundingBox::new(0.0, 0.0, spec.width, spec.height);
        Some(layout)
    }
}

impl LayoutBackend for TemplateMarkerEngine {
    fn name(&self) -> &'static str {
        "template"
    }

    fn layout(&self, entrants: &[Entrant]) -> Option<BracketLayout> {
        self.layout_on_template(entrants)
    }
}
