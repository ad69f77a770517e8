//! Marker assignment on pre-drawn bracket templates
//!
//! A template image for n entrants carries two kinds of detected markers:
//! slot markers (the coloured dots where an entrant's line starts) and line
//! markers (the far end of each entrant's line). Each slot, taken top to
//! bottom, claims the nearest unclaimed line end.

use crate::bracket::Point;

/// Placement constants for template labels
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Lines shorter than this get a fixed label offset
    pub min_line_length: f64,
    /// Horizontal label offset from the slot for short lines
    pub fixed_offset: f64,
    /// Where along a long line the label is centred
    pub line_fraction: f64,
    /// Minimum distance between the slot and the label's left edge
    pub min_left: f64,
    /// Space between the label's bottom and its line
    pub vertical_padding: f64,
    /// Length of the line assumed when none was detected
    pub virtual_line_length: f64,
    /// Slot markers derived from line markers sit this far left of them
    pub marker_shift: f64,
    pub font_size: f64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            min_line_length: 50.0,
            fixed_offset: 60.0,
            line_fraction: 0.7,
            min_left: 20.0,
            vertical_padding: 10.0,
            virtual_line_length: 400.0,
            marker_shift: 10.0,
            font_size: 14.0,
        }
    }
}

impl TemplateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_line_fraction(mut self, fraction: f64) -> Self {
        self.line_fraction = fraction;
        self
    }

    pub fn with_virtual_line_length(mut self, length: f64) -> Self {
        self.virtual_line_length = length;
        self
    }

    /// Approximate rendered width: ~0.6 * font_size per character
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * 0.6
    }

    pub fn text_height(&self) -> f64 {
        self.font_size
    }
}

/// A slot paired with the end of its line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerAssignment {
    pub slot: Point,
    pub line_end: Point,
}

impl MarkerAssignment {
    pub fn line_length(&self) -> f64 {
        self.line_end.x - self.slot.x
    }
}

fn by_position(a: &Point, b: &Point) -> std::cmp::Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}

/// Pair up to `count` slots with line ends.
///
/// Without slot markers, slots are derived from the line markers. When there
/// are fewer slots than needed, the first line marker supplies the rest.
/// Without line markers, each slot gets a virtual line. The result may be
/// shorter than `count` when the template has too few markers.
pub fn assign_markers(
    count: usize,
    slot_markers: &[Point],
    line_markers: &[Point],
    config: &TemplateConfig,
) -> Vec<MarkerAssignment> {
    let count = count.min(slot_markers.len().max(line_markers.len()));
    let shifted = |p: &Point| Point::new(p.x - config.marker_shift, p.y);

    let mut slots: Vec<Point> = if slot_markers.is_empty() {
        line_markers.iter().map(shifted).collect()
    } else {
        slot_markers.to_vec()
    };
    if let Some(first_line) = line_markers.first() {
        while slots.len() < count {
            slots.push(shifted(first_line));
        }
    }
    slots.sort_by(by_position);
    slots.truncate(count);

    let mut remaining: Vec<Point> = line_markers.to_vec();
    slots
        .into_iter()
        .map(|slot| {
            let virtual_end = Point::new(slot.x + config.virtual_line_length, slot.y);
            let mut best: Option<(usize, f64)> = None;
            for (index, line) in remaining.iter().enumerate() {
                let distance = slot.distance_sq(*line);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((index, distance));
                }
            }
            let line_end = match best {
                Some((index, _)) => remaining.remove(index),
                None => virtual_end,
            };
            MarkerAssignment { slot, line_end }
        })
        .collect()
}

/// Top-left corner of a label along its assigned line
pub fn place_label(assignment: &MarkerAssignment, text: &str, config: &TemplateConfig) -> Point {
    let MarkerAssignment { slot, line_end } = *assignment;
    let height = config.text_height();
    let length = assignment.line_length();

    if length < config.min_line_length {
        return Point::new(slot.x + config.fixed_offset, slot.y - height / 2.0);
    }

    let centred = slot.x + length * config.line_fraction - config.text_width(text) / 2.0;
    Point::new(
        centred.max(slot.x + config.min_left),
        line_end.y - (height + config.vertical_padding),
    )
}
