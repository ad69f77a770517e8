//! Geometry constants for bracket layout

/// Configuration options for bracket layout computation
#[derive(Debug, Clone, PartialEq)]
pub struct BracketConfig {
    /// Entrant box size (width, height)
    pub box_size: (f64, f64),

    /// Vertical space between consecutive first-round boxes
    pub vertical_gap: f64,

    /// Horizontal distance between the merge columns of two rounds
    pub round_offset: f64,

    /// Top-left corner of the first box
    pub origin: (f64, f64),

    /// Extra vertical offset for an odd last entrant that receives a bye
    pub bye_offset: f64,

    /// Length of the line leaving the final merge point
    pub forward_length: f64,

    /// Labels longer than this are truncated
    pub label_limit: usize,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            box_size: (260.0, 36.0),
            vertical_gap: 24.0,
            round_offset: 60.0,
            origin: (40.0, 80.0),
            bye_offset: 30.0,
            forward_length: 80.0,
            label_limit: 50,
        }
    }
}

impl BracketConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entrant box size
    pub fn with_box_size(mut self, width: f64, height: f64) -> Self {
        self.box_size = (width, height);
        self
    }

    /// Set the vertical gap between boxes
    pub fn with_vertical_gap(mut self, gap: f64) -> Self {
        self.vertical_gap = gap;
        self
    }

    /// Set the per-round horizontal offset
    pub fn with_round_offset(mut self, offset: f64) -> Self {
        self.round_offset = offset;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    pub fn with_bye_offset(mut self, offset: f64) -> Self {
        self.bye_offset = offset;
        self
    }

    pub fn with_forward_length(mut self, length: f64) -> Self {
        self.forward_length = length;
        self
    }

    /// Set the label length above which labels are truncated
    pub fn with_label_limit(mut self, limit: usize) -> Self {
        self.label_limit = limit;
        self
    }

    /// Distance between the tops of two consecutive boxes
    pub fn pitch(&self) -> f64 {
        self.box_size.1 + self.vertical_gap
    }
}
