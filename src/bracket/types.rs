//! Core types for bracket layouts

use serde::Serialize;

/// A 2D point in the drawing coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point
    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned extent of a layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest box containing both
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    pub fn expand_to_include(&self, point: Point) -> BoundingBox {
        let x = self.x.min(point.x);
        let y = self.y.min(point.y);
        let right = self.right().max(point.x);
        let bottom = self.bottom().max(point.y);
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Corner colour of an entrant box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    /// Even first-round position ("corner A")
    Red,
    /// Odd first-round position ("corner B")
    Blue,
}

impl Accent {
    /// Accent for a first-round position
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Accent::Red
        } else {
            Accent::Blue
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Red => "red",
            Accent::Blue => "blue",
        }
    }
}

/// One entrant box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlacement {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub label: String,
    pub accent: Accent,
    /// The entrant advances past the first round without an opponent
    pub bye: bool,
}

impl BoxPlacement {
    /// Middle of the right edge, where the entrant's line starts
    pub fn anchor(&self) -> Point {
        Point::new(self.x + self.w, self.y + self.h / 2.0)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.w, self.h)
    }
}

/// Role of a connector segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// Horizontal line from an entrant or merge point into a merge column
    Feed,
    /// Vertical line joining the two halves of a pairing
    Join,
    /// Line leaving the final merge point toward the unresolved winner slot
    Forward,
}

/// A straight connector line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConnectorSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub kind: ConnectorKind,
}

impl ConnectorSegment {
    pub fn new(from: Point, to: Point, kind: ConnectorKind) -> Self {
        Self {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            kind,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f64 {
        self.start().distance_sq(self.end()).sqrt()
    }
}

/// Boxes and connectors of one bracket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketLayout {
    pub boxes: Vec<BoxPlacement>,
    pub connectors: Vec<ConnectorSegment>,
    pub bounds: BoundingBox,
}

impl BracketLayout {
    /// Build a layout and compute its bounds from the contents
    pub fn new(boxes: Vec<BoxPlacement>, connectors: Vec<ConnectorSegment>) -> Self {
        let mut bounds: Option<BoundingBox> = None;
        for placement in &boxes {
            let b = placement.bounds();
            bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
        }
        for connector in &connectors {
            for point in [connector.start(), connector.end()] {
                bounds = Some(match bounds {
                    Some(acc) => acc.expand_to_include(point),
                    None => BoundingBox::new(point.x, point.y, 0.0, 0.0),
                });
            }
        }
        Self {
            boxes,
            connectors,
            bounds: bounds.unwrap_or_default(),
        }
    }

    pub fn bye_count(&self) -> usize {
        self.boxes.iter().filter(|b| b.bye).count()
    }

    pub fn forward_connectors(&self) -> impl Iterator<Item = &ConnectorSegment> {
        self.connectors
            .iter()
            .filter(|c| c.kind == ConnectorKind::Forward)
    }

    /// Start of the forward line: the point every path converges to
    pub fn final_merge_point(&self) -> Option<Point> {
        self.forward_connectors().next().map(|c| c.start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_parity() {
        assert_eq!(Accent::for_index(0), Accent::Red);
        assert_eq!(Accent::for_index(1), Accent::Blue);
        assert_eq!(Accent::for_index(6), Accent::Red);
    }

    #[test]
    fn test_bounding_box_union() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, 0.0, 15.0, 15.0));
    }

    #[test]
    fn test_layout_bounds_include_connectors() {
        let placement = BoxPlacement {
            x: 10.0,
            y: 10.0,
            w: 100.0,
            h: 20.0,
            label: "Ana".to_string(),
            accent: Accent::Red,
            bye: false,
        };
        let forward = ConnectorSegment::new(
            Point::new(110.0, 20.0),
            Point::new(200.0, 20.0),
            ConnectorKind::Forward,
        );
        let layout = BracketLayout::new(vec![placement], vec![forward]);
        assert_eq!(layout.bounds, BoundingBox::new(10.0, 10.0, 190.0, 20.0));
        assert_eq!(layout.final_merge_point(), Some(Point::new(110.0, 20.0)));
        assert_eq!(forward.length(), 90.0);
    }
}
