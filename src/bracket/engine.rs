//! Deterministic bracket geometry
//!
//! Entrants are stacked in input order. Each round pairs consecutive slots
//! (0-1, 2-3, ...): both slots feed horizontally into the round's merge
//! column, a vertical join connects them and its midpoint becomes the slot
//! of the next round. An odd slot left over at the end of a round is carried
//! unchanged into the next round. When one slot remains, a forward line
//! leaves it toward the unresolved winner position.
//!
//! Coordinates depend only on the entrant count, the box index and the
//! configuration; labels affect nothing but the text in the boxes.

use super::config::BracketConfig;
use super::draw::DrawNode;
use super::label::{truncate_label, Entrant};
use super::types::{Accent, BoxPlacement, BracketLayout, ConnectorKind, ConnectorSegment, Point};

/// Seeding tree and layout of one bracket
#[derive(Debug, Clone, PartialEq)]
pub struct BracketDraw {
    pub tree: DrawNode,
    pub layout: BracketLayout,
}

/// A position that still has to be paired, with the point its line leaves from
struct Slot {
    node: DrawNode,
    point: Point,
}

#[derive(Debug, Clone, Default)]
pub struct BracketEngine {
    config: BracketConfig,
}

impl BracketEngine {
    pub fn new(config: BracketConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BracketConfig {
        &self.config
    }

    /// Layout for two or more entrants; `None` below two
    pub fn layout(&self, entrants: &[Entrant]) -> Option<BracketLayout> {
        self.draw(entrants).map(|draw| draw.layout)
    }

    /// Explicit single-entry bracket: one box, no connectors
    pub fn single(&self, entrant: &Entrant) -> BracketLayout {
        let (x, y) = self.config.origin;
        let (w, h) = self.config.box_size;
        BracketLayout::new(
            vec![BoxPlacement {
                x,
                y,
                w,
                h,
                label: truncate_label(&entrant.label(), self.config.label_limit),
                accent: Accent::for_index(0),
                bye: false,
            }],
            vec![],
        )
    }

    /// Seeding tree and layout for two or more entrants; `None` below two
    pub fn draw(&self, entrants: &[Entrant]) -> Option<BracketDraw> {
        if entrants.len() < 2 {
            return None;
        }

        let boxes = self.place_boxes(entrants);
        let mut connectors = Vec::new();
        let mut slots: Vec<Slot> = boxes
            .iter()
            .enumerate()
            .map(|(index, placement)| Slot {
                node: DrawNode::entrant(index),
                point: placement.anchor(),
            })
            .collect();

        let mut round = 0;
        while slots.len() > 1 {
            let column = self.merge_column(round);
            let mut next = Vec::with_capacity(slots.len().div_ceil(2));
            let mut pending = std::mem::take(&mut slots).into_iter();

            while let Some(top) = pending.next() {
                let Some(bottom) = pending.next() else {
                    next.push(Slot {
                        node: DrawNode::pairing(round, top.node, DrawNode::Bye),
                        point: top.point,
                    });
                    break;
                };

                let top_end = Point::new(column, top.point.y);
                let bottom_end = Point::new(column, bottom.point.y);
                connectors.push(ConnectorSegment::new(top.point, top_end, ConnectorKind::Feed));
                connectors.push(ConnectorSegment::new(
                    bottom.point,
                    bottom_end,
                    ConnectorKind::Feed,
                ));
                connectors.push(ConnectorSegment::new(top_end, bottom_end, ConnectorKind::Join));

                next.push(Slot {
                    node: DrawNode::pairing(round, top.node, bottom.node),
                    point: Point::new(column, (top.point.y + bottom.point.y) / 2.0),
                });
            }

            slots = next;
            round += 1;
        }

        let winner = slots.pop()?;
        connectors.push(ConnectorSegment::new(
            winner.point,
            Point::new(winner.point.x + self.config.forward_length, winner.point.y),
            ConnectorKind::Forward,
        ));

        Some(BracketDraw {
            tree: winner.node,
            layout: BracketLayout::new(boxes, connectors),
        })
    }

    /// First-round boxes at a fixed pitch. With an odd count the last entrant
    /// has no opponent; only in the three-entrant draw is its box pushed down
    /// by the bye offset.
    fn place_boxes(&self, entrants: &[Entrant]) -> Vec<BoxPlacement> {
        let (x, y0) = self.config.origin;
        let (w, h) = self.config.box_size;
        let pitch = self.config.pitch();
        let n = entrants.len();

        entrants
            .iter()
            .enumerate()
            .map(|(index, entrant)| {
                let bye = n % 2 == 1 && index == n - 1;
                let offset = if bye && n == 3 {
                    self.config.bye_offset
                } else {
                    0.0
                };
                BoxPlacement {
                    x,
                    y: y0 + index as f64 * pitch + offset,
                    w,
                    h,
                    label: truncate_label(&entrant.label(), self.config.label_limit),
                    accent: Accent::for_index(index),
                    bye,
                }
            })
            .collect()
    }

    /// x of the vertical join line of a round
    fn merge_column(&self, round: usize) -> f64 {
        let (x, _) = self.config.origin;
        x + self.config.box_size.0 + (round + 1) as f64 * self.config.round_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entrants(n: usize) -> Vec<Entrant> {
        (0..n)
            .map(|i| Entrant::new(format!("Entrant {}", i), Some("DGA".to_string())))
            .collect()
    }

    fn count(layout: &BracketLayout, kind: ConnectorKind) -> usize {
        layout.connectors.iter().filter(|c| c.kind == kind).count()
    }

    #[test]
    fn test_below_two_has_no_layout() {
        let engine = BracketEngine::default();
        assert!(engine.layout(&[]).is_none());
        assert!(engine.layout(&entrants(1)).is_none());
    }

    #[test]
    fn test_single_entry_bracket() {
        let engine = BracketEngine::default();
        let layout = engine.single(&Entrant::new("Ana", None));
        assert_eq!(layout.boxes.len(), 1);
        assert!(layout.connectors.is_empty());
        assert_eq!(layout.boxes[0].label, "Ana");
    }

    #[test]
    fn test_two_entrants() {
        let engine = BracketEngine::default();
        let draw = engine.draw(&entrants(2)).unwrap();
        let layout = &draw.layout;

        assert_eq!(layout.boxes.len(), 2);
        assert_eq!(layout.boxes[0].accent, Accent::Red);
        assert_eq!(layout.boxes[1].accent, Accent::Blue);
        assert_eq!(layout.boxes[1].y - layout.boxes[0].y, 60.0);
        assert_eq!(count(layout, ConnectorKind::Feed), 2);
        assert_eq!(count(layout, ConnectorKind::Join), 1);
        assert_eq!(count(layout, ConnectorKind::Forward), 1);
        assert_eq!(layout.final_merge_point(), Some(Point::new(360.0, 128.0)));
        assert_eq!(draw.tree, DrawNode::pairing(0, DrawNode::entrant(0), DrawNode::entrant(1)));
    }

    #[test]
    fn test_three_entrants_bye() {
        let engine = BracketEngine::default();
        let draw = engine.draw(&entrants(3)).unwrap();
        let layout = &draw.layout;

        assert_eq!(layout.boxes.len(), 3);
        assert_eq!(layout.bye_count(), 1);
        assert!(layout.boxes[2].bye);
        // 80 + 2 * 60 + bye offset
        assert_eq!(layout.boxes[2].y, 230.0);
        assert_eq!(count(layout, ConnectorKind::Forward), 1);
        assert_eq!(layout.final_merge_point(), Some(Point::new(420.0, 188.0)));
        assert_eq!(draw.tree.bye_count(), 1);
        assert_eq!(draw.tree.rounds(), 2);
        assert_eq!(draw.tree.entrants(), vec![0, 1, 2]);
    }

    #[test]
    fn test_five_entrants_keep_fixed_pitch() {
        let layout = BracketEngine::default().layout(&entrants(5)).unwrap();
        let ys: Vec<f64> = layout.boxes.iter().map(|b| b.y).collect();
        assert_eq!(ys, vec![80.0, 140.0, 200.0, 260.0, 320.0]);
        assert!(layout.boxes[4].bye);
    }

    #[test]
    fn test_power_of_two_rounds() {
        let engine = BracketEngine::default();
        let draw = engine.draw(&entrants(8)).unwrap();
        assert_eq!(draw.tree.rounds(), 3);
        assert_eq!(draw.tree.bye_count(), 0);
        assert_eq!(draw.layout.bye_count(), 0);
        // 4 + 2 + 1 pairings
        assert_eq!(count(&draw.layout, ConnectorKind::Join), 7);
        assert_eq!(count(&draw.layout, ConnectorKind::Feed), 14);
    }

    #[test]
    fn test_odd_count_beyond_first_round() {
        let engine = BracketEngine::default();
        // 6 entrants: three first-round winners, the third is carried
        let draw = engine.draw(&entrants(6)).unwrap();
        assert_eq!(draw.layout.bye_count(), 0);
        assert_eq!(draw.tree.bye_count(), 1);
        assert_eq!(draw.tree.rounds(), 3);
        assert_eq!(count(&draw.layout, ConnectorKind::Join), 5);
        assert_eq!(count(&draw.layout, ConnectorKind::Forward), 1);
    }

    #[test]
    fn test_accent_alternates_by_position() {
        let engine = BracketEngine::default();
        let layout = engine.layout(&entrants(5)).unwrap();
        let accents: Vec<_> = layout.boxes.iter().map(|b| b.accent).collect();
        assert_eq!(
            accents,
            vec![Accent::Red, Accent::Blue, Accent::Red, Accent::Blue, Accent::Red]
        );
    }

    #[test]
    fn test_geometry_ignores_label_content() {
        let engine = BracketEngine::default();
        let short = engine.layout(&entrants(4)).unwrap();
        let long: Vec<Entrant> = (0..4)
            .map(|i| Entrant::new("N".repeat(80 + i), None))
            .collect();
        let long = engine.layout(&long).unwrap();

        assert_eq!(short.connectors, long.connectors);
        assert_eq!(short.bounds, long.bounds);
        assert!(long.boxes.iter().all(|b| b.label.chars().count() == 50));
    }

    #[test]
    fn test_custom_geometry() {
        let engine = BracketEngine::new(
            BracketConfig::new()
                .with_origin(0.0, 0.0)
                .with_box_size(100.0, 20.0)
                .with_vertical_gap(10.0)
                .with_round_offset(50.0),
        );
        let layout = engine.layout(&entrants(2)).unwrap();
        assert_eq!(layout.boxes[1].y, 30.0);
        assert_eq!(layout.final_merge_point(), Some(Point::new(150.0, 25.0)));
    }
}
