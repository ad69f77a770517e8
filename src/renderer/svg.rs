//! SVG generation from bracket layouts

use base64::{engine::general_purpose, Engine as _};

use crate::bracket::{Accent, BoundingBox, BoxPlacement, BracketLayout, ConnectorKind, Point};

use super::SvgConfig;

/// Space reserved above the layout for the category title
const TITLE_HEIGHT: f64 = 40.0;

/// Gap between a box's accent stripe and its label
const LABEL_INSET: f64 = 8.0;

/// A raster or vector image drawn underneath the layout
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub mime: String,
    pub data: Vec<u8>,
    pub width: f64,
    pub height: f64,
}

impl Backdrop {
    pub fn new(mime: impl Into<String>, data: Vec<u8>, width: f64, height: f64) -> Self {
        Self {
            mime: mime.into(),
            data,
            width,
            height,
        }
    }

    /// `data:` URI with the image inlined as base64
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    background: Vec<String>,
    elements: Vec<String>,
    connections: Vec<String>,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            background: vec![],
            elements: vec![],
            connections: vec![],
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> &str {
        if self.config.pretty_print {
            "  "
        } else {
            ""
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add an embedded image anchored at the origin
    pub fn add_backdrop(&mut self, backdrop: &Backdrop) {
        self.background.push(format!(
            r#"{}<image class="{}backdrop" x="0" y="0" width="{}" height="{}" href="{}"/>"#,
            self.indent_str(),
            self.prefix(),
            backdrop.width,
            backdrop.height,
            backdrop.data_uri()
        ));
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64, class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<rect class="{}{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            self.prefix(),
            class,
            x,
            y,
            w,
            h,
            styles
        ));
    }

    /// Add a text element, vertically centred on `y`
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, class: &str) {
        self.elements.push(format!(
            r#"{}<text class="{}{}" x="{}" y="{}" font-size="{}" dominant-baseline="middle">{}</text>"#,
            self.indent_str(),
            self.prefix(),
            class,
            x,
            y,
            self.config.font_size,
            escape_xml(text)
        ));
    }

    /// Add a connector line
    pub fn add_line(&mut self, from: Point, to: Point, class: &str) {
        self.connections.push(format!(
            r#"{}<line class="{}connector {}{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="black"/>"#,
            self.indent_str(),
            self.prefix(),
            self.prefix(),
            class,
            from.x,
            from.y,
            to.x,
            to.y
        ));
    }

    /// Finish the document with a padded viewBox
    pub fn build(self, viewbox: BoundingBox) -> String {
        let padding = self.config.viewbox_padding;
        let vb_x = viewbox.x - padding;
        let vb_y = viewbox.y - padding;
        let vb_w = viewbox.width + 2.0 * padding;
        let vb_h = viewbox.height + 2.0 * padding;

        let nl = self.newline();
        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            vb_x, vb_y, vb_w, vb_h
        ));
        svg.push_str(nl);

        // Backdrop first, connectors on top
        for item in self
            .background
            .iter()
            .chain(&self.elements)
            .chain(&self.connections)
        {
            svg.push_str(item);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Render a bracket layout to an SVG string
pub fn render_svg(layout: &BracketLayout, title: Option<&str>, config: &SvgConfig) -> String {
    render_svg_with_backdrop(layout, title, None, config)
}

/// Render a bracket layout over an optional backdrop. A backdrop already
/// shows the boxes and lines, so only the labels are drawn on top of it.
pub fn render_svg_with_backdrop(
    layout: &BracketLayout,
    title: Option<&str>,
    backdrop: Option<&Backdrop>,
    config: &SvgConfig,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    let mut viewbox = layout.bounds;

    if let Some(title) = title {
        let at = Point::new(viewbox.x, viewbox.y - TITLE_HEIGHT);
        builder.add_text(title, at.x, at.y, "title");
        viewbox = viewbox.expand_to_include(at);
    }

    match backdrop {
        Some(backdrop) => {
            builder.add_backdrop(backdrop);
            viewbox = viewbox.union(&BoundingBox::new(0.0, 0.0, backdrop.width, backdrop.height));
            for placement in &layout.boxes {
                builder.add_text(
                    &placement.label,
                    placement.x,
                    placement.y + placement.h / 2.0,
                    "label",
                );
            }
        }
        None => {
            for placement in &layout.boxes {
                render_box(placement, config, &mut builder);
            }
            for connector in &layout.connectors {
                let class = match connector.kind {
                    ConnectorKind::Feed => "feed",
                    ConnectorKind::Join => "join",
                    ConnectorKind::Forward => "forward",
                };
                builder.add_line(connector.start(), connector.end(), class);
            }
        }
    }

    builder.build(viewbox)
}

fn render_box(placement: &BoxPlacement, config: &SvgConfig, builder: &mut SvgBuilder) {
    let color = match placement.accent {
        Accent::Red => &config.red_color,
        Accent::Blue => &config.blue_color,
    };
    let class = if placement.bye { "box bye" } else { "box" };

    builder.add_rect(
        placement.x,
        placement.y,
        placement.w,
        placement.h,
        class,
        r#" fill="white" stroke="black""#,
    );
    builder.add_rect(
        placement.x,
        placement.y,
        config.stripe_width,
        placement.h,
        &format!("stripe-{}", placement.accent.as_str()),
        &format!(r#" fill="{}""#, color),
    );
    builder.add_text(
        &placement.label,
        placement.x + config.stripe_width + LABEL_INSET,
        placement.y + placement.h / 2.0,
        "label",
    );
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{BracketEngine, Entrant};

    fn two_entrant_layout() -> BracketLayout {
        BracketEngine::default()
            .layout(&[
                Entrant::new("Ana Ruiz", Some("DGA".to_string())),
                Entrant::new("Bea <Cruz>", None),
            ])
            .unwrap()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_render_boxes_and_connectors() {
        let svg = render_svg(
            &two_entrant_layout(),
            Some("Festival INFANTIL C FEMENINO -29"),
            &SvgConfig::default(),
        );
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("Ana Ruiz (DGA)"));
        assert!(svg.contains("Bea &lt;Cruz&gt;"));
        assert!(svg.contains("Festival INFANTIL C FEMENINO -29"));
        assert!(svg.contains(r#"class="bd-stripe-red""#));
        assert!(svg.contains(r#"class="bd-stripe-blue""#));
        assert_eq!(svg.matches("bd-forward").count(), 1);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_render_over_backdrop() {
        let backdrop = Backdrop::new("image/png", vec![1, 2, 3], 600.0, 400.0);
        let svg = render_svg_with_backdrop(
            &two_entrant_layout(),
            None,
            Some(&backdrop),
            &SvgConfig::default().with_pretty_print(false),
        );
        assert!(svg.contains("data:image/png;base64,AQID"));
        assert!(!svg.contains("<line"));
        assert!(!svg.contains('\n'));
    }

    #[test]
    fn test_without_prefix() {
        let config = SvgConfig::default().without_class_prefix().with_standalone(false);
        let svg = render_svg(&two_entrant_layout(), None, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"class="box""#));
    }
}
