use std::collections::HashMap;

use crate::layout::Point;
use crate::path_graph::{Asn, PathGraph};

/// Canvas and marker sizing for one rendered frame.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: f64,
    pub height: f64,
    pub node_radius: f64,
    pub main_node_radius: f64,
    pub font_size: f64,
}

impl RenderOptions {
    /// Sizing for the single-snapshot view: a square canvas with small
    /// markers, since state graphs can run to hundreds of nodes.
    pub fn snapshot() -> Self {
        RenderOptions {
            width: 1000.0,
            height: 1000.0,
            node_radius: 8.0,
            main_node_radius: 10.0,
            font_size: 11.0,
        }
    }

    /// Sizing for replay frames: wide canvas, larger markers, as each
    /// frame carries only a handful of nodes.
    pub fn replay() -> Self {
        RenderOptions {
            width: 1200.0,
            height: 800.0,
            node_radius: 14.0,
            main_node_radius: 14.0,
            font_size: 13.0,
        }
    }
}

const CANVAS_MARGIN: f64 = 60.0;
const CAPTION_FONT_SIZE: f64 = 16.0;

/// Renders one graph frame to an SVG document. `main_node`, when present
/// and in the graph, is drawn red and slightly larger. Colorless edges
/// get a palette color by edge index; colored edges keep their color.
pub fn render_svg(
    graph: &PathGraph,
    layout: &HashMap<Asn, Point>,
    main_node: Option<&Asn>,
    caption: &str,
    options: &RenderOptions,
) -> String {
    let canvas = to_canvas(layout, options);
    let radius_of = |asn: &Asn| {
        if main_node == Some(asn) {
            options.main_node_radius
        } else {
            options.node_radius
        }
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" font-family="Inter, system-ui, sans-serif">
  <defs>
    <marker id="arrow-end" markerWidth="8" markerHeight="8" refX="6" refY="4" orient="auto" markerUnits="strokeWidth">
      <path d="M1,1 L6,4 L1,7 z" fill="context-stroke" />
    </marker>
  </defs>
  <rect width="100%" height="100%" fill="white" />
"##,
        options.width, options.height, options.width, options.height,
    ));

    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#2d3748\" font-size=\"{:.0}\" text-anchor=\"middle\">{}</text>\n",
        options.width / 2.0,
        CANVAS_MARGIN / 2.0,
        CAPTION_FONT_SIZE,
        escape_xml(caption)
    ));

    let edge_total = graph.edge_count();
    for (index, (from, to, color)) in graph.edges().enumerate() {
        let (Some(&(ax, ay)), Some(&(bx, by))) = (canvas.get(from), canvas.get(to)) else {
            continue;
        };
        let stroke = match color {
            Some(color) => color.as_svg().to_string(),
            None => palette_color(index, edge_total),
        };
        // stop the line at the target circle so the arrowhead stays visible
        let dx = bx - ax;
        let dy = by - ay;
        let distance = (dx * dx + dy * dy).sqrt();
        let gap = radius_of(to) + 3.0;
        let (ex, ey) = if distance > gap {
            (bx - dx / distance * gap, by - dy / distance * gap)
        } else {
            (bx, by)
        };
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\" marker-end=\"url(#arrow-end)\" />\n",
            ax, ay, ex, ey, stroke
        ));
    }

    for asn in graph.nodes() {
        let Some(&(x, y)) = canvas.get(asn) else {
            continue;
        };
        let fill = if main_node == Some(asn) {
            "red"
        } else {
            "skyblue"
        };
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"#2d3748\" stroke-width=\"1\" />\n",
            x,
            y,
            radius_of(asn),
            fill
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"black\" font-size=\"{:.0}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>\n",
            x,
            y,
            options.font_size,
            escape_xml(asn.as_str())
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Maps layout coordinates into canvas pixels, leaving a margin on every
/// side. Axes are fitted independently, so a degenerate span on one axis
/// centers nodes on that axis instead of dividing by zero.
fn to_canvas(layout: &HashMap<Asn, Point>, options: &RenderOptions) -> HashMap<Asn, (f64, f64)> {
    if layout.is_empty() {
        return HashMap::new();
    }
    let min_x = layout.values().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = layout
        .values()
        .map(|p| p.x)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_y = layout.values().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = layout
        .values()
        .map(|p| p.y)
        .fold(f64::NEG_INFINITY, f64::max);

    let inner_width = options.width - 2.0 * CANVAS_MARGIN;
    let inner_height = options.height - 2.0 * CANVAS_MARGIN;
    let fit = |value: f64, min: f64, max: f64, inner: f64| {
        let span = max - min;
        if span > f64::EPSILON {
            CANVAS_MARGIN + (value - min) / span * inner
        } else {
            CANVAS_MARGIN + inner / 2.0
        }
    };

    layout
        .iter()
        .map(|(asn, point)| {
            (
                asn.clone(),
                (
                    fit(point.x, min_x, max_x, inner_width),
                    fit(point.y, min_y, max_y, inner_height),
                ),
            )
        })
        .collect()
}

/// Blends between the cool and warm palette endpoints by edge index, so
/// uncolored snapshot edges stay visually distinguishable.
fn palette_color(index: usize, total: usize) -> String {
    let t = index as f64 / total.max(1) as f64;
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(59.0, 180.0).round() as u8,
        lerp(76.0, 4.0).round() as u8,
        lerp(192.0, 38.0).round() as u8
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
