use std::collections::HashMap;

use bgpgrapher::layout::{spring_layout, LayoutOptions, Point};
use bgpgrapher::path_graph::{Asn, PathGraph};
use bgpgrapher::render::{render_svg, RenderOptions};
use bgpgrapher::shared::EdgeColor;

/// Deterministic positions so string assertions stay stable
fn fixed_layout(graph: &PathGraph) -> HashMap<Asn, Point> {
    spring_layout(graph, &LayoutOptions::default().with_seed(Some(42)))
}

fn tokens(path: &[&str]) -> Vec<Asn> {
    path.iter().map(|&token| Asn::from(token)).collect()
}

#[test]
fn test_empty_graph_still_renders_caption() {
    let graph = PathGraph::new();

    let svg = render_svg(
        &graph,
        &HashMap::new(),
        None,
        "nothing matched",
        &RenderOptions::replay(),
    );

    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("<svg"));
    assert!(svg.contains("nothing matched"));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn test_main_node_is_highlighted() {
    let mut graph = PathGraph::new();
    graph.add_path(&tokens(&["64500", "64501", "64502"]), None);
    let layout = fixed_layout(&graph);
    let main = Asn::from("64502");

    let svg = render_svg(
        &graph,
        &layout,
        Some(&main),
        "state",
        &RenderOptions::snapshot(),
    );

    assert_eq!(svg.matches("fill=\"red\"").count(), 1);
    assert_eq!(svg.matches("fill=\"skyblue\"").count(), 2);
}

#[test]
fn test_every_node_is_labelled() {
    let mut graph = PathGraph::new();
    graph.add_path(&tokens(&["100", "200", "300"]), None);
    let layout = fixed_layout(&graph);

    let svg = render_svg(&graph, &layout, None, "labels", &RenderOptions::replay());

    for token in ["100", "200", "300"] {
        assert!(
            svg.contains(&format!(">{}</text>", token)),
            "missing label for {}",
            token
        );
    }
}

#[test]
fn test_replay_edge_colors_pass_through() {
    let mut graph = PathGraph::new();
    graph.add_path(&tokens(&["100", "200"]), Some(EdgeColor::Blue));
    graph.add_path(&tokens(&["100", "300"]), Some(EdgeColor::Green));
    let layout = fixed_layout(&graph);

    let svg = render_svg(&graph, &layout, None, "replay", &RenderOptions::replay());

    assert!(svg.contains("stroke=\"blue\""));
    assert!(svg.contains("stroke=\"green\""));
}

#[test]
fn test_uncolored_edges_get_palette_colors() {
    let mut graph = PathGraph::new();
    graph.add_path(&tokens(&["1", "2", "3"]), None);
    let layout = fixed_layout(&graph);

    let svg = render_svg(&graph, &layout, None, "state", &RenderOptions::snapshot());

    // first palette stop is the cool endpoint
    assert!(svg.contains("stroke=\"#3b4cc0\""));
    assert!(!svg.contains("stroke=\"blue\""));
}

#[test]
fn test_caption_is_escaped() {
    let graph = PathGraph::new();

    let svg = render_svg(
        &graph,
        &HashMap::new(),
        None,
        "paths for <AS & friends>",
        &RenderOptions::snapshot(),
    );

    assert!(svg.contains("paths for &lt;AS &amp; friends&gt;"));
    assert!(!svg.contains("<AS & friends>"));
}

#[test]
fn test_edges_reference_the_arrow_marker() {
    let mut graph = PathGraph::new();
    graph.add_path(&tokens(&["10", "20"]), None);
    let layout = fixed_layout(&graph);

    let svg = render_svg(&graph, &layout, None, "arrows", &RenderOptions::snapshot());

    assert!(svg.contains("<marker id=\"arrow-end\""));
    assert!(svg.contains("marker-end=\"url(#arrow-end)\""));
}
