use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::path_graph::{Asn, PathGraph};

/// A 2D node position produced by the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Spring layout parameters.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Optimal distance between connected nodes. `None` means 1/sqrt(n).
    pub k: Option<f64>,
    pub iterations: usize,
    /// Half-width of the square the result is rescaled into.
    pub scale: f64,
    /// Fixed RNG seed for reproducible placements.
    pub seed: Option<u64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            k: None,
            iterations: 50,
            scale: 1.0,
            seed: None,
        }
    }
}

impl LayoutOptions {
    /// Parameters tuned for the single-snapshot view: an oversized k so
    /// repulsion dominates and the topology fans out quickly.
    pub fn snapshot() -> Self {
        LayoutOptions {
            k: Some(500.0),
            iterations: 10,
            scale: 4.0,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Positions every node of `graph` with the Fruchterman-Reingold force
/// model: connected nodes attract, all pairs repel, and per-iteration
/// movement is capped by a temperature that cools to zero. The result is
/// centered on the origin and rescaled so the largest coordinate
/// magnitude equals `options.scale`.
pub fn spring_layout(graph: &PathGraph, options: &LayoutOptions) -> HashMap<Asn, Point> {
    let nodes: Vec<&Asn> = graph.nodes().collect();
    let n = nodes.len();
    if n == 0 {
        return HashMap::new();
    }
    if n == 1 {
        return HashMap::from([(nodes[0].clone(), Point { x: 0.0, y: 0.0 })]);
    }

    let slots: HashMap<&Asn, usize> = nodes.iter().enumerate().map(|(i, &asn)| (asn, i)).collect();
    let edges: Vec<(usize, usize)> = graph
        .edges()
        .map(|(from, to, _)| (slots[from], slots[to]))
        .collect();

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut positions: Vec<Point> = (0..n)
        .map(|_| Point {
            x: rng.gen::<f64>(),
            y: rng.gen::<f64>(),
        })
        .collect();

    let k = options.k.unwrap_or_else(|| 1.0 / (n as f64).sqrt());

    // Initial temperature is a tenth of the unit placement square; it
    // cools linearly so the final iterations only nudge.
    let mut temperature = 0.1_f64;
    let cooling = temperature / (options.iterations as f64 + 1.0);

    for _ in 0..options.iterations {
        let mut displacement = vec![Point { x: 0.0, y: 0.0 }; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                let repulsion = k * k / distance;
                let (ux, uy) = (dx / distance, dy / distance);
                displacement[i].x += ux * repulsion;
                displacement[i].y += uy * repulsion;
                displacement[j].x -= ux * repulsion;
                displacement[j].y -= uy * repulsion;
            }
        }

        for &(a, b) in &edges {
            // self-loops exert no spring force
            if a == b {
                continue;
            }
            let dx = positions[a].x - positions[b].x;
            let dy = positions[a].y - positions[b].y;
            let distance = (dx * dx + dy * dy).sqrt().max(0.01);
            let attraction = distance * distance / k;
            let (ux, uy) = (dx / distance, dy / distance);
            displacement[a].x -= ux * attraction;
            displacement[a].y -= uy * attraction;
            displacement[b].x += ux * attraction;
            displacement[b].y += uy * attraction;
        }

        for i in 0..n {
            let length = (displacement[i].x * displacement[i].x
                + displacement[i].y * displacement[i].y)
                .sqrt()
                .max(1e-9);
            let capped = length.min(temperature);
            positions[i].x += displacement[i].x / length * capped;
            positions[i].y += displacement[i].y / length * capped;
        }

        temperature -= cooling;
    }

    rescale(&mut positions, options.scale);

    nodes
        .into_iter()
        .cloned()
        .zip(positions)
        .collect()
}

/// Centers positions on the origin and scales the largest coordinate
/// magnitude to `scale`. Degenerate all-coincident inputs stay put.
fn rescale(positions: &mut [Point], scale: f64) {
    let n = positions.len() as f64;
    let cx = positions.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = positions.iter().map(|p| p.y).sum::<f64>() / n;
    let mut extent = 0.0_f64;
    for point in positions.iter_mut() {
        point.x -= cx;
        point.y -= cy;
        extent = extent.max(point.x.abs()).max(point.y.abs());
    }
    if extent > f64::EPSILON {
        let factor = scale / extent;
        for point in positions.iter_mut() {
            point.x *= factor;
            point.y *= factor;
        }
    }
}
