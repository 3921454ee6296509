use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::api::{PlayData, PlayEvent, StateEntry};
use crate::error::QueryError;
use crate::shared::{EdgeColor, EventKind};

/// An AS path token, kept exactly as the API returned it. The feed mixes
/// JSON numbers and strings for ASNs, and AS-sets arrive as brace-wrapped
/// strings, so the token is text rather than an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Asn(String);

impl Asn {
    pub fn new(token: impl Into<String>) -> Self {
        Asn(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Asn {
    fn from(token: &str) -> Self {
        Asn(token.to_string())
    }
}

impl From<u32> for Asn {
    fn from(asn: u32) -> Self {
        Asn(asn.to_string())
    }
}

impl<'de> Deserialize<'de> for Asn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Token {
            Number(u64),
            Text(String),
        }

        Ok(match Token::deserialize(deserializer)? {
            Token::Number(number) => Asn(number.to_string()),
            Token::Text(text) => Asn(text),
        })
    }
}

/// Directed graph of AS adjacencies. Nodes are ASN tokens and each edge
/// points from the AS that announced toward the AS it heard from, so
/// arrows follow the direction of propagation toward the origin.
pub struct PathGraph {
    graph: DiGraph<Asn, Option<EdgeColor>>,
    indices: HashMap<Asn, NodeIndex>,
}

impl PathGraph {
    pub fn new() -> Self {
        PathGraph {
            graph: DiGraph::new(),
            indices: HashMap::new(),
        }
    }

    fn ensure_node(&mut self, asn: &Asn) -> NodeIndex {
        if let Some(&idx) = self.indices.get(asn) {
            return idx;
        }
        let idx = self.graph.add_node(asn.clone());
        self.indices.insert(asn.clone(), idx);
        idx
    }

    /// Adds every adjacency of `path` as an edge `path[i+1] -> path[i]`.
    /// Re-adding an adjacency overwrites the color instead of stacking a
    /// parallel edge. Paths shorter than two hops add nothing.
    pub fn add_path(&mut self, path: &[Asn], color: Option<EdgeColor>) {
        for pair in path.windows(2) {
            let from = self.ensure_node(&pair[1]);
            let to = self.ensure_node(&pair[0]);
            self.graph.update_edge(from, to, color);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, asn: &Asn) -> bool {
        self.indices.contains_key(asn)
    }

    pub fn contains_edge(&self, from: &Asn, to: &Asn) -> bool {
        match (self.indices.get(from), self.indices.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn edge_color(&self, from: &Asn, to: &Asn) -> Option<EdgeColor> {
        let (&a, &b) = match (self.indices.get(from), self.indices.get(to)) {
            (Some(a), Some(b)) => (a, b),
            _ => return None,
        };
        self.graph
            .find_edge(a, b)
            .and_then(|edge| *self.graph.edge_weight(edge).unwrap_or(&None))
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Asn> {
        self.graph.node_weights()
    }

    /// Edges as (from, to, color) triples.
    pub fn edges(&self) -> impl Iterator<Item = (&Asn, &Asn, Option<EdgeColor>)> {
        self.graph.edge_references().map(move |edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                *edge.weight(),
            )
        })
    }
}

impl Default for PathGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot graph built from a bgp-state response, together with the
/// highlighted main node.
pub struct StateGraph {
    pub graph: PathGraph,
    pub main_node: Option<Asn>,
}

impl StateGraph {
    /// Builds the graph from announced paths. The last hop of the first
    /// record becomes the main node; every record contributes its
    /// adjacencies uncolored.
    pub fn from_entries(entries: &[StateEntry]) -> Self {
        let mut graph = PathGraph::new();
        let mut main_node = None;
        for entry in entries {
            if main_node.is_none() {
                main_node = entry.path.last().cloned();
            }
            graph.add_path(&entry.path, None);
        }
        debug!(
            "state graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        StateGraph { graph, main_node }
    }
}

/// One frame of a replay: a standalone graph plus its display caption.
pub struct Snapshot {
    pub graph: PathGraph,
    pub caption: String,
}

/// Lazy sequence of replay frames for paths originating at one ASN.
///
/// The first item is always the initial-state frame (blue edges). Each
/// later item is one matching announcement event rendered as its own
/// graph (green edges); frames are independent, not cumulative. Events
/// that match the filter but are not announcements yield an
/// `UnsupportedEvent` error item, and iteration continues past them.
pub struct ReplaySnapshots<'a> {
    data: &'a PlayData,
    filter: &'a Asn,
    emitted_initial: bool,
    events: std::slice::Iter<'a, PlayEvent>,
}

impl<'a> ReplaySnapshots<'a> {
    pub fn new(data: &'a PlayData, filter: &'a Asn) -> Self {
        ReplaySnapshots {
            data,
            filter,
            emitted_initial: false,
            events: data.events.iter(),
        }
    }

    fn initial_snapshot(&self) -> Snapshot {
        let mut graph = PathGraph::new();
        for entry in &self.data.initial_state {
            if entry.path.first() == Some(self.filter) {
                graph.add_path(&entry.path, Some(EdgeColor::Blue));
            }
        }
        debug!(
            "initial replay frame: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        let caption = format!(
            "Initial state of AS connections for {} at {}",
            self.data.resource, self.data.query_starttime
        );
        Snapshot { graph, caption }
    }
}

impl<'a> Iterator for ReplaySnapshots<'a> {
    type Item = Result<Snapshot, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.emitted_initial {
            self.emitted_initial = true;
            return Some(Ok(self.initial_snapshot()));
        }
        loop {
            let event = self.events.next()?;
            let Some(path) = event.path() else {
                continue;
            };
            if path.first() != Some(self.filter) {
                continue;
            }
            match EventKind::from_tag(&event.kind) {
                EventKind::Announcement => {
                    debug!("announcement at {} matched the filter", event.timestamp);
                    let mut graph = PathGraph::new();
                    graph.add_path(path, Some(EdgeColor::Green));
                    let caption = format!("AS connection update at {}", event.timestamp);
                    return Some(Ok(Snapshot { graph, caption }));
                }
                other => {
                    return Some(Err(QueryError::UnsupportedEvent {
                        kind: other.tag().to_string(),
                        timestamp: event.timestamp.clone(),
                    }));
                }
            }
        }
    }
}

/// Snapshots and skipped-event errors from a fully drained replay.
pub struct ReplayOutcome {
    pub snapshots: Vec<Snapshot>,
    pub skipped: Vec<QueryError>,
}

/// Drains a replay into frames, separating unsupported-event errors so
/// callers can report them without aborting the run. Fails with
/// `EmptyResult` when nothing in the response matched the filter at all.
pub fn collect_replay(data: &PlayData, filter: &Asn) -> Result<ReplayOutcome, QueryError> {
    let mut snapshots = Vec::new();
    let mut skipped = Vec::new();
    for item in ReplaySnapshots::new(data, filter) {
        match item {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(err) => {
                warn!("{}", err);
                skipped.push(err);
            }
        }
    }

    let matched_initial = data
        .initial_state
        .iter()
        .any(|entry| entry.path.first() == Some(filter));
    // snapshots[0] is the initial frame, so matches show up past index 0
    let matched_event = snapshots.len() > 1 || !skipped.is_empty();
    if !matched_initial && !matched_event {
        return Err(QueryError::EmptyResult {
            filter: filter.clone(),
        });
    }

    Ok(ReplayOutcome { snapshots, skipped })
}
