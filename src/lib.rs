// Re-export all public modules
pub mod api;
pub mod error;
pub mod layout;
pub mod path_graph;
pub mod render;
pub mod shared;

// Re-export commonly used types at the crate root
pub use api::{PlayData, PlayEvent, Resource, RisClient, StateData, StateEntry};
pub use error::QueryError;
pub use layout::{spring_layout, LayoutOptions, Point};
pub use path_graph::{
    collect_replay, Asn, PathGraph, ReplayOutcome, ReplaySnapshots, Snapshot, StateGraph,
};
pub use render::{render_svg, RenderOptions};
pub use shared::{EdgeColor, EventKind};
