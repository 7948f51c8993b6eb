//! Execution dependency graph.
//!
//! Nodes are units of work or synthetic join points. The model keeps parent
//! and child edges mutual, and [`GraphModel::normalize`] collapses join nodes
//! that add no synchronization to the structure.

mod model;
mod normalize;
mod types;

pub use model::{GraphModel, Node, NodeId, PruneReport};
pub use normalize::{NormalizeReport, Redundancy};
pub use types::{GraphData, GraphLink, GraphNode};
