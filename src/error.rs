//! Error types for graph mutation and layout.

use thiserror::Error;

use crate::graph::NodeId;

/// Contract violations raised while mutating a [`GraphModel`](crate::graph::GraphModel).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
	/// The id does not name a live node.
	#[error("unknown node {0}")]
	UnknownNode(NodeId),
	/// An edge from a node to itself.
	#[error("node {0} can not be its own child")]
	SelfLoop(NodeId),
	/// Adding the edge would make `parent` reachable from `child`.
	#[error("edge {parent} -> {child} would close a cycle")]
	WouldCycle {
		/// Would-be parent of the edge.
		parent: NodeId,
		/// Would-be child of the edge.
		child: NodeId,
	},
	/// A graph description refers to a node id it never declares.
	#[error("unknown node id {0:?} in graph data")]
	UnknownDataId(String),
}

/// Failures surfaced by [`compute_layout`](crate::layout::compute_layout).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
	/// The head to lay out from is not a live node.
	#[error("head node {0} is not in the graph")]
	UnknownHead(NodeId),
	/// Soft-grid placement was asked for a region outside `1..=total`.
	#[error("region {region} outside of 1..={total}")]
	InvalidRegion {
		/// The requested 1-based region.
		region: usize,
		/// Number of regions available.
		total: usize,
	},
	/// A configuration value or canvas size that would not produce finite
	/// coordinates.
	#[error("invalid {field}: {reason}")]
	InvalidConfig {
		/// Name of the offending field.
		field: &'static str,
		/// What the value must satisfy.
		reason: &'static str,
	},
}

/// Any failure of the document pipeline in [`layout_document`](crate::layout_document).
#[derive(Debug, Error)]
pub enum Error {
	/// Building or cleaning the graph failed.
	#[error(transparent)]
	Graph(#[from] GraphError),
	/// Layout was refused.
	#[error(transparent)]
	Layout(#[from] LayoutError),
	/// The document is not valid JSON or has the wrong shape.
	#[error("invalid graph document: {0}")]
	Json(#[from] serde_json::Error),
	/// Reading the input or writing the output failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}
