//! join-graph: join-node normalization and layered layout for execution
//! dependency graphs.
//!
//! A [`GraphModel`] holds units of work and the synthetic join nodes that
//! synchronize them. [`GraphModel::normalize`] removes joins that add no
//! structure, [`compute_layout`] places every node reachable from a head on a
//! soft grid, and the [`viewport`] module maps the result to screen space.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod viewport;

pub use config::{Config, LayoutConfig, ViewportConfig};
pub use error::{Error, GraphError, LayoutError};
pub use geometry::{Point, Rect, Size};
pub use graph::{GraphData, GraphLink, GraphModel, GraphNode, NodeId};
pub use layout::{Diagnostic, LayoutCell, LayoutResult, RedrawSignal, compute_layout};
pub use viewport::{ViewState, Viewport};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// `log` records from this crate are forwarded to it. Calling this twice, or
/// after another subscriber was installed, leaves the existing one in place.
pub fn init_logging() {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
	let installed = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init()
		.is_ok();
	if installed {
		info!("join-graph: logging initialized");
	}
}

/// Input document: a graph description plus optional configuration.
///
/// ```json
/// { "head": "a", "nodes": [{ "id": "a", "name": "start" }], "links": [], "config": {} }
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Document {
	/// Head, nodes and links.
	#[serde(flatten)]
	pub graph: GraphData,
	/// Canvas size and tuning; defaults when omitted.
	#[serde(default)]
	pub config: Config,
}

/// Output of [`layout_document`]: the layout plus what is needed to draw it.
#[derive(Clone, Debug, Serialize)]
pub struct Rendering {
	/// Placed points, bounds and diagnostics.
	#[serde(flatten)]
	pub layout: LayoutResult,
	/// Display names of the named nodes that were placed.
	pub labels: BTreeMap<NodeId, String>,
	/// Parent and child of every edge between placed nodes.
	pub edges: Vec<(NodeId, NodeId)>,
}

/// Validates the configuration, then builds, prunes, normalizes and lays out
/// the graph in `document`.
pub fn layout_document(document: &Document) -> Result<Rendering, Error> {
	document.config.validate()?;
	let (mut graph, head) = GraphModel::from_data(&document.graph)?;
	info!(
		"join-graph: loaded {} nodes, {} links",
		document.graph.nodes.len(),
		document.graph.links.len()
	);

	let pruned = graph.prune_unreachable(head)?;
	let normalized = graph.normalize(head)?;
	info!(
		"join-graph: pruned {} unreachable nodes, removed {} redundant joins",
		pruned.nodes_freed,
		normalized.removed()
	);

	let Config { width, height, layout, .. } = &document.config;
	let result = compute_layout(&graph, head, Size::new(*width, *height), layout)?;

	let labels = result
		.points()
		.keys()
		.filter_map(|&id| {
			let node = graph.node(id)?;
			(!node.is_join()).then(|| (id, node.name().to_owned()))
		})
		.collect();
	let edges = result.edges(&graph).map(|(from, _, to, _)| (from, to)).collect();
	Ok(Rendering {
		layout: result,
		labels,
		edges,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn document(json: &str) -> Document {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn pipeline_collapses_joins() {
		let doc = document(
			r#"{
				"head": "start",
				"nodes": [
					{ "id": "start", "name": "start" },
					{ "id": "j1" },
					{ "id": "j2" },
					{ "id": "end", "name": "end" }
				],
				"links": [
					{ "source": "start", "target": "j1" },
					{ "source": "j1", "target": "j2" },
					{ "source": "j2", "target": "end" }
				],
				"config": { "layout": { "seed": 3 } }
			}"#,
		);
		let rendering = layout_document(&doc).unwrap();
		assert_eq!(rendering.layout.len(), 2);
		assert_eq!(rendering.edges.len(), 1);
		let names: Vec<&str> = rendering.labels.values().map(String::as_str).collect();
		assert_eq!(names, ["start", "end"]);
		assert_eq!(rendering.layout.bounds(), Size::new(1440.0, 900.0));
	}

	#[test]
	fn unknown_head_is_an_error() {
		let doc = document(r#"{ "head": "missing", "nodes": [{ "id": "a", "name": "a" }] }"#);
		assert!(matches!(
			layout_document(&doc),
			Err(Error::Graph(GraphError::UnknownDataId(id))) if id == "missing"
		));
	}

	#[test]
	fn invalid_config_is_an_error() {
		let doc = document(
			r#"{
				"head": "a",
				"nodes": [{ "id": "a", "name": "a" }, { "id": "b", "name": "b" }, { "id": "c", "name": "c" }],
				"links": [{ "source": "a", "target": "b" }, { "source": "b", "target": "c" }],
				"config": { "layout": { "squeeze_factor": 0 } }
			}"#,
		);
		assert!(matches!(
			layout_document(&doc),
			Err(Error::Layout(LayoutError::InvalidConfig {
				field: "squeeze_factor",
				..
			}))
		));

		let doc = document(r#"{ "head": "a", "nodes": [{ "id": "a", "name": "a" }], "config": { "width": 0 } }"#);
		assert!(matches!(
			layout_document(&doc),
			Err(Error::Layout(LayoutError::InvalidConfig { field: "width", .. }))
		));
	}

	#[test]
	fn cycles_are_rejected() {
		let doc = document(
			r#"{
				"head": "a",
				"nodes": [{ "id": "a", "name": "a" }, { "id": "b", "name": "b" }],
				"links": [{ "source": "a", "target": "b" }, { "source": "b", "target": "a" }]
			}"#,
		);
		assert!(matches!(
			layout_document(&doc),
			Err(Error::Graph(GraphError::WouldCycle { .. }))
		));
	}

	#[test]
	fn rendering_serializes() {
		let doc = document(
			r#"{
				"head": "a",
				"nodes": [{ "id": "a", "name": "a" }, { "id": "b", "name": "b" }],
				"links": [{ "source": "a", "target": "b" }],
				"config": { "width": 800, "height": 600, "layout": { "seed": 1 } }
			}"#,
		);
		let rendering = layout_document(&doc).unwrap();
		let value = serde_json::to_value(&rendering).unwrap();
		assert_eq!(value["bounds"]["width"], 800.0);
		assert_eq!(value["columns"], 2);
		assert_eq!(value["draw_all_names"], true);
		assert!(value["points"].as_object().unwrap().len() == 2);
		assert_eq!(value["edges"].as_array().unwrap().len(), 1);
	}
}
