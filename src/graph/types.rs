//! Serialized graph description accepted by [`GraphModel::from_data`].

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::model::{GraphModel, NodeId};
use crate::error::GraphError;

/// A node in the graph description.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Display name. Nodes without a name are join nodes.
	#[serde(default)]
	pub name: Option<String>,
}

/// A directed dependency edge between two nodes.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GraphLink {
	/// Parent node ID.
	pub source: String,
	/// Child node ID.
	pub target: String,
}

/// Complete graph description: nodes, links and the head to lay out from.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GraphData {
	/// Id of the node the layout starts from.
	pub head: String,
	/// All nodes in the graph.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// All links between nodes.
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

impl GraphModel {
	/// Builds a model from a graph description and returns it with its head.
	///
	/// Duplicate node ids and links naming unknown nodes are logged and
	/// skipped. Links that would close a cycle are errors.
	pub fn from_data(data: &GraphData) -> Result<(GraphModel, NodeId), GraphError> {
		let mut graph = GraphModel::new();
		let mut id_to_idx: HashMap<&str, NodeId> = HashMap::with_capacity(data.nodes.len());

		for node in &data.nodes {
			if id_to_idx.contains_key(node.id.as_str()) {
				warn!("join-graph: duplicate node id {:?}, keeping the first", node.id);
				continue;
			}
			let idx = match &node.name {
				Some(name) => graph.add_node(name.clone()),
				None => graph.add_join(),
			};
			id_to_idx.insert(node.id.as_str(), idx);
		}

		for link in &data.links {
			match (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				(Some(&src), Some(&tgt)) => {
					graph.attach(src, tgt)?;
				}
				_ => warn!(
					"join-graph: skipping link {:?} -> {:?} to an unknown node",
					link.source, link.target
				),
			}
		}

		let head = id_to_idx
			.get(data.head.as_str())
			.copied()
			.ok_or_else(|| GraphError::UnknownDataId(data.head.clone()))?;
		Ok((graph, head))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(json: &str) -> GraphData {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn builds_named_and_join_nodes() {
		let data = parse(
			r#"{
				"head": "start",
				"nodes": [
					{ "id": "start", "name": "start" },
					{ "id": "j" },
					{ "id": "end", "name": "end" }
				],
				"links": [
					{ "source": "start", "target": "j" },
					{ "source": "j", "target": "end" }
				]
			}"#,
		);
		let (graph, head) = GraphModel::from_data(&data).unwrap();
		assert_eq!(graph.len(), 3);
		assert_eq!(graph[head].name(), "start");
		let join = graph[head].children()[0];
		assert!(graph[join].is_join());
		assert_eq!(graph[graph[join].children()[0]].name(), "end");
	}

	#[test]
	fn unknown_links_are_skipped() {
		let data = parse(
			r#"{
				"head": "a",
				"nodes": [{ "id": "a", "name": "a" }, { "id": "a", "name": "again" }],
				"links": [{ "source": "a", "target": "missing" }]
			}"#,
		);
		let (graph, head) = GraphModel::from_data(&data).unwrap();
		assert_eq!(graph.len(), 1);
		assert_eq!(graph[head].name(), "a");
		assert_eq!(graph.edge_count(), 0);
	}

	#[test]
	fn unknown_head_is_an_error() {
		let data = parse(r#"{ "head": "nope", "nodes": [{ "id": "a", "name": "a" }] }"#);
		assert_eq!(
			GraphModel::from_data(&data).unwrap_err(),
			GraphError::UnknownDataId("nope".into())
		);
	}

	#[test]
	fn cyclic_links_are_rejected() {
		let data = parse(
			r#"{
				"head": "a",
				"nodes": [{ "id": "a", "name": "a" }, { "id": "b", "name": "b" }],
				"links": [
					{ "source": "a", "target": "b" },
					{ "source": "b", "target": "a" }
				]
			}"#,
		);
		assert!(matches!(
			GraphModel::from_data(&data),
			Err(GraphError::WouldCycle { .. })
		));
	}
}
