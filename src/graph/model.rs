//! Arena-backed execution graph.
//!
//! Nodes live in a slot vector and refer to each other by [`NodeId`]. Every
//! edge is stored twice, once in the parent's child list and once in the
//! child's parent list, and the two lists are only ever changed together.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Stable identity of a node inside a [`GraphModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
	/// Slot index of this id in its arena.
	pub fn index(self) -> usize {
		self.0 as usize
	}

	#[cfg(test)]
	pub(crate) fn from_raw(raw: u32) -> Self {
		Self(raw)
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A unit of work, or a synthetic join point when it has no name.
#[derive(Clone, Debug)]
pub struct Node {
	name: Option<String>,
	parents: Vec<NodeId>,
	children: Vec<NodeId>,
	/// Bumped on every edge change touching this node.
	modification_count: u64,
	/// Value of `modification_count` when normalization last left this node.
	last_normalized: Option<u64>,
}

impl Node {
	fn new(name: Option<String>) -> Self {
		Self {
			name,
			parents: Vec::with_capacity(2),
			children: Vec::with_capacity(2),
			modification_count: 0,
			last_normalized: None,
		}
	}

	/// Display name. Join nodes have no name and report an empty string.
	pub fn name(&self) -> &str {
		self.name.as_deref().unwrap_or("")
	}

	/// Whether this node is a synchronization point rather than a unit of work.
	pub fn is_join(&self) -> bool {
		self.name.is_none()
	}

	/// Child ids in execution order.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	/// Parent ids in the order the edges were added.
	pub fn parents(&self) -> &[NodeId] {
		&self.parents
	}

	/// Number of edge changes that touched this node.
	pub fn modification_count(&self) -> u64 {
		self.modification_count
	}

	/// Modification count seen by the last normalization, if any ran.
	pub fn last_normalized(&self) -> Option<u64> {
		self.last_normalized
	}

	/// True when nothing changed since normalization last examined the node.
	pub(crate) fn is_clean(&self) -> bool {
		self.last_normalized == Some(self.modification_count)
	}

	pub(crate) fn mark_normalized(&mut self) {
		self.last_normalized = Some(self.modification_count);
	}

	fn touch(&mut self) {
		self.modification_count += 1;
	}
}

/// Outcome of [`GraphModel::prune_unreachable`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
	/// Edges that led from an unreachable node into the reachable graph.
	pub edges_dropped: usize,
	/// Unreachable nodes whose slots were freed.
	pub nodes_freed: usize,
}

/// Owns every node. The graph proper is whatever is reachable from a head.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	slots: Vec<Option<Node>>,
	live: usize,
}

impl GraphModel {
	/// Empty arena.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a named unit of work.
	pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
		self.insert(Node::new(Some(name.into())))
	}

	/// Adds a synthetic join node.
	pub fn add_join(&mut self) -> NodeId {
		self.insert(Node::new(None))
	}

	fn insert(&mut self, node: Node) -> NodeId {
		let id = NodeId(self.slots.len() as u32);
		self.slots.push(Some(node));
		self.live += 1;
		id
	}

	/// Number of live nodes, reachable or not.
	pub fn len(&self) -> usize {
		self.live
	}

	/// True when no live node is left.
	pub fn is_empty(&self) -> bool {
		self.live == 0
	}

	/// Whether `id` names a live node.
	pub fn contains(&self, id: NodeId) -> bool {
		self.node(id).is_some()
	}

	/// The live node behind `id`.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.slots.get(id.index()).and_then(Option::as_ref)
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.slots.get_mut(id.index()).and_then(Option::as_mut)
	}

	pub(crate) fn require(&self, id: NodeId) -> Result<&Node, GraphError> {
		self.node(id).ok_or(GraphError::UnknownNode(id))
	}

	/// Ids of all live nodes in allocation order.
	pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.slots
			.iter()
			.enumerate()
			.filter(|(_, slot)| slot.is_some())
			.map(|(i, _)| NodeId(i as u32))
	}

	/// All `(parent, child)` edges in the arena.
	pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
		self.ids().flat_map(move |id| {
			self.node(id)
				.into_iter()
				.flat_map(move |node| node.children.iter().map(move |&c| (id, c)))
		})
	}

	/// Number of `(parent, child)` edges in the arena.
	pub fn edge_count(&self) -> usize {
		self.edges().count()
	}

	/// Makes `child` a child of `parent`.
	///
	/// Returns `Ok(false)` when the edge already exists. Edges that would close
	/// a cycle are rejected so the graph stays a DAG.
	pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<bool, GraphError> {
		let parent_node = self.require(parent)?;
		self.require(child)?;
		if parent == child {
			return Err(GraphError::SelfLoop(parent));
		}
		if parent_node.children.contains(&child) {
			return Ok(false);
		}
		if self.is_reachable(child, parent) {
			return Err(GraphError::WouldCycle { parent, child });
		}
		Ok(self.link_at(parent, child, None))
	}

	/// Inserts an edge without validation, at `position` in the parent's child
	/// list (or at the end). Returns false if the edge already existed.
	pub(crate) fn link_at(&mut self, parent: NodeId, child: NodeId, position: Option<usize>) -> bool {
		let Some(parent_node) = self.node_mut(parent) else {
			return false;
		};
		if parent_node.children.contains(&child) {
			return false;
		}
		match position {
			Some(pos) if pos < parent_node.children.len() => parent_node.children.insert(pos, child),
			_ => parent_node.children.push(child),
		}
		parent_node.touch();
		if let Some(child_node) = self.node_mut(child) {
			if !child_node.parents.contains(&parent) {
				child_node.parents.push(parent);
			}
			child_node.touch();
		}
		true
	}

	/// Removes the edge in both directions. Returns the position `child` held
	/// in the parent's child list.
	pub(crate) fn unlink(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
		let mut position = None;
		if let Some(parent_node) = self.node_mut(parent) {
			if let Some(pos) = parent_node.children.iter().position(|&c| c == child) {
				parent_node.children.remove(pos);
				parent_node.touch();
				position = Some(pos);
			}
		}
		if let Some(child_node) = self.node_mut(child) {
			if let Some(pos) = child_node.parents.iter().position(|&p| p == parent) {
				child_node.parents.remove(pos);
				child_node.touch();
			}
		}
		position
	}

	/// Unlinks `id` from all of its parents and children. Descendants are left
	/// in place; anything orphaned is the caller's concern.
	pub fn detach(&mut self, id: NodeId) -> Result<(), GraphError> {
		let node = self.require(id)?;
		let parents = node.parents.clone();
		let children = node.children.clone();
		for parent in parents {
			self.unlink(parent, id);
		}
		for child in children {
			self.unlink(id, child);
		}
		Ok(())
	}

	/// Detaches `id` and frees its slot. The id is never reused.
	pub fn remove(&mut self, id: NodeId) -> Result<Node, GraphError> {
		self.detach(id)?;
		let node = self.slots[id.index()]
			.take()
			.ok_or(GraphError::UnknownNode(id))?;
		self.live -= 1;
		Ok(node)
	}

	/// Whether `to` can be reached from `from` along child edges.
	pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
		let mut seen = HashSet::new();
		let mut stack = vec![from];
		while let Some(id) = stack.pop() {
			if id == to {
				return true;
			}
			if !seen.insert(id) {
				continue;
			}
			if let Some(node) = self.node(id) {
				stack.extend(node.children.iter().copied());
			}
		}
		false
	}

	/// Nodes reachable from `head`, in depth-first pre-order. Dangling child
	/// ids are not included.
	pub fn reachable(&self, head: NodeId) -> Vec<NodeId> {
		let mut order = Vec::new();
		let mut seen = HashSet::new();
		let mut stack = vec![head];
		while let Some(id) = stack.pop() {
			let Some(node) = self.node(id) else {
				continue;
			};
			if !seen.insert(id) {
				continue;
			}
			order.push(id);
			stack.extend(node.children.iter().rev().copied());
		}
		order
	}

	/// Drops every node that can not be reached from `head`, along with the
	/// stale parent references those nodes left on reachable children.
	pub fn prune_unreachable(&mut self, head: NodeId) -> Result<PruneReport, GraphError> {
		self.require(head)?;
		let reachable: HashSet<NodeId> = self.reachable(head).into_iter().collect();
		let orphans: Vec<NodeId> = self.ids().filter(|id| !reachable.contains(id)).collect();

		let mut report = PruneReport::default();
		for id in orphans {
			if let Some(node) = self.node(id) {
				report.edges_dropped += node
					.children
					.iter()
					.filter(|c| reachable.contains(c))
					.count();
			}
			self.remove(id)?;
			report.nodes_freed += 1;
		}
		Ok(report)
	}

	/// Adds a child id to `parent` without the reverse edge.
	#[cfg(test)]
	pub(crate) fn inject_dangling_child(&mut self, parent: NodeId, child: NodeId) {
		if let Some(node) = self.node_mut(parent) {
			node.children.push(child);
		}
	}
}

impl std::ops::Index<NodeId> for GraphModel {
	type Output = Node;

	fn index(&self, id: NodeId) -> &Node {
		match self.node(id) {
			Some(node) => node,
			None => panic!("no node {id} in graph"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn join_nodes_have_no_name() {
		let mut graph = GraphModel::new();
		let join = graph.add_join();
		let task = graph.add_node("fetch");
		assert!(graph[join].is_join());
		assert!(graph[join].name().is_empty());
		assert!(!graph[task].is_join());
		assert_eq!(graph[task].name(), "fetch");
	}

	#[test]
	fn attach_registers_both_directions() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		assert_eq!(graph.attach(a, b), Ok(true));
		assert_eq!(graph[a].children(), &[b]);
		assert_eq!(graph[b].parents(), &[a]);
		assert_eq!(graph[a].modification_count(), 1);
		assert_eq!(graph[b].modification_count(), 1);
	}

	#[test]
	fn normalization_records_its_watermark() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		graph.attach(a, b).unwrap();
		assert_eq!(graph[a].last_normalized(), None);

		graph.normalize(a).unwrap();
		assert_eq!(graph[a].last_normalized(), Some(graph[a].modification_count()));
		assert_eq!(graph[b].last_normalized(), Some(1));

		let c = graph.add_node("c");
		graph.attach(b, c).unwrap();
		assert_eq!(graph[b].modification_count(), 2);
		assert_eq!(graph[b].last_normalized(), Some(1));
	}

	#[test]
	fn attach_is_idempotent() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		graph.attach(a, b).unwrap();
		assert_eq!(graph.attach(a, b), Ok(false));
		assert_eq!(graph[a].children().len(), 1);
		assert_eq!(graph[b].parents().len(), 1);
		assert_eq!(graph[a].modification_count(), 1);
	}

	#[test]
	fn attach_rejects_cycles() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		let c = graph.add_node("c");
		graph.attach(a, b).unwrap();
		graph.attach(b, c).unwrap();
		assert_eq!(
			graph.attach(c, a),
			Err(GraphError::WouldCycle { parent: c, child: a })
		);
		assert_eq!(graph.attach(a, a), Err(GraphError::SelfLoop(a)));
		assert_eq!(graph.edge_count(), 2);
	}

	#[test]
	fn attach_unknown_node() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let ghost = NodeId::from_raw(7);
		assert_eq!(graph.attach(a, ghost), Err(GraphError::UnknownNode(ghost)));
	}

	#[test]
	fn detach_unlinks_everything() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let join = graph.add_join();
		let b = graph.add_node("b");
		graph.attach(a, join).unwrap();
		graph.attach(join, b).unwrap();

		graph.detach(join).unwrap();
		assert!(graph[a].children().is_empty());
		assert!(graph[b].parents().is_empty());
		assert!(graph[join].children().is_empty());
		assert!(graph[join].parents().is_empty());
		assert!(graph.contains(join));
	}

	#[test]
	fn remove_frees_slot() {
		let mut graph = GraphModel::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		graph.attach(a, b).unwrap();
		graph.remove(b).unwrap();
		assert!(!graph.contains(b));
		assert_eq!(graph.len(), 1);
		assert!(graph[a].children().is_empty());
		assert_eq!(graph.remove(b).unwrap_err(), GraphError::UnknownNode(b));
	}

	#[test]
	fn reachable_is_preorder() {
		let mut graph = GraphModel::new();
		let head = graph.add_node("head");
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		let c = graph.add_node("c");
		graph.attach(head, a).unwrap();
		graph.attach(head, b).unwrap();
		graph.attach(a, c).unwrap();
		graph.attach(b, c).unwrap();
		assert_eq!(graph.reachable(head), vec![head, a, c, b]);
	}

	#[test]
	fn prune_drops_orphans_and_stale_parents() {
		let mut graph = GraphModel::new();
		let head = graph.add_node("head");
		let a = graph.add_node("a");
		let orphan = graph.add_node("orphan");
		graph.attach(head, a).unwrap();
		graph.attach(orphan, a).unwrap();

		let report = graph.prune_unreachable(head).unwrap();
		assert_eq!(
			report,
			PruneReport {
				edges_dropped: 1,
				nodes_freed: 1
			}
		);
		assert_eq!(graph[a].parents(), &[head]);
		assert!(!graph.contains(orphan));
	}
}
