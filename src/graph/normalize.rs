//! Join-node normalization.
//!
//! Graph-building code tends to produce more join nodes than the structure
//! needs: joins that synchronize nothing, joins with a single upstream
//! branch, and chains of joins feeding joins. [`GraphModel::normalize`]
//! removes them until none of the rules below fires anywhere reachable from
//! the head.
//!
//! The rewrite is driven by an explicit worklist. Nodes whose modification
//! counter moved since the last run seed the list together with their direct
//! neighbors; every rule that fires re-enqueues the neighborhood it touched.
//! Each firing removes one join node, so the loop ends after at most as many
//! firings as there are joins.

use std::collections::{HashSet, VecDeque};

use log::debug;
use serde::Serialize;

use super::model::{GraphModel, NodeId};
use crate::error::GraphError;

/// A reason a node is not yet in canonical form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Redundancy {
	/// Join node without children.
	DeadJoin,
	/// Join node with exactly one parent.
	PassThrough,
	/// Non-join node whose only parent is a join with fewer than two children.
	RedundantParent,
	/// Every child is a join and at least one of them has this node as its
	/// only parent.
	JoinChain,
}

/// Counters describing one [`GraphModel::normalize`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
	/// Nodes taken off the worklist and evaluated.
	pub examined: usize,
	/// Childless joins removed.
	pub dead_joins: usize,
	/// Single-parent joins spliced into their parent.
	pub pass_through: usize,
	/// Joins bypassed because their only child now hangs off the join's parents.
	pub lifted: usize,
	/// Joins merged into a parent whose children were all joins.
	pub flattened: usize,
}

impl NormalizeReport {
	/// Total number of join nodes removed.
	pub fn removed(&self) -> usize {
		self.dead_joins + self.pass_through + self.lifted + self.flattened
	}
}

/// FIFO of node ids restricted to the graph reachable at the start of a run.
struct Worklist {
	queue: VecDeque<NodeId>,
	queued: HashSet<NodeId>,
	scope: HashSet<NodeId>,
}

impl Worklist {
	fn new(scope: HashSet<NodeId>) -> Self {
		Self {
			queue: VecDeque::new(),
			queued: HashSet::new(),
			scope,
		}
	}

	fn push(&mut self, id: NodeId) {
		if self.scope.contains(&id) && self.queued.insert(id) {
			self.queue.push_back(id);
		}
	}

	fn pop(&mut self) -> Option<NodeId> {
		let id = self.queue.pop_front()?;
		self.queued.remove(&id);
		Some(id)
	}
}

impl GraphModel {
	/// Reduces the graph reachable from `head` to canonical form.
	///
	/// The head itself is never removed. Rewriting never changes which of the
	/// surviving nodes are reachable, so the reachable set is computed once.
	pub fn normalize(&mut self, head: NodeId) -> Result<NormalizeReport, GraphError> {
		self.require(head)?;
		let order = self.reachable(head);
		let mut work = Worklist::new(order.iter().copied().collect());

		for &id in &order {
			let node = &self[id];
			if !node.is_clean() {
				let neighbors: Vec<NodeId> =
					node.parents().iter().chain(node.children()).copied().collect();
				work.push(id);
				for neighbor in neighbors {
					work.push(neighbor);
				}
			}
		}

		let mut report = NormalizeReport::default();
		while let Some(id) = work.pop() {
			if !self.contains(id) {
				continue;
			}
			report.examined += 1;
			// drive this node to a local fixpoint before moving on
			while let Some(rule) = self.redundancy(head, id) {
				self.apply(id, rule, &mut work, &mut report);
				if !self.contains(id) {
					break;
				}
			}
			if let Some(node) = self.node_mut(id) {
				node.mark_normalized();
			}
		}

		debug!(
			"join-graph: normalized {} nodes, removed {} joins ({} dead, {} pass-through, {} lifted, {} flattened)",
			report.examined,
			report.removed(),
			report.dead_joins,
			report.pass_through,
			report.lifted,
			report.flattened
		);
		Ok(report)
	}

	/// Every reachable node where a normalization rule would still fire.
	/// Empty exactly when the graph is canonical.
	pub fn redundancies(&self, head: NodeId) -> Vec<(NodeId, Redundancy)> {
		self.reachable(head)
			.into_iter()
			.filter_map(|id| self.redundancy(head, id).map(|r| (id, r)))
			.collect()
	}

	fn redundancy(&self, head: NodeId, id: NodeId) -> Option<Redundancy> {
		let node = self.node(id)?;
		if node.is_join() && id != head {
			if node.children().is_empty() {
				return Some(Redundancy::DeadJoin);
			}
			if node.parents().len() == 1 {
				return Some(Redundancy::PassThrough);
			}
		}
		if let [parent] = node.parents() {
			if !node.is_join() && *parent != head {
				if let Some(parent_node) = self.node(*parent) {
					if parent_node.is_join() && parent_node.children().len() < 2 {
						return Some(Redundancy::RedundantParent);
					}
				}
			}
		}
		if self.flattenable_children(id).next().is_some() {
			return Some(Redundancy::JoinChain);
		}
		None
	}

	/// Children of `id` that can be merged into it. Yields nothing unless every
	/// child is a join.
	fn flattenable_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		let children = self.node(id).map(|n| n.children()).unwrap_or_default();
		let all_joins = !children.is_empty()
			&& children
				.iter()
				.all(|&c| self.node(c).is_some_and(|n| n.is_join()));
		children
			.iter()
			.copied()
			.filter(move |_| all_joins)
			.filter(move |&c| self.node(c).is_some_and(|n| n.parents() == [id]))
	}

	fn apply(
		&mut self,
		id: NodeId,
		rule: Redundancy,
		work: &mut Worklist,
		report: &mut NormalizeReport,
	) {
		match rule {
			Redundancy::DeadJoin => {
				self.dissolve(id, work);
				report.dead_joins += 1;
			}
			Redundancy::PassThrough => {
				let parent = self[id].parents()[0];
				self.splice_into(parent, id, work);
				report.pass_through += 1;
			}
			Redundancy::RedundantParent => {
				let join = self[id].parents()[0];
				let grandparents = self[join].parents().to_vec();
				for grandparent in grandparents {
					let position = self.unlink(grandparent, join);
					self.link_at(grandparent, id, position);
				}
				self.dissolve(join, work);
				report.lifted += 1;
			}
			Redundancy::JoinChain => {
				let merged: Vec<NodeId> = self.flattenable_children(id).collect();
				for child in merged {
					self.splice_into(id, child, work);
					report.flattened += 1;
				}
			}
		}
		self.enqueue_neighborhood(id, work);
	}

	/// Replaces `join` in `parent`'s child list with the join's own children,
	/// in order, then removes the join.
	fn splice_into(&mut self, parent: NodeId, join: NodeId, work: &mut Worklist) {
		let children = self[join].children().to_vec();
		let mut position = self.unlink(parent, join);
		for child in children {
			if self.link_at(parent, child, position) {
				position = position.map(|p| p + 1);
			}
		}
		self.dissolve(join, work);
	}

	/// Removes a node and enqueues everything that was adjacent to it.
	fn dissolve(&mut self, id: NodeId, work: &mut Worklist) {
		let Some(node) = self.node(id) else {
			return;
		};
		let neighbors: Vec<NodeId> = node.parents().iter().chain(node.children()).copied().collect();
		if self.remove(id).is_ok() {
			for neighbor in neighbors {
				self.enqueue_neighborhood(neighbor, work);
			}
		}
	}

	fn enqueue_neighborhood(&self, id: NodeId, work: &mut Worklist) {
		let Some(node) = self.node(id) else {
			return;
		};
		work.push(id);
		for &neighbor in node.parents().iter().chain(node.children()) {
			work.push(neighbor);
		}
	}
}
