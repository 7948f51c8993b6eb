//! Squeeze pass: pulls nodes toward their parents vertically so related
//! branches cluster instead of spreading over the whole column.

use std::collections::{BTreeMap, HashSet};

use log::warn;
use rand::Rng;

use super::grid::LayoutPoint;
use super::result::Diagnostic;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::geometry::{Point, Size};
use crate::graph::{GraphModel, NodeId};

/// Moves each node reachable from the head's grandchildren once, by
/// `(mean parent y - y) / squeeze_factor`.
///
/// Generations are walked breadth-first starting at the head's grandchildren.
/// A node is adjusted only after all of its placed parents have settled, so
/// every move sees final parent positions. The head, and head children that
/// no grandchild leads to, keep their grid position and count as settled from
/// the start. Parents without a point are unreachable leftovers
/// and get reported instead.
pub(crate) fn squeeze<R: Rng + ?Sized>(
	graph: &GraphModel,
	head: NodeId,
	points: &mut BTreeMap<NodeId, LayoutPoint>,
	bounds: Size,
	config: &LayoutConfig,
	rng: &mut R,
	diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), LayoutError> {
	let Some(head_node) = graph.node(head) else {
		return Ok(());
	};
	let mut generation = Vec::new();
	for &child in head_node.children() {
		if let Some(node) = graph.node(child) {
			extend_unique(&mut generation, node.children());
		}
	}

	let adjustable = descendants(graph, &generation);
	let mut settled: HashSet<NodeId> = HashSet::from([head]);
	for &child in head_node.children() {
		if !adjustable.contains(&child) {
			settled.insert(child);
		}
	}

	let mut stale = HashSet::new();
	while !generation.is_empty() {
		let mut next = Vec::new();
		for &id in &generation {
			if settled.contains(&id) {
				continue;
			}
			let Some(node) = graph.node(id) else {
				continue;
			};
			if !points.contains_key(&id) {
				warn!("join-graph: unknown node {id} during squeeze");
				continue;
			}

			let mut placed_parents = Vec::with_capacity(node.parents().len());
			for &parent in node.parents() {
				if points.contains_key(&parent) {
					placed_parents.push(parent);
				} else if stale.insert((parent, id)) {
					diagnostics.push(Diagnostic::StaleParent { parent, child: id });
				}
			}
			if !placed_parents.iter().all(|p| settled.contains(p)) {
				// reached again once the last parent settles
				continue;
			}

			let mut total = 0.0;
			for parent in &placed_parents {
				if let Some(point) = points.get_mut(parent) {
					total += point.resolve(bounds, config, rng)?.y;
				}
			}
			if let Some(point) = points.get_mut(&id) {
				let current = point.resolve(bounds, config, rng)?;
				if !placed_parents.is_empty() {
					let mean = total / placed_parents.len() as f64;
					let moved = current.y + (mean - current.y) / config.squeeze_factor;
					point.set_position(Point::new(current.x, moved));
				}
			}
			settled.insert(id);
			extend_unique(&mut next, node.children());
		}
		generation = next;
	}
	Ok(())
}

/// `roots` and everything below them.
fn descendants(graph: &GraphModel, roots: &[NodeId]) -> HashSet<NodeId> {
	let mut seen = HashSet::new();
	let mut stack = roots.to_vec();
	while let Some(id) = stack.pop() {
		if !seen.insert(id) {
			continue;
		}
		if let Some(node) = graph.node(id) {
			stack.extend(node.children().iter().copied());
		}
	}
	seen
}

fn extend_unique(list: &mut Vec<NodeId>, items: &[NodeId]) {
	for &item in items {
		if !list.contains(&item) {
			list.push(item);
		}
	}
}
