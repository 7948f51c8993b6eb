//! Column and row assignment.
//!
//! A depth-first walk from the head gives every node a column one past the
//! column of the parent it was reached from. When a node turns up again on a
//! deeper path it moves right along with everything below it, so every edge
//! ends in a strictly greater column than it starts. Rows start out as a
//! discovery counter and are renumbered densely per column afterwards.

use std::collections::{BTreeMap, HashSet};

use log::warn;

use super::result::Diagnostic;
use crate::graph::{GraphModel, NodeId};

/// Grid cell of a node before placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Region {
	pub column: usize,
	pub row: usize,
}

struct Frame {
	id: NodeId,
	next_child: usize,
}

/// Assigns provisional regions to every node reachable from `head`.
///
/// The walk keeps an explicit stack of frames so it visits nodes in the same
/// order a recursive pre-order traversal would, without its depth limit.
pub(crate) fn assign_regions(
	graph: &GraphModel,
	head: NodeId,
	diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<NodeId, Region> {
	let mut regions = BTreeMap::new();
	let mut next_row = 1;
	regions.insert(head, Region { column: 1, row: next_row });
	next_row += 1;

	let mut stack = vec![Frame { id: head, next_child: 0 }];
	while let Some(frame) = stack.last_mut() {
		let parent = frame.id;
		let index = frame.next_child;
		frame.next_child += 1;

		let child = graph
			.node(parent)
			.and_then(|node| node.children().get(index).copied());
		let Some(child) = child else {
			stack.pop();
			continue;
		};
		if !graph.contains(child) {
			warn!("join-graph: {parent} is connected to an unknown node {child}");
			diagnostics.push(Diagnostic::DanglingEdge { parent, child });
			continue;
		}

		let column = regions.get(&parent).map_or(1, |r: &Region| r.column) + 1;
		match regions.get(&child) {
			None => {
				regions.insert(child, Region { column, row: next_row });
				next_row += 1;
				stack.push(Frame {
					id: child,
					next_child: 0,
				});
			}
			Some(existing) if column > existing.column => {
				let delta = column - existing.column;
				shift_right(graph, &mut regions, child, delta);
			}
			Some(_) => {}
		}
	}
	regions
}

/// Moves `start` and its placed descendants `delta` columns right, each at
/// most once.
fn shift_right(
	graph: &GraphModel,
	regions: &mut BTreeMap<NodeId, Region>,
	start: NodeId,
	delta: usize,
) {
	let mut shifted = HashSet::from([start]);
	let mut stack = vec![start];
	while let Some(id) = stack.pop() {
		if let Some(region) = regions.get_mut(&id) {
			region.column += delta;
		}
		let Some(node) = graph.node(id) else {
			continue;
		};
		for &child in node.children() {
			if regions.contains_key(&child) && shifted.insert(child) {
				stack.push(child);
			}
		}
	}
}

/// Renumbers rows per column to `1..=k`, keeping their relative order.
/// Returns the row count of every occupied column.
pub(crate) fn compact_rows(regions: &mut BTreeMap<NodeId, Region>) -> BTreeMap<usize, usize> {
	let mut columns: BTreeMap<usize, Vec<(usize, NodeId)>> = BTreeMap::new();
	for (&id, region) in regions.iter() {
		columns.entry(region.column).or_default().push((region.row, id));
	}

	let mut counts = BTreeMap::new();
	for (column, mut entries) in columns {
		entries.sort_unstable();
		for (row, (_, id)) in entries.iter().enumerate() {
			if let Some(region) = regions.get_mut(id) {
				region.row = row + 1;
			}
		}
		counts.insert(column, entries.len());
	}
	counts
}
