//! Immutable layout snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use super::grid::LayoutPoint;
use crate::geometry::{Point, Size};
use crate::graph::{GraphModel, NodeId};
use crate::viewport::{ViewState, nearest_point};

/// Dragged points are kept this far inside the left and top edges.
const DRAG_MIN: f64 = 10.0;
/// Room kept free right of a dragged point, for its dot and label.
const DRAG_RIGHT_INSET: f64 = 25.0;
/// Room kept free below a dragged point.
const DRAG_BOTTOM_INSET: f64 = 45.0;

/// A structural inconsistency that layout worked around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
	/// `parent` lists a child id that is not in the graph.
	DanglingEdge {
		/// Node holding the dangling reference.
		parent: NodeId,
		/// The missing child id.
		child: NodeId,
	},
	/// `child` lists a parent that is not reachable from the head. Call
	/// [`GraphModel::prune_unreachable`] to drop it.
	StaleParent {
		/// The unreachable parent.
		parent: NodeId,
		/// Placed node that still lists it.
		child: NodeId,
	},
}

/// Positions for every node reachable from the head, plus the view state the
/// layout was published with.
///
/// Snapshots are never changed in place; the `with_*` methods return a new one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutResult {
	bounds: Size,
	points: BTreeMap<NodeId, LayoutPoint>,
	draw_all_names: bool,
	view: ViewState,
	columns: usize,
	diagnostics: Vec<Diagnostic>,
}

impl LayoutResult {
	pub(crate) fn new(
		bounds: Size,
		points: BTreeMap<NodeId, LayoutPoint>,
		draw_all_names: bool,
		columns: usize,
		diagnostics: Vec<Diagnostic>,
	) -> Self {
		Self {
			bounds,
			points,
			draw_all_names,
			view: ViewState::default(),
			columns,
			diagnostics,
		}
	}

	/// A layout with no points, used before the first graph arrives.
	pub fn empty(bounds: Size) -> Self {
		Self::new(bounds, BTreeMap::new(), true, 0, Vec::new())
	}

	/// Natural size of the logical canvas.
	pub fn bounds(&self) -> Size {
		self.bounds
	}

	/// Every placed node, by id.
	pub fn points(&self) -> &BTreeMap<NodeId, LayoutPoint> {
		&self.points
	}

	/// Grid cell and placement of `id`.
	pub fn point(&self, id: NodeId) -> Option<&LayoutPoint> {
		self.points.get(&id)
	}

	/// Resolved logical coordinate of `id`.
	pub fn position(&self, id: NodeId) -> Option<Point> {
		self.point(id).and_then(LayoutPoint::position)
	}

	/// Number of placed nodes.
	pub fn len(&self) -> usize {
		self.points.len()
	}

	/// True when nothing was placed.
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	/// Whether every label should be drawn, or only the hovered one.
	pub fn draw_all_names(&self) -> bool {
		self.draw_all_names
	}

	/// Zoom and origin this snapshot was published with.
	pub fn view(&self) -> ViewState {
		self.view
	}

	/// Number of column slots across the canvas.
	pub fn columns(&self) -> usize {
		self.columns
	}

	/// Number of nodes placed in `column`.
	pub fn rows_in_column(&self, column: usize) -> usize {
		self.points.values().filter(|p| p.x_region == column).count()
	}

	/// Inconsistencies found while laying out.
	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}

	/// Copy of this snapshot carrying a different view state.
	pub fn with_view(&self, view: ViewState) -> Self {
		Self {
			view,
			..self.clone()
		}
	}

	/// Copy of this snapshot with `id` pinned at `position`, kept inside the
	/// canvas. Returns `None` if `id` has no point.
	pub fn with_point_moved(&self, id: NodeId, position: Point) -> Option<Self> {
		if !self.points.contains_key(&id) {
			return None;
		}
		let x = position
			.x
			.min(self.bounds.width - DRAG_RIGHT_INSET)
			.max(DRAG_MIN);
		let y = position
			.y
			.min(self.bounds.height - DRAG_BOTTOM_INSET)
			.max(DRAG_MIN);
		let mut moved = self.clone();
		if let Some(point) = moved.points.get_mut(&id) {
			point.set_position(Point::new(x, y));
		}
		Some(moved)
	}

	/// Logical start and end of every edge between placed nodes.
	pub fn edges<'a>(
		&'a self,
		graph: &'a GraphModel,
	) -> impl Iterator<Item = (NodeId, Point, NodeId, Point)> + 'a {
		self.points.iter().flat_map(move |(&id, point)| {
			let from = point.position();
			graph
				.node(id)
				.map(|node| node.children())
				.unwrap_or_default()
				.iter()
				.filter_map(move |&child| {
					Some((id, from?, child, self.position(child)?))
				})
		})
	}

	/// Node drawn closest to a screen position under `view`, within
	/// `tolerance` on both axes.
	pub fn nearest(&self, view: ViewState, screen: Point, tolerance: f64) -> Option<NodeId> {
		let positions = self
			.points
			.iter()
			.filter_map(|(&id, p)| p.position().map(|pos| (id, pos)));
		nearest_point(positions, view, screen, tolerance)
	}
}
