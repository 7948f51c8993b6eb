//! Layout entry point tying region assignment, placement and squeezing
//! together.

use std::collections::BTreeMap;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::grid::LayoutPoint;
use super::regions::{assign_regions, compact_rows};
use super::result::LayoutResult;
use super::squeeze::squeeze;
use crate::config::{LayoutConfig, positive};
use crate::error::LayoutError;
use crate::geometry::Size;
use crate::graph::{GraphModel, NodeId};

/// Lays out the graph reachable from `head` on a canvas of `bounds`.
///
/// Only `graph` is read; nothing from a previous layout carries over. With
/// `config.seed` set the result is reproducible. Invalid configuration values
/// and canvases without area are rejected up front.
pub fn compute_layout(
	graph: &GraphModel,
	head: NodeId,
	bounds: Size,
	config: &LayoutConfig,
) -> Result<LayoutResult, LayoutError> {
	if !graph.contains(head) {
		return Err(LayoutError::UnknownHead(head));
	}
	config.validate()?;
	positive("width", bounds.width)?;
	positive("height", bounds.height)?;
	let mut rng = match config.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	};

	let mut diagnostics = Vec::new();
	let mut regions = assign_regions(graph, head, &mut diagnostics);
	let rows = compact_rows(&mut regions);
	// the highest column, not the number of occupied ones: shifting can leave gaps
	let columns = rows.keys().next_back().copied().unwrap_or(1);

	let mut points: BTreeMap<NodeId, LayoutPoint> = regions
		.into_iter()
		.map(|(id, region)| {
			let in_column = rows.get(&region.column).copied().unwrap_or(1);
			(
				id,
				LayoutPoint::pending(region.column, region.row, columns, in_column),
			)
		})
		.collect();

	squeeze(
		graph,
		head,
		&mut points,
		bounds,
		config,
		&mut rng,
		&mut diagnostics,
	)?;
	for point in points.values_mut() {
		point.resolve(bounds, config, &mut rng)?;
	}

	debug!(
		"join-graph: laid out {} nodes over {} columns ({} diagnostics)",
		points.len(),
		columns,
		diagnostics.len()
	);
	let draw_all_names = points.len() <= config.max_nodes_draw_all_names;
	Ok(LayoutResult::new(
		bounds,
		points,
		draw_all_names,
		columns,
		diagnostics,
	))
}
