//! Soft-grid placement.
//!
//! Each axis is split into equal slots, one per region. A point sits at the
//! center of its slot, nudged by a random offset that is always smaller than
//! half a slot, then kept away from the canvas edges.

use rand::Rng;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::geometry::{Point, Size};

/// Coordinate for `region` (1-based) out of `total` slots spanning `extent`.
pub fn soft_grid_point<R: Rng + ?Sized>(
	region: usize,
	total: usize,
	extent: f64,
	config: &LayoutConfig,
	rng: &mut R,
) -> Result<f64, LayoutError> {
	if region < 1 || region > total {
		return Err(LayoutError::InvalidRegion { region, total });
	}
	let slot = extent / total as f64;
	let mut pos = slot / 2.0 + (region - 1) as f64 * slot;

	let reach = config.grid_softness.min(slot / 2.0);
	let softness = if reach > 0.0 {
		rng.gen_range(0.0..reach)
	} else {
		0.0
	};
	let margin = config.edge_margin;
	if pos < margin || (pos < extent - margin && rng.gen_bool(0.5)) {
		pos += softness;
	} else {
		pos -= softness;
	}

	// canvases narrower than both margins collapse onto the center line
	let low = margin.min(extent / 2.0);
	let high = (extent - margin).max(extent / 2.0);
	Ok(pos.clamp(low, high))
}

/// Where a point is in its lifecycle.
///
/// A pending point carries the region populations needed to place it. Once
/// resolved only the coordinate remains.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
	/// Region known, coordinate not computed yet.
	Pending {
		/// Number of column slots across the canvas.
		columns: usize,
		/// Number of rows in this point's column.
		rows: usize,
	},
	/// Final logical coordinate.
	Resolved(Point),
}

/// Grid cell and placement of one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutPoint {
	/// 1-based column, increasing along every edge.
	pub x_region: usize,
	/// 1-based row within the column.
	pub y_region: usize,
	placement: Placement,
}

impl LayoutPoint {
	pub(crate) fn pending(x_region: usize, y_region: usize, columns: usize, rows: usize) -> Self {
		Self {
			x_region,
			y_region,
			placement: Placement::Pending { columns, rows },
		}
	}

	/// Current lifecycle state.
	pub fn placement(&self) -> Placement {
		self.placement
	}

	/// The coordinate, if it has been computed.
	pub fn position(&self) -> Option<Point> {
		match self.placement {
			Placement::Resolved(p) => Some(p),
			Placement::Pending { .. } => None,
		}
	}

	/// Computes the coordinate on first use and returns the cached one after.
	/// The first column is pinned to the left margin.
	pub(crate) fn resolve<R: Rng + ?Sized>(
		&mut self,
		bounds: Size,
		config: &LayoutConfig,
		rng: &mut R,
	) -> Result<Point, LayoutError> {
		let Placement::Pending { columns, rows } = self.placement else {
			return Ok(self.position().unwrap_or_default());
		};
		let x = if self.x_region == 1 {
			config.edge_margin.min(bounds.width / 2.0)
		} else {
			soft_grid_point(self.x_region, columns, bounds.width, config, rng)?
		};
		let y = soft_grid_point(self.y_region, rows, bounds.height, config, rng)?;
		let position = Point::new(x, y);
		self.placement = Placement::Resolved(position);
		Ok(position)
	}

	pub(crate) fn set_position(&mut self, position: Point) {
		self.placement = Placement::Resolved(position);
	}
}
