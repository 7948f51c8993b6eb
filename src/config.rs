//! Tunables for layout and viewport behavior.
//!
//! Every field has a default, so a configuration document only needs to name
//! the values it wants to change.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

const POSITIVE: &str = "must be a finite number above zero";
const NON_NEGATIVE: &str = "must be a finite number, zero or more";

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), LayoutError> {
	if value.is_finite() && value > 0.0 {
		Ok(())
	} else {
		Err(LayoutError::InvalidConfig { field, reason: POSITIVE })
	}
}

fn non_negative(field: &'static str, value: f64) -> Result<(), LayoutError> {
	if value.is_finite() && value >= 0.0 {
		Ok(())
	} else {
		Err(LayoutError::InvalidConfig { field, reason: NON_NEGATIVE })
	}
}

/// Layout configuration.
///
/// All distances are in logical canvas units.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Upper bound on the random offset applied to each grid point.
	pub grid_softness: f64,
	/// Points are never placed closer than this to the canvas edge.
	pub edge_margin: f64,
	/// Divisor for the squeeze pass. Smaller values cluster tighter.
	pub squeeze_factor: f64,
	/// Above this many nodes labels are only drawn on hover.
	pub max_nodes_draw_all_names: usize,
	/// Seed for the jitter generator. `None` seeds from entropy.
	pub seed: Option<u64>,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			grid_softness: 50.0,
			edge_margin: 50.0,
			squeeze_factor: 2.0,
			max_nodes_draw_all_names: 20,
			seed: None,
		}
	}
}

impl LayoutConfig {
	/// Rejects values that would make placement or squeezing produce
	/// non-finite coordinates.
	pub fn validate(&self) -> Result<(), LayoutError> {
		non_negative("grid_softness", self.grid_softness)?;
		non_negative("edge_margin", self.edge_margin)?;
		positive("squeeze_factor", self.squeeze_factor)
	}
}

/// Zoom and hit-testing configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Smallest zoom factor a step may reach.
	pub min_zoom: f64,
	/// Largest zoom factor a step may reach.
	pub max_zoom: f64,
	/// Amount added or removed per zoom step.
	pub zoom_step: f64,
	/// Screen distance within which a point counts as under the pointer.
	pub select_tolerance: f64,
	/// Width of the preview window; its height follows the main aspect ratio.
	pub preview_width: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.8,
			max_zoom: 5.0,
			zoom_step: 0.1,
			select_tolerance: 25.0,
			preview_width: 640.0,
		}
	}
}

impl ViewportConfig {
	/// Rejects zoom bounds that can not be satisfied and non-finite values.
	pub fn validate(&self) -> Result<(), LayoutError> {
		positive("min_zoom", self.min_zoom)?;
		positive("max_zoom", self.max_zoom)?;
		if self.min_zoom > self.max_zoom {
			return Err(LayoutError::InvalidConfig {
				field: "min_zoom",
				reason: "must not exceed max_zoom",
			});
		}
		positive("zoom_step", self.zoom_step)?;
		non_negative("select_tolerance", self.select_tolerance)?;
		positive("preview_width", self.preview_width)
	}
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
	/// Natural canvas width.
	pub width: f64,
	/// Natural canvas height.
	pub height: f64,
	/// Placement and squeeze tunables.
	pub layout: LayoutConfig,
	/// Zoom and picking tunables.
	pub viewport: ViewportConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			width: 1440.0,
			height: 900.0,
			layout: LayoutConfig::default(),
			viewport: ViewportConfig::default(),
		}
	}
}

impl Config {
	/// Validates the canvas size and both sections.
	pub fn validate(&self) -> Result<(), LayoutError> {
		positive("width", self.width)?;
		positive("height", self.height)?;
		self.layout.validate()?;
		self.viewport.validate()
	}
}
