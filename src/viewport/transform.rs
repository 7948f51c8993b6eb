//! Coordinate math between logical, screen and preview space.
//!
//! Logical space is the natural canvas a layout is computed on. Screen space
//! is the main window: logical coordinates scaled by the zoom factor and
//! shifted by the origin. Preview space is the whole zoomed canvas scaled down
//! to the preview window.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

/// Zoom factor and origin of the main window.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ViewState {
	/// 1.0 shows the canvas at its natural size.
	pub zoom_factor: f64,
	/// Top-left corner of the window in zoomed canvas coordinates.
	pub origin: Point,
}

impl Default for ViewState {
	fn default() -> Self {
		Self {
			zoom_factor: 1.0,
			origin: Point::default(),
		}
	}
}

/// Maps a logical point into main-window coordinates.
pub fn to_screen(point: Point, view: ViewState) -> Point {
	Point::new(
		point.x * view.zoom_factor - view.origin.x,
		point.y * view.zoom_factor - view.origin.y,
	)
}

/// Inverse of [`to_screen`].
pub fn screen_to_logical(screen: Point, view: ViewState) -> Point {
	Point::new(
		(screen.x + view.origin.x) / view.zoom_factor,
		(screen.y + view.origin.y) / view.zoom_factor,
	)
}

/// Maps a logical point into a preview window of size `preview`. The origin
/// plays no part: the preview always shows the whole canvas.
pub fn to_preview(point: Point, natural: Size, zoom: f64, preview: Size) -> Point {
	let (fx, fy) = preview_factors(natural, zoom, preview);
	Point::new(point.x * zoom * fx, point.y * zoom * fy)
}

/// Preview units per zoomed canvas unit, per axis.
pub(crate) fn preview_factors(natural: Size, zoom: f64, preview: Size) -> (f64, f64) {
	(
		preview.width / (natural.width * zoom),
		preview.height / (natural.height * zoom),
	)
}

/// Keeps an origin inside `[0, natural * zoom - viewport]` on both axes, so
/// the window never shows space beyond the canvas. When the zoomed canvas is
/// smaller than the window the origin is 0.
pub fn clamp_origin(x: f64, y: f64, natural: Size, zoom: f64, viewport: Size) -> Point {
	let clamp = |value: f64, extent: f64, window: f64| {
		let max = (extent * zoom - window).max(0.0);
		value.clamp(0.0, max)
	};
	Point::new(
		clamp(x, natural.width, viewport.width),
		clamp(y, natural.height, viewport.height),
	)
}

/// The key whose point is drawn closest to `screen`, considering only points
/// within `tolerance` of it on both axes.
pub fn nearest_point<K, I>(points: I, view: ViewState, screen: Point, tolerance: f64) -> Option<K>
where
	I: IntoIterator<Item = (K, Point)>,
{
	let mut best: Option<(K, f64)> = None;
	for (key, point) in points {
		let drawn = to_screen(point, view);
		if (drawn.x - screen.x).abs() > tolerance || (drawn.y - screen.y).abs() > tolerance {
			continue;
		}
		let distance = drawn.distance(screen);
		if best.as_ref().is_none_or(|&(_, d)| distance < d) {
			best = Some((key, distance));
		}
	}
	best.map(|(key, _)| key)
}
