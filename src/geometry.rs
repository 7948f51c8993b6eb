//! Plain coordinate types shared by layout and viewport code.

use serde::{Deserialize, Serialize};

/// A position in logical, screen, or preview space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Point {
	/// Horizontal coordinate, growing to the right.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Width and height of a canvas or window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Size {
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl Size {
	/// Size of `width` by `height`.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
	/// Top-left corner.
	pub origin: Point,
	/// Extent from the origin.
	pub size: Size,
}

impl Rect {
	/// Strict containment: points on the border are outside.
	pub fn contains(&self, p: Point) -> bool {
		p.x > self.origin.x
			&& p.x < self.origin.x + self.size.width
			&& p.y > self.origin.y
			&& p.y < self.origin.y + self.size.height
	}
}
