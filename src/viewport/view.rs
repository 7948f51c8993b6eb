//! Interaction state for the main and preview windows.

use log::debug;

use super::transform::{ViewState, clamp_origin, preview_factors, screen_to_logical};
use crate::config::ViewportConfig;
use crate::geometry::{Point, Rect, Size};
use crate::graph::NodeId;
use crate::layout::LayoutResult;

/// Slack before a canvas counts as larger than the window.
const ZOOMED_SLACK: f64 = 10.0;
/// Accumulated zoom steps are compared with this much tolerance.
const ZOOM_EPSILON: f64 = 1e-9;

/// A pointer gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Gesture {
	#[default]
	Idle,
	/// Dragging empty space in the main window: the view follows the pointer.
	Panning { last: Point },
	/// Dragging a node to a new position.
	Moving { id: NodeId },
	/// Dragging the frame inside the preview window.
	PreviewPanning { last: Point },
}

/// What a pointer drag changed.
#[derive(Clone, Debug, PartialEq)]
pub enum DragOutcome {
	/// No gesture active, or the pointer did not move.
	Unchanged,
	/// The view origin moved.
	Panned,
	/// A node was moved; publish the new snapshot.
	Moved(LayoutResult),
}

/// Zoom, origin and pointer state shared by the main and preview windows.
#[derive(Clone, Debug)]
pub struct Viewport {
	config: ViewportConfig,
	window: Size,
	natural: Size,
	view: ViewState,
	draw_all_names: bool,
	highlighted: Option<NodeId>,
	gesture: Gesture,
}

impl Viewport {
	/// A viewport for a main window of size `window` showing a canvas of
	/// natural size `natural`.
	pub fn new(config: ViewportConfig, window: Size, natural: Size) -> Self {
		Self {
			config,
			window,
			natural,
			view: ViewState::default(),
			draw_all_names: true,
			highlighted: None,
			gesture: Gesture::Idle,
		}
	}

	/// Current zoom factor and origin.
	pub fn view(&self) -> ViewState {
		self.view
	}

	/// Size of the main window.
	pub fn window(&self) -> Size {
		self.window
	}

	/// Natural size of the canvas being shown.
	pub fn natural(&self) -> Size {
		self.natural
	}

	/// Node under the pointer, if any.
	pub fn highlighted(&self) -> Option<NodeId> {
		self.highlighted
	}

	/// Takes over a freshly computed layout and returns it carrying this
	/// viewport's view state. When zoomed in the view is recentered
	/// vertically.
	pub fn adopt(&mut self, result: LayoutResult) -> LayoutResult {
		self.natural = result.bounds();
		self.draw_all_names = result.draw_all_names();
		self.highlighted = None;
		self.gesture = Gesture::Idle;
		if self.is_zoomed_in() {
			self.center_vertically();
		} else {
			self.clamp();
		}
		result.with_view(self.view)
	}

	/// Whether the window shows only part of the canvas.
	pub fn is_zoomed_in(&self) -> bool {
		self.view.zoom_factor > 1.0
			|| self.natural.width > self.window.width + ZOOMED_SLACK
			|| self.natural.height > self.window.height + ZOOMED_SLACK
	}

	/// Steps the zoom up. Returns false if that would pass `max_zoom`.
	pub fn zoom_in(&mut self) -> bool {
		self.zoom_to(self.view.zoom_factor + self.config.zoom_step)
	}

	/// Steps the zoom down. Returns false if that would pass `min_zoom`.
	pub fn zoom_out(&mut self) -> bool {
		self.zoom_to(self.view.zoom_factor - self.config.zoom_step)
	}

	fn zoom_to(&mut self, zoom: f64) -> bool {
		if zoom > self.config.max_zoom + ZOOM_EPSILON || zoom < self.config.min_zoom - ZOOM_EPSILON {
			return false;
		}
		let previous = self.view.zoom_factor;
		// keep the window center steady
		let dx = self.window.width * (zoom - previous) / 2.0;
		let dy = self.window.height * (zoom - previous) / 2.0;
		self.view.zoom_factor = zoom;
		self.set_origin(self.view.origin.x + dx, self.view.origin.y + dy);
		debug!("join-graph: zoom {previous:.1} -> {zoom:.1}");
		true
	}

	/// Shifts the view by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.set_origin(self.view.origin.x + dx, self.view.origin.y + dy);
	}

	/// Centers the view vertically and scrolls back to the left edge.
	pub fn center_vertically(&mut self) {
		let mid = (self.natural.height * self.view.zoom_factor - self.window.height) / 2.0;
		self.set_origin(0.0, mid);
	}

	/// The main window changed size.
	pub fn resize(&mut self, window: Size) {
		self.window = window;
		self.clamp();
	}

	fn set_origin(&mut self, x: f64, y: f64) {
		self.view.origin = clamp_origin(x, y, self.natural, self.view.zoom_factor, self.window);
	}

	fn clamp(&mut self) {
		self.set_origin(self.view.origin.x, self.view.origin.y);
	}

	/// Whether every label is drawn.
	pub fn draw_all_names(&self) -> bool {
		self.draw_all_names
	}

	/// Flips between drawing every label and only the hovered one.
	pub fn toggle_names(&mut self) -> bool {
		self.draw_all_names = !self.draw_all_names;
		if !self.draw_all_names {
			self.highlighted = None;
		}
		self.draw_all_names
	}

	/// Whether the label of `id` should be drawn.
	pub fn should_label(&self, id: NodeId) -> bool {
		self.draw_all_names || self.highlighted == Some(id)
	}

	/// Pointer moved without a button held. Tracks the highlighted node while
	/// labels are hidden and returns whether it changed.
	pub fn hover(&mut self, layout: &LayoutResult, screen: Point) -> bool {
		if self.draw_all_names || self.gesture != Gesture::Idle {
			return false;
		}
		let hit = layout.nearest(self.view, screen, self.config.select_tolerance);
		let changed = hit != self.highlighted;
		self.highlighted = hit;
		changed
	}

	/// Starts a drag in the main window: grabs the node under the pointer, or
	/// pans the view if nothing is hit and the canvas is larger than the
	/// window. Returns the grabbed node.
	pub fn press(&mut self, layout: &LayoutResult, screen: Point) -> Option<NodeId> {
		let hit = layout.nearest(self.view, screen, self.config.select_tolerance);
		self.gesture = match hit {
			Some(id) => Gesture::Moving { id },
			None if self.is_zoomed_in() => Gesture::Panning { last: screen },
			None => Gesture::Idle,
		};
		hit
	}

	/// Continues a main window drag.
	pub fn drag_to(&mut self, layout: &LayoutResult, screen: Point) -> DragOutcome {
		match self.gesture {
			Gesture::Panning { last } => {
				if last == screen {
					return DragOutcome::Unchanged;
				}
				self.pan_by(last.x - screen.x, last.y - screen.y);
				self.gesture = Gesture::Panning { last: screen };
				DragOutcome::Panned
			}
			Gesture::Moving { id } => {
				let logical = screen_to_logical(screen, self.view);
				match layout.with_point_moved(id, logical) {
					Some(moved) => DragOutcome::Moved(moved),
					None => {
						self.gesture = Gesture::Idle;
						DragOutcome::Unchanged
					}
				}
			}
			Gesture::Idle | Gesture::PreviewPanning { .. } => DragOutcome::Unchanged,
		}
	}

	/// Ends any gesture.
	pub fn release(&mut self) {
		self.gesture = Gesture::Idle;
	}

	/// Preview size for the current window at the configured preview width.
	pub fn preview_size(&self) -> Size {
		preview_size_for(self.window, self.config.preview_width)
	}

	/// Outline of the main window inside the preview, or `None` when the whole
	/// canvas is already visible.
	pub fn preview_frame(&self) -> Option<Rect> {
		if !self.is_zoomed_in() {
			return None;
		}
		let (fx, fy) = preview_factors(self.natural, self.view.zoom_factor, self.preview_size());
		Some(Rect {
			origin: Point::new(self.view.origin.x * fx, self.view.origin.y * fy),
			size: Size::new(self.window.width * fx, self.window.height * fy),
		})
	}

	/// Whether a preview position falls inside the frame.
	pub fn preview_contains(&self, preview: Point) -> bool {
		self.preview_frame().is_some_and(|frame| frame.contains(preview))
	}

	/// Starts dragging the preview frame. Returns false if the press missed it.
	pub fn preview_press(&mut self, preview: Point) -> bool {
		if !self.preview_contains(preview) {
			return false;
		}
		self.gesture = Gesture::PreviewPanning { last: preview };
		true
	}

	/// Continues a preview frame drag. Returns whether the view moved.
	pub fn preview_drag_to(&mut self, preview: Point) -> bool {
		let Gesture::PreviewPanning { last } = self.gesture else {
			return false;
		};
		if last == preview {
			return false;
		}
		self.pan_from_preview(preview.x - last.x, preview.y - last.y);
		self.gesture = Gesture::PreviewPanning { last: preview };
		true
	}

	/// Pans by a delta measured in preview units.
	pub fn pan_from_preview(&mut self, dx: f64, dy: f64) {
		let (fx, fy) = preview_factors(self.natural, self.view.zoom_factor, self.preview_size());
		self.pan_by(dx / fx, dy / fy);
	}

	/// Centers the main window on a preview position, as on a double click.
	/// Does nothing unless zoomed in.
	pub fn center_on_preview(&mut self, preview: Point) -> bool {
		if !self.is_zoomed_in() {
			return false;
		}
		let (fx, fy) = preview_factors(self.natural, self.view.zoom_factor, self.preview_size());
		self.set_origin(
			preview.x / fx - self.window.width / 2.0,
			preview.y / fy - self.window.height / 2.0,
		);
		true
	}
}

/// Size of a preview window `preview_width` wide with the aspect ratio of
/// `window`.
pub fn preview_size_for(window: Size, preview_width: f64) -> Size {
	Size::new(preview_width, preview_width * window.height / window.width)
}
