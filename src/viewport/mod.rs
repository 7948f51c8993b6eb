//! Screen-space view of a [`LayoutResult`](crate::layout::LayoutResult):
//! pure coordinate transforms plus the interaction state of the main and
//! preview windows.

mod transform;
mod view;

pub use transform::{ViewState, clamp_origin, nearest_point, screen_to_logical, to_preview, to_screen};
pub use view::{DragOutcome, Viewport, preview_size_for};
