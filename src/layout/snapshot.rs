//! Handoff of finished layouts to the render side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::result::LayoutResult;

/// Coalesces redraw requests: any number of requests made before the render
/// loop services one collapse into a single pending redraw.
#[derive(Debug, Default)]
pub struct RedrawSignal {
	pending: AtomicBool,
}

impl RedrawSignal {
	/// A signal with no redraw pending.
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks a redraw as pending. Returns true only for the request that
	/// changed the state, which is the one that should schedule the render
	/// task.
	pub fn request(&self) -> bool {
		self.pending
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
	}

	/// Called by the render task before drawing. Returns whether a redraw was
	/// pending.
	pub fn take(&self) -> bool {
		self.pending.swap(false, Ordering::AcqRel)
	}

	/// Whether a redraw was requested and not yet taken.
	pub fn is_pending(&self) -> bool {
		self.pending.load(Ordering::Acquire)
	}
}

/// Holds the current layout. Writers replace the whole snapshot; readers get
/// either the old or the new one.
#[derive(Debug)]
pub struct LayoutCell {
	current: RwLock<Arc<LayoutResult>>,
	redraw: RedrawSignal,
}

impl LayoutCell {
	/// A cell holding `initial`, with no redraw pending.
	pub fn new(initial: LayoutResult) -> Self {
		Self {
			current: RwLock::new(Arc::new(initial)),
			redraw: RedrawSignal::new(),
		}
	}

	/// The latest published snapshot.
	pub fn current(&self) -> Arc<LayoutResult> {
		self.current
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Swaps in `result`, requests a redraw, and returns the replaced snapshot.
	pub fn publish(&self, result: LayoutResult) -> Arc<LayoutResult> {
		let next = Arc::new(result);
		let previous = {
			let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
			std::mem::replace(&mut *slot, next)
		};
		self.redraw.request();
		previous
	}

	/// Publishes a snapshot derived from the current one.
	pub fn update(&self, f: impl FnOnce(&LayoutResult) -> LayoutResult) -> Arc<LayoutResult> {
		let next = f(&self.current());
		self.publish(next)
	}

	/// Signal raised by every publish.
	pub fn redraw(&self) -> &RedrawSignal {
		&self.redraw
	}
}
