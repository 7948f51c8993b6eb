//! Layered layout of an execution graph.
//!
//! [`compute_layout`] runs four steps over the graph reachable from a head:
//! - region assignment: columns by depth, rows by discovery order
//! - row compaction: rows renumbered densely per column
//! - soft-grid placement: slot centers with bounded jitter, computed lazily
//! - squeeze: a single forward sweep pulling nodes toward their parents
//!
//! The result is an immutable [`LayoutResult`]. [`LayoutCell`] hands results
//! to the render side as whole snapshots.

mod engine;
mod grid;
mod regions;
mod result;
mod snapshot;
mod squeeze;

pub use engine::compute_layout;
pub use grid::{LayoutPoint, Placement, soft_grid_point};
pub use result::{Diagnostic, LayoutResult};
pub use snapshot::{LayoutCell, RedrawSignal};
