//! Virtual node overlay and archive regrouper for pak.
//!
//! Archives may be split across multiple physical sub-files that belong to
//! the same logical type. Before two stores can be diffed, each side is
//! regrouped: sub-archives of a base aggregate are partitioned by declared
//! type and folded into one synthetic virtual tree per type, while everything
//! else is carried over as-is. The resulting [`VirtualNode`] trees present a
//! uniform comparable shape regardless of physical file splitting.
//!
//! # Key Types
//!
//! - [`VirtualNode`] -- Synthetic tree node over one or more real nodes
//! - [`GroupingConflict`] -- Reported when same-type sub-archives collide on a leaf
//! - [`Rebuilt`] -- Output of [`rebuild`]: the virtual root plus conflicts
//! - [`rebuild`] / [`split_by_type`] -- The regrouping entry points

pub mod conflict;
pub mod regroup;
pub mod virtual_node;

pub use conflict::GroupingConflict;
pub use regroup::{rebuild, rebuild_with_observer, split_by_type, Rebuilt};
pub use virtual_node::VirtualNode;
