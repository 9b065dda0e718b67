//! 12-column grid layout: coordinate helpers, the layout engine and the
//! resize/drag gesture lifecycle.

pub mod coords;
mod gesture;
mod layout;
pub(crate) mod naming;

pub use gesture::{CursorStyle, Gesture, GestureController, GestureResult, PointerHost};
pub use layout::{
    LayoutEngine, MoveOutcome, MoveTarget, Placement, RejectReason, ResizeEdge, ResizeOutcome,
};
