//! Form schema model and authoring engine.
//!
//! Provides the serializable form tree, an id-indexed document arena,
//! grid coordinate utilities, the collision-aware layout engine,
//! gesture lifecycle handling and the staged node configuration editor.

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod grid;
pub mod interchange;
pub mod schema;

pub use document::FormDocument;
pub use error::FormError;
pub use grid::LayoutEngine;
