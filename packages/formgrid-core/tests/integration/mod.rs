//! Integration tests for the authoring stack.
//!
//! 1. Builder workflow: picker, layout engine, editor and undo together
//! 2. Interchange: files on disk through the engine and back

pub mod builder_workflow;
pub mod interchange_tests;
