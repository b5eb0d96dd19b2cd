//! Peekit domain core.
//!
//! Pure logic shared by the persistence layer and the HTTP server: the
//! workflow definition, the stage progress calculator, the stage transition
//! engine, the workflow editor and the owner/client tracking renderer.
//! Nothing in this crate performs I/O.

pub mod access;
pub mod activity;
pub mod editor;
pub mod error;
pub mod media;
pub mod plan;
pub mod progress;
pub mod source;
pub mod tracking;
pub mod transition;
pub mod types;
pub mod workflow;
