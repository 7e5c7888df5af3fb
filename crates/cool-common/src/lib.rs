//! Shared types for the COOL semantic front-end.
//!
//! Kept deliberately small: the only thing every other crate in this
//! workspace needs in common is source-position tracking.

pub mod span;

pub use span::{LineIndex, Span};
