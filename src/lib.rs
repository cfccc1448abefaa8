//! Retained-mode layered GUI core.
//!
//! The pieces: an element/container tree with anchor-aware geometry
//! propagation, a z-ordered window stack that keeps every window on a
//! contiguous, non-overlapping layer range, and a per-state drawable shape
//! cache with debounced rebuilds and blended state transitions. A
//! [`ui::UiManager`] ties them together and drives the per-frame
//! update/draw/event loop.
//!
//! Rendering backends, widget libraries, theme file parsing, and text
//! layout all live above or beside this crate; it only deals in the
//! contracts they share.

mod error;

pub mod shape;
pub mod style;
pub mod transition;
pub mod ui;
pub mod view;

pub use error::UiError;
