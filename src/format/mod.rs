//! Record formatting: configuration, the rendering engine, and the
//! supplemental template convenience layer.

pub mod details;
pub mod engine;
pub mod template;

pub use details::{FieldToken, LogRecordDetails, OptionalRecordFields};
pub use engine::{render, render_audit};
