//! Document state transitions.
//!
//! Interprets the json0 text operations found in an OT server's op log and
//! applies them to a versioned document, one operation at a time.

mod operations;

pub use operations::{apply_operation, Payload, TextEdit};
