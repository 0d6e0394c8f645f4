//! Event plumbing between browser callbacks and the engine task.

pub mod relay;

pub use relay::{Relay, relay};
