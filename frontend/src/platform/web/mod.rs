//! Browser platform: the live DOM, extension APIs and event sources.

pub mod chrome;
pub mod dom;
pub mod legacy;
pub mod observers;
mod runtime;

pub use runtime::launch;
