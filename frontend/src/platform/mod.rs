//! Platform layer.
//!
//! The engine is written against capability traits ([`crate::dom::HostDom`],
//! [`crate::store::PersistedStore`], [`crate::watcher::HistoryApi`],
//! [`crate::actions::Dialogs`]). The browser implementations live in
//! [`web`] and only exist in the `wasm32` build; native builds run the
//! engine against the test fixtures.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::launch;
