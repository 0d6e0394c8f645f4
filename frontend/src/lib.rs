//! DSCO content script: a "Projects" panel mounted into the host chat app's
//! sidebar, grouping conversations under user-defined projects.

pub mod actions;
pub mod attachment;
pub mod dataflow;
pub mod dom;
pub mod engine;
pub mod locator;
pub mod panel;
pub mod platform;
pub mod renderer;
pub mod store;
pub mod sync;
pub mod watcher;

use shared::{ConfigError, EngineConfig};

/// Settings shipped with the extension build.
pub fn shipped_config() -> Result<EngineConfig, ConfigError> {
    EngineConfig::from_toml_str(include_str!("../config.toml"))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let parsed = shipped_config();
    let config = parsed.as_ref().cloned().unwrap_or_default();
    let level = config.logging.level.parse().unwrap_or(log::Level::Info);
    wasm_logger::init(wasm_logger::Config::new(level));

    if let Err(error) = &parsed {
        log::warn!("⚠️ Falling back to default settings: {error}");
    }
    if let Err(error) = platform::launch(config) {
        log::error!("Could not start overlay: {error:?}");
    }
}
