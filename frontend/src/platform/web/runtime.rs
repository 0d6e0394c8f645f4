use super::chrome::{ChromeStorage, listen_runtime_messages, listen_storage_changes};
use super::dom::WebDom;
use super::legacy::LegacyStore;
use super::observers::{
    ContainerObserver, delegate_panel_clicks, install_history_hooks, request_frame,
    start_location_poll,
};
use crate::dataflow::relay;
use crate::engine::{Engine, EngineSignal};
use crate::store::import_legacy;
use futures::StreamExt;
use shared::EngineConfig;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

/// Wire every event source to a single engine task and start it.
pub fn launch(config: EngineConfig) -> Result<(), JsValue> {
    let dom = WebDom::new().ok_or_else(|| JsValue::from_str("no window or document"))?;
    let window = dom.window().clone();
    let (signal_relay, mut signals) = relay::<EngineSignal>();

    install_history_hooks(&window, signal_relay.clone())?;
    start_location_poll(config.watcher.poll_interval_ms, signal_relay.clone());
    listen_storage_changes(signal_relay.clone());
    listen_runtime_messages(signal_relay.clone());
    delegate_panel_clicks(&dom, signal_relay.clone())?;
    let mut observer = ContainerObserver::new(dom.clone(), signal_relay.clone())?;

    spawn_local(async move {
        if let (Some(legacy_key), Some(legacy)) = (
            config.storage.legacy_state_key.as_deref(),
            LegacyStore::new(&window),
        ) {
            if let Err(error) =
                import_legacy(&legacy, legacy_key, &ChromeStorage, &config.storage.state_key).await
            {
                log::warn!("⚠️ Legacy import failed: {error}");
            }
        }

        let mut engine = Engine::new(config, dom, ChromeStorage);
        if engine.boot().await {
            request_frame(&window, &signal_relay);
        }
        observer.sync(engine.observed_container());

        while let Some(signal) = signals.next().await {
            if engine.handle(signal).await {
                request_frame(&window, &signal_relay);
            }
            observer.sync(engine.observed_container());
        }
        log::debug!("Signal stream closed");
    });
    Ok(())
}
