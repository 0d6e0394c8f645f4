//! Extension APIs: `chrome.storage.local` and `chrome.runtime` messaging.

use crate::dataflow::Relay;
use crate::engine::EngineSignal;
use crate::store::{PersistedStore, StoreError};
use serde::Serialize;
use serde_json::Value;
use shared::{RuntimeMessage, StorageChange};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    async fn storage_local_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    async fn storage_local_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn add_storage_changed_listener(callback: &Closure<dyn FnMut(JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn add_runtime_message_listener(callback: &Closure<dyn FnMut(JsValue, JsValue, JsValue)>);
}

fn backend_error(error: JsValue) -> StoreError {
    StoreError::Backend(format!("{error:?}"))
}

pub fn js_to_json(value: JsValue) -> Result<Option<Value>, StoreError> {
    if value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|error| StoreError::Backend(error.to_string()))
}

/// The canonical persisted store.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

impl PersistedStore for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let items = storage_local_get(JsValue::from_str(key))
            .await
            .map_err(backend_error)?;
        let value = js_sys::Reflect::get(&items, &JsValue::from_str(key)).map_err(backend_error)?;
        js_to_json(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = value
            .serialize(&serializer)
            .map_err(|error| StoreError::Backend(error.to_string()))?;
        let items = js_sys::Object::new();
        js_sys::Reflect::set(&items, &JsValue::from_str(key), &value).map_err(backend_error)?;
        storage_local_set(items.into()).await.map_err(backend_error)?;
        Ok(())
    }
}

/// Forward `chrome.storage.onChanged` for the local area.
pub fn listen_storage_changes(storage_changed_relay: Relay<EngineSignal>) {
    let on_changed = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() != Some("local") {
            return;
        }
        let changes = js_sys::Object::from(changes);
        for key in js_sys::Object::keys(&changes).iter() {
            let Some(name) = key.as_string() else {
                continue;
            };
            let new_value = js_sys::Reflect::get(&changes, &key)
                .and_then(|change| js_sys::Reflect::get(&change, &JsValue::from_str("newValue")))
                .map_err(backend_error)
                .and_then(js_to_json);
            match new_value {
                Ok(new_value) => storage_changed_relay
                    .send(EngineSignal::Storage(StorageChange::new(name, new_value))),
                Err(error) => log::warn!("⚠️ Unreadable change for `{name}`: {error}"),
            }
        }
    }) as Box<dyn FnMut(JsValue, JsValue)>);
    add_storage_changed_listener(&on_changed);
    on_changed.forget();
}

/// Forward wake messages sent by the extension popup.
pub fn listen_runtime_messages(message_received_relay: Relay<EngineSignal>) {
    let on_message = Closure::wrap(Box::new(
        move |message: JsValue, _sender: JsValue, _send_response: JsValue| {
            match serde_wasm_bindgen::from_value::<RuntimeMessage>(message) {
                Ok(message) => message_received_relay.send(EngineSignal::Message(message)),
                Err(_) => log::debug!("Ignoring foreign runtime message"),
            }
        },
    ) as Box<dyn FnMut(JsValue, JsValue, JsValue)>);
    add_runtime_message_listener(&on_message);
    on_message.forget();
}
