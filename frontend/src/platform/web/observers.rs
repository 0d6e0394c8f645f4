//! Browser-side triggers. Each one only sends an [`EngineSignal`].

use super::dom::{WebDom, elements};
use crate::actions::{ActionRequest, Dialogs};
use crate::dataflow::Relay;
use crate::dom::PANEL_ROOT_ATTR;
use crate::engine::EngineSignal;
use crate::panel::{ACTION_ATTR, PROJECT_ATTR, ROLE_ATTR};
use crate::watcher::{HistoryApi, Intercepted, NavigationKind, mutation_is_external};
use gloo_timers::callback::Interval;
use js_sys::{Array, Function, Reflect};
use shared::IdSeed;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, History, HtmlSelectElement, MutationObserver, MutationObserverInit,
    MutationRecord, Window,
};

// ===== HISTORY =====

/// The page's original `pushState` / `replaceState`.
struct BrowserHistory {
    history: History,
    push_state: Function,
    replace_state: Function,
}

impl HistoryApi for BrowserHistory {
    type Args = Array;
    type Output = Result<JsValue, JsValue>;

    fn push_state(&self, args: Array) -> Result<JsValue, JsValue> {
        self.push_state.apply(&self.history, &args)
    }

    fn replace_state(&self, args: Array) -> Result<JsValue, JsValue> {
        self.replace_state.apply(&self.history, &args)
    }
}

type HistoryHookFn = dyn Fn(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>;
type HistoryHook = Closure<HistoryHookFn>;

/// Wrap `history.pushState` / `history.replaceState` and listen for
/// `popstate`. Installed once per page.
pub fn install_history_hooks(
    window: &Window,
    history_changed_relay: Relay<EngineSignal>,
) -> Result<(), JsValue> {
    let history = window.history()?;
    let original = BrowserHistory {
        push_state: Reflect::get(&history, &"pushState".into())?.dyn_into()?,
        replace_state: Reflect::get(&history, &"replaceState".into())?.dyn_into()?,
        history: history.clone(),
    };

    let notify_relay = history_changed_relay.clone();
    let intercepted = Rc::new(Intercepted::new(original, move |kind| {
        notify_relay.send(EngineSignal::Navigated(kind));
    }));

    let push = intercepted.clone();
    let push_hook: HistoryHook = Closure::wrap(Box::new(
        move |state: JsValue, title: JsValue, url: JsValue| {
            push.push_state(Array::of3(&state, &title, &url))
        },
    ) as Box<HistoryHookFn>);
    let replace = intercepted;
    let replace_hook: HistoryHook = Closure::wrap(Box::new(
        move |state: JsValue, title: JsValue, url: JsValue| {
            replace.replace_state(Array::of3(&state, &title, &url))
        },
    ) as Box<HistoryHookFn>);
    Reflect::set(&history, &"pushState".into(), push_hook.as_ref().unchecked_ref())?;
    Reflect::set(&history, &"replaceState".into(), replace_hook.as_ref().unchecked_ref())?;
    push_hook.forget();
    replace_hook.forget();

    let popstate = Closure::wrap(Box::new(move |_: Event| {
        history_changed_relay.send(EngineSignal::Navigated(NavigationKind::Pop));
    }) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())?;
    popstate.forget();
    Ok(())
}

// ===== POLL + FRAMES =====

pub fn start_location_poll(interval_ms: u32, poll_ticked_relay: Relay<EngineSignal>) {
    Interval::new(interval_ms, move || {
        poll_ticked_relay.send(EngineSignal::PollTick);
    })
    .forget();
}

pub fn request_frame(window: &Window, frame_ready_relay: &Relay<EngineSignal>) {
    let frame_ready_relay = frame_ready_relay.clone();
    let callback = Closure::once(Box::new(move || {
        frame_ready_relay.send(EngineSignal::Frame);
    }) as Box<dyn FnOnce()>);
    if let Err(error) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        log::warn!("⚠️ requestAnimationFrame failed: {error:?}");
    }
    callback.forget();
}

// ===== STRUCTURAL OBSERVER =====

/// MutationObserver on the navigation container (child lists and text),
/// re-bound whenever the engine locates a different container.
pub struct ContainerObserver {
    observer: MutationObserver,
    observed: Option<Element>,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl ContainerObserver {
    pub fn new(dom: WebDom, host_mutated_relay: Relay<EngineSignal>) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(move |records: Array, _: MutationObserver| {
            let external = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .any(|record| record_is_external(&dom, &record));
            if external {
                host_mutated_relay.send(EngineSignal::HostMutated);
            }
        }) as Box<dyn FnMut(Array, MutationObserver)>);
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        Ok(Self {
            observer,
            observed: None,
            _callback: callback,
        })
    }

    pub fn sync(&mut self, container: Option<&Element>) {
        if self.observed.as_ref() == container {
            return;
        }
        self.observer.disconnect();
        self.observed = None;

        let Some(container) = container else {
            return;
        };
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_character_data(true);
        options.set_subtree(true);
        match self.observer.observe_with_options(container, &options) {
            Ok(()) => self.observed = Some(container.clone()),
            Err(error) => log::warn!("⚠️ Could not observe navigation container: {error:?}"),
        }
    }
}

fn record_is_external(dom: &WebDom, record: &MutationRecord) -> bool {
    // Text edits target the text node; judge them by the owning element.
    let target = record.target().and_then(|node| match node.dyn_into::<Element>() {
        Ok(element) => Some(element),
        Err(node) => node.parent_element(),
    });
    let Some(target) = target else {
        return false;
    };
    let mut changed = elements(&record.added_nodes());
    changed.extend(elements(&record.removed_nodes()));
    mutation_is_external(dom, &target, &changed)
}

// ===== PANEL CLICKS =====

struct BrowserDialogs<'a> {
    window: &'a Window,
}

impl Dialogs for BrowserDialogs<'_> {
    fn prompt(&self, message: &str) -> Option<String> {
        self.window.prompt_with_message(message).ok().flatten()
    }

    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }
}

fn seed_now() -> IdSeed {
    let suffix_space = 36f64.powi(5);
    IdSeed::new(
        js_sys::Date::now() as u64,
        (js_sys::Math::random() * suffix_space) as u64,
    )
}

fn action_request(control: &Element, root: &Element) -> ActionRequest {
    let selected = root
        .query_selector(&format!("[{ROLE_ATTR}=\"project-select\"]"))
        .ok()
        .flatten()
        .and_then(|select| select.dyn_into::<HtmlSelectElement>().ok())
        .map(|select| select.value());
    ActionRequest {
        action: control.get_attribute(ACTION_ATTR).unwrap_or_default(),
        project: control.get_attribute(PROJECT_ATTR),
        selected,
    }
}

/// One document-level click listener serves every panel instance the page
/// ever gets, so re-mounting never needs to re-bind handlers.
pub fn delegate_panel_clicks(
    dom: &WebDom,
    panel_clicked_relay: Relay<EngineSignal>,
) -> Result<(), JsValue> {
    let window = dom.window().clone();
    let on_click = Closure::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target().and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };
        let Ok(Some(control)) = target.closest(&format!("[{ACTION_ATTR}]")) else {
            return;
        };
        let Ok(Some(root)) = control.closest(&format!("[{PANEL_ROOT_ATTR}]")) else {
            return;
        };
        let request = action_request(&control, &root);
        let dialogs = BrowserDialogs { window: &window };
        if let Some(action) = request.resolve(&dialogs, seed_now()) {
            panel_clicked_relay.send(EngineSignal::Action(action));
        }
    }) as Box<dyn FnMut(Event)>);
    dom.document()
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}
