//! The overlay engine.
//!
//! One [`Engine`] per page owns the store, the view cache and the panel
//! handles. Browser callbacks never touch it directly; they enqueue an
//! [`EngineSignal`] and the single engine task feeds the signals to
//! [`Engine::handle`] one at a time.

use crate::actions::PanelAction;
use crate::attachment::{Attachment, AttachmentManager};
use crate::dom::HostDom;
use crate::locator::HostLocator;
use crate::panel::PanelHandles;
use crate::renderer::{DiffedRenderer, ViewState};
use crate::store::{PersistedStore, StateStore};
use crate::sync::{SyncBridge, SyncEffect};
use crate::watcher::{LocationPoller, NavigationKind, RenderScheduler};
use shared::{
    ChatId, EngineConfig, ProjectState, RuntimeMessage, StorageChange, enabled_from_json,
    resolve_chat_id,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// History hook or native back/forward.
    Navigated(NavigationKind),
    PollTick,
    /// External child-list change inside the observed container.
    HostMutated,
    /// Animation frame requested after a `true` from [`Engine::handle`].
    Frame,
    Storage(StorageChange),
    Message(RuntimeMessage),
    Action(PanelAction),
}

pub struct Engine<D: HostDom, S: PersistedStore> {
    config: EngineConfig,
    dom: D,
    store: StateStore<S>,
    locator: HostLocator<D::Node>,
    attachment: AttachmentManager<D::Node>,
    renderer: DiffedRenderer,
    scheduler: RenderScheduler,
    poller: LocationPoller,
    bridge: SyncBridge,
    observed: Option<D::Node>,
}

impl<D: HostDom, S: PersistedStore> Engine<D, S> {
    pub fn new(config: EngineConfig, dom: D, backend: S) -> Self {
        Self {
            store: StateStore::new(backend, config.storage.state_key.clone()),
            locator: HostLocator::new(&config),
            attachment: AttachmentManager::new(&config.panel),
            renderer: DiffedRenderer::new(),
            scheduler: RenderScheduler::new(),
            poller: LocationPoller::new(),
            bridge: SyncBridge::new(&config.storage),
            observed: None,
            config,
            dom,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn state(&self) -> &ProjectState {
        self.store.state()
    }

    pub fn backend(&self) -> &S {
        self.store.backend()
    }

    pub fn is_enabled(&self) -> bool {
        self.bridge.is_enabled()
    }

    pub fn panel(&self) -> Option<&PanelHandles<D::Node>> {
        self.attachment.panel()
    }

    /// Container the structural observer should watch, if any.
    pub fn observed_container(&self) -> Option<&D::Node> {
        self.observed.as_ref()
    }

    /// Read the persisted enabled flag. Returns whether a frame is needed.
    pub async fn boot(&mut self) -> bool {
        let enabled = match self.store.backend().get(&self.config.storage.enabled_key).await {
            Ok(value) => enabled_from_json(value.as_ref()),
            Err(error) => {
                log::warn!("⚠️ Could not read enabled flag: {error}");
                false
            }
        };
        log::debug!("Booting with overlay {}", if enabled { "enabled" } else { "disabled" });
        let effect = self.bridge.set_enabled(enabled);
        self.apply(effect).await
    }

    /// Process one signal. Returns `true` when the caller must schedule an
    /// animation frame and send [`EngineSignal::Frame`] from it.
    pub async fn handle(&mut self, signal: EngineSignal) -> bool {
        match signal {
            EngineSignal::Navigated(_) | EngineSignal::HostMutated => self.request_render(),
            EngineSignal::PollTick => {
                if !self.is_enabled() {
                    return false;
                }
                let moved = self.poller.observe(&self.dom.pathname());
                if moved || !self.attachment.is_attached(&self.dom) {
                    return self.scheduler.request();
                }
                false
            }
            EngineSignal::Frame => {
                if self.scheduler.begin_frame() && self.is_enabled() {
                    self.render_pass();
                }
                false
            }
            EngineSignal::Storage(change) => {
                let effect = self.bridge.on_storage_change(&change);
                self.apply(effect).await
            }
            EngineSignal::Message(message) => {
                let effect = self.bridge.on_message(&message);
                self.apply(effect).await
            }
            EngineSignal::Action(action) => {
                if self.is_enabled() {
                    self.perform(action).await;
                }
                false
            }
        }
    }

    fn request_render(&mut self) -> bool {
        self.is_enabled() && self.scheduler.request()
    }

    async fn apply(&mut self, effect: SyncEffect) -> bool {
        match effect {
            SyncEffect::Enable => self.enable().await,
            SyncEffect::Disable => {
                self.disable();
                false
            }
            SyncEffect::ReplaceState(state) => {
                self.store.replace(state);
                self.request_render()
            }
            SyncEffect::Ignore => false,
        }
    }

    async fn enable(&mut self) -> bool {
        if let Err(error) = self.store.load().await {
            log::warn!("⚠️ Could not load projects: {error}");
        }
        self.renderer.invalidate();
        log::info!("✅ Overlay enabled");
        self.request_render()
    }

    /// Remove the panel. Persisted data is left alone.
    fn disable(&mut self) {
        match self.attachment.detach(&self.dom) {
            Ok(true) => log::info!("⏸️ Overlay disabled"),
            Ok(false) => {}
            Err(error) => log::warn!("⚠️ Could not remove panel: {error}"),
        }
        self.renderer.invalidate();
        self.locator.forget();
        self.observed = None;
    }

    fn current_chat(&self) -> Option<ChatId> {
        resolve_chat_id(&self.dom.pathname(), self.config.identity.min_chat_id_len)
    }

    async fn perform(&mut self, action: PanelAction) {
        let chat = self.current_chat();
        let result = match &action {
            PanelAction::CreateProject { name, seed } => {
                self.store.create_project(name, *seed).await.map(|_| ())
            }
            PanelAction::Assign { project } => match &chat {
                Some(chat) => self.store.assign(chat, project).await.map(|_| ()),
                None => Ok(()),
            },
            PanelAction::Unassign => match &chat {
                Some(chat) => self.store.unassign(chat).await.map(|_| ()),
                None => Ok(()),
            },
            PanelAction::Rename { project, name } => {
                self.store.rename_project(project, name).await.map(|_| ())
            }
            PanelAction::Delete { project } => self.store.delete_project(project).await.map(|_| ()),
        };
        if let Err(error) = result {
            log::warn!("⚠️ {action:?} failed: {error}");
        }
        self.render_pass();
    }

    /// Locate, attach, derive and patch.
    fn render_pass(&mut self) {
        let path = self.dom.pathname();
        self.poller.observe(&path);

        let location = self.locator.locate(&self.dom);
        self.observed = location.as_ref().map(|location| location.container.clone());

        match self.attachment.ensure_attached(&self.dom, location.as_ref()) {
            Ok(Attachment::Unavailable) => return,
            Ok(Attachment::Created) => self.renderer.invalidate(),
            Ok(Attachment::Mounted | Attachment::Unchanged) => {}
            Err(error) => {
                log::warn!("⚠️ Could not attach panel: {error}");
                return;
            }
        }
        let Some(panel) = self.attachment.panel() else {
            return;
        };

        let current_chat = resolve_chat_id(&path, self.config.identity.min_chat_id_len);
        let scraped = location
            .map(|location| self.locator.scrape_chats(&self.dom, &location.container))
            .unwrap_or_default();
        let view = ViewState::derive(self.store.state(), current_chat, scraped);
        if let Err(error) = self.renderer.patch(&self.dom, panel, &view) {
            log::warn!("⚠️ Render pass failed: {error}");
        }
    }
}
