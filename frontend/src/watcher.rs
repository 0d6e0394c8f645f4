//! Change Watcher
//!
//! Pure halves of the two change-detection channels and the frame
//! coalescing. The browser side (`platform::web::observers`) owns the actual
//! listeners and only forwards what these types decide.

use crate::dom::{HostDom, PANEL_ROOT_ATTR};

// ===== RENDER COALESCING =====

/// Collapses every trigger between two animation frames into one pass.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    frame_pending: bool,
    dirty: bool,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the view dirty. Returns `true` when no frame is queued yet and
    /// the caller has to request one.
    pub fn request(&mut self) -> bool {
        self.dirty = true;
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Called from the animation frame callback. Returns whether a render
    /// pass is due.
    pub fn begin_frame(&mut self) -> bool {
        self.frame_pending = false;
        std::mem::take(&mut self.dirty)
    }
}

// ===== LOCATION POLL =====

/// Safety net for navigations that bypass the history hooks.
#[derive(Debug, Default)]
pub struct LocationPoller {
    last_path: Option<String>,
}

impl LocationPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; `true` when it differs from the last observation.
    pub fn observe(&mut self, path: &str) -> bool {
        if self.last_path.as_deref() == Some(path) {
            return false;
        }
        self.last_path = Some(path.to_string());
        true
    }
}

// ===== HISTORY INTERCEPTION =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Push,
    Replace,
    /// Native back/forward.
    Pop,
}

/// The two programmatic navigation entry points of the host page.
pub trait HistoryApi {
    type Args;
    type Output;

    fn push_state(&self, args: Self::Args) -> Self::Output;
    fn replace_state(&self, args: Self::Args) -> Self::Output;
}

/// Decorator that keeps the wrapped behaviour and reports each navigation
/// after it happened.
pub struct Intercepted<H, F> {
    inner: H,
    notify: F,
}

impl<H, F> Intercepted<H, F>
where
    H: HistoryApi,
    F: Fn(NavigationKind),
{
    pub fn new(inner: H, notify: F) -> Self {
        Self { inner, notify }
    }
}

impl<H, F> HistoryApi for Intercepted<H, F>
where
    H: HistoryApi,
    F: Fn(NavigationKind),
{
    type Args = H::Args;
    type Output = H::Output;

    fn push_state(&self, args: Self::Args) -> Self::Output {
        let output = self.inner.push_state(args);
        (self.notify)(NavigationKind::Push);
        output
    }

    fn replace_state(&self, args: Self::Args) -> Self::Output {
        let output = self.inner.replace_state(args);
        (self.notify)(NavigationKind::Replace);
        output
    }
}

// ===== MUTATION FILTER =====

/// Whether a mutation came from the host rather than from the panel itself.
///
/// `changed` holds the element nodes a child-list record added or removed;
/// it is empty for text-only records and in-place text edits. Records
/// targeting the panel subtree are ours. So are records whose changed nodes
/// are all panel roots still in the document, i.e. our own mount or move.
/// A panel root the host removed is not connected any more and counts as
/// external so it gets re-attached.
pub fn mutation_is_external<D: HostDom>(dom: &D, target: &D::Node, changed: &[D::Node]) -> bool {
    if dom.is_inside_panel(target) {
        return false;
    }
    let only_our_roots = !changed.is_empty()
        && changed
            .iter()
            .all(|node| dom.attribute(node, PANEL_ROOT_ATTR).is_some() && dom.is_connected(node));
    !only_our_roots
}
