//! Event relay feeding the engine loop.
//!
//! Every browser trigger (history hooks, popstate, the poll interval, the
//! mutation observer, storage and runtime listeners, panel clicks, animation
//! frames) sends into one relay; a single task drains the receiver, so engine
//! state is only ever touched from that task.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// Cloneable sending half of an unbounded event channel.
///
/// Relays follow the `{source}_{event}_relay` naming pattern at their
/// creation sites, e.g. `history_changed_relay`.
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + 'static,
{
    sender: UnboundedSender<T>,
}

impl<T> Relay<T>
where
    T: Clone + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (Relay { sender }, receiver)
    }

    /// Send an event. Dropped silently once the receiver is gone, which only
    /// happens while the page is being torn down.
    pub fn send(&self, value: T) {
        let _ = self.sender.unbounded_send(value);
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + 'static,
{
    /// A disconnected relay whose events are discarded.
    fn default() -> Self {
        let (relay, _receiver) = Self::new();
        relay
    }
}

pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + 'static,
{
    Relay::new()
}
