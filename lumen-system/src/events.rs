//! Outbound event channels.
//!
//! The render manager publishes into explicit channels instead of opaque
//! signal emission: the emitter does not know its subscribers, but the
//! subscriber set is inspectable, which the tests rely on. Callbacks run
//! synchronously at the emission point, on the shell thread.

use lumen_core::types::Rotation;

use crate::render::state::State;

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<T> {
    id: SubscriptionId,
    name: String,
    callback: Box<dyn FnMut(&T)>,
}

/// A single named event channel.
pub struct EventChannel<T> {
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> EventChannel<T> {
    /// Register a callback under a diagnostic name.
    pub fn subscribe<F>(&mut self, name: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            name: name.into(),
            callback: Box::new(callback),
        });
        id
    }

    /// Drop a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != id);
    }

    /// Deliver `event` to every subscriber, in subscription order.
    pub fn emit(&mut self, event: &T) {
        for sub in &mut self.subscribers {
            (sub.callback)(event);
        }
    }

    /// Names of the current subscribers.
    pub fn subscriber_names(&self) -> Vec<&str> {
        self.subscribers.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// The render manager's outbound channels.
#[derive(Default)]
pub struct ShellSignals {
    /// The UI state changed; payload is the new state.
    pub state_changed: EventChannel<State>,
    /// The stored rotation property changed.
    pub rotation_changed: EventChannel<Rotation>,
    /// The display was rotated; home layout hooks listen here.
    pub rotated: EventChannel<Rotation>,
    /// The blur transition timeline finished.
    pub transition_complete: EventChannel<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_all_subscribers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut channel = EventChannel::<u32>::default();
        for tag in ["first", "second"] {
            let seen = seen.clone();
            channel.subscribe(tag, move |v| seen.borrow_mut().push((tag, *v)));
        }
        channel.emit(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_the_target() {
        let mut channel = EventChannel::<()>::default();
        let a = channel.subscribe("a", |_| {});
        let _b = channel.subscribe("b", |_| {});
        channel.unsubscribe(a);
        assert_eq!(channel.subscriber_names(), vec!["b"]);
    }

    #[test]
    fn subscriber_set_is_inspectable() {
        let mut channel = EventChannel::<()>::default();
        assert!(channel.is_empty());
        channel.subscribe("watcher", |_| {});
        assert_eq!(channel.len(), 1);
        assert_eq!(channel.subscriber_names(), vec!["watcher"]);
    }
}
