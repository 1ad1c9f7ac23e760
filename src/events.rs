//! Change notifications broadcast by the flow façade.
//!
//! Presentational shells (background grid, minimap, handle views) register
//! listeners here instead of coupling to the façade's internals. Events are
//! dispatched synchronously, strictly after the state they describe has been
//! committed, so a listener can always re-query consistent state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::viewport::Viewport;

/// A committed state change worth re-rendering for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlowEvent {
    /// The viewport transform changed; the payload is the new transform.
    ViewportChanged(Viewport),
    /// The connection state (or connection configuration) changed. Listeners
    /// re-query the façade for details.
    ConnectionChanged,
}

/// Handle returned by [`EventHub::add_listener`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(usize);

type Listener = Rc<dyn Fn(&FlowEvent)>;

#[derive(Default)]
struct Registry {
    next_id: usize,
    entries: Vec<(usize, Listener)>,
}

/// Listener registry shared between the façade and its subsystems.
///
/// Cloning is cheap and clones observe the same registry.
#[derive(Clone, Default)]
pub struct EventHub {
    registry: Rc<RefCell<Registry>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: impl Fn(&FlowEvent) + 'static) -> ListenerId {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Rc::new(listener)));
        ListenerId(id)
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.registry.borrow_mut().entries.retain(|(lid, _)| *lid != id.0);
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Dispatch `event` to every registered listener.
    ///
    /// The registry borrow is released before any listener runs, so listeners
    /// may re-query the façade or even (un)subscribe.
    pub fn emit(&self, event: &FlowEvent) {
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn listeners_receive_emitted_events() {
        let hub = EventHub::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        hub.add_listener(move |event| {
            assert_eq!(*event, FlowEvent::ConnectionChanged);
            seen.set(seen.get() + 1);
        });

        hub.emit(&FlowEvent::ConnectionChanged);
        hub.emit(&FlowEvent::ConnectionChanged);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let hub = EventHub::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let id = hub.add_listener(move |_| seen.set(seen.get() + 1));

        hub.emit(&FlowEvent::ConnectionChanged);
        hub.remove_listener(id);
        hub.emit(&FlowEvent::ConnectionChanged);

        assert_eq!(count.get(), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn viewport_event_carries_payload() {
        let hub = EventHub::new();
        let seen = Rc::new(Cell::new(None));
        let out = seen.clone();
        hub.add_listener(move |event| {
            if let FlowEvent::ViewportChanged(v) = event {
                out.set(Some(*v));
            }
        });

        hub.emit(&FlowEvent::ViewportChanged(Viewport::new(1.0, 2.0, 1.5)));
        assert_eq!(seen.get(), Some(Viewport::new(1.0, 2.0, 1.5)));
    }

    #[test]
    fn listener_may_subscribe_during_dispatch() {
        let hub = EventHub::new();
        let inner = hub.clone();
        hub.add_listener(move |_| {
            inner.add_listener(|_| {});
        });

        hub.emit(&FlowEvent::ConnectionChanged);
        assert_eq!(hub.listener_count(), 2);
    }

    #[test]
    fn clones_share_one_registry() {
        let hub = EventHub::new();
        let other = hub.clone();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        other.add_listener(move |_| seen.set(seen.get() + 1));

        hub.emit(&FlowEvent::ConnectionChanged);
        assert_eq!(count.get(), 1);
    }
}
