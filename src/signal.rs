//! Single-threaded change signals.
//!
//! Every headless widget exposes its native change mechanism as a [`Signal`].
//! Handlers are `Rc` callbacks since widgets live on the UI thread. A
//! [`Connection`] is a plain handle; a [`Subscription`] disconnects when dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    struct ConnectionId;
}

type Handler<T> = Rc<dyn Fn(&T)>;

type Slots<T> = SlotMap<ConnectionId, Handler<T>>;

trait Detach {
    fn detach(&mut self, id: ConnectionId) -> bool;
}

impl<T> Detach for Slots<T> {
    fn detach(&mut self, id: ConnectionId) -> bool {
        self.remove(id).is_some()
    }
}

pub struct Signal<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    pub fn connect(&self, handler: impl Fn(&T) + 'static) -> Connection {
        let id = self.slots.borrow_mut().insert(Rc::new(handler));
        let erased: Rc<RefCell<dyn Detach>> = self.slots.clone();
        Connection {
            slots: Rc::downgrade(&erased),
            id,
        }
    }

    /// Calls every connected handler.
    ///
    /// Handlers run against a snapshot, so a handler may connect or disconnect
    /// (itself included) while the signal is being emitted.
    pub fn emit(&self, value: &T) {
        let snapshot = self
            .slots
            .borrow()
            .values()
            .cloned()
            .collect::<Vec<_>>();
        for handler in snapshot {
            handler(value);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.slots.borrow().len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Connection {
    slots: Weak<RefCell<dyn Detach>>,
    id: ConnectionId,
}

impl Connection {
    /// Returns `false` if the handler was already gone or the signal dropped.
    pub fn disconnect(self) -> bool {
        let Some(slots) = self.slots.upgrade() else {
            return false;
        };
        let Ok(mut slots) = slots.try_borrow_mut() else {
            return false;
        };
        slots.detach(self.id)
    }

    pub fn is_connected(&self) -> bool {
        self.slots.strong_count() > 0
    }
}

/// Owns one or more connections and disconnects them on drop.
#[derive(Default)]
pub struct Subscription {
    connections: Vec<Connection>,
}

impl Subscription {
    pub fn new(connection: Connection) -> Self {
        Self {
            connections: vec![connection],
        }
    }

    pub fn join(mut self, other: Subscription) -> Self {
        self.connections.extend(other.into_connections());
        self
    }

    pub fn cancel(self) {
        drop(self);
    }

    fn into_connections(mut self) -> Vec<Connection> {
        std::mem::take(&mut self.connections)
    }
}

impl From<Connection> for Subscription {
    fn from(connection: Connection) -> Self {
        Self::new(connection)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for connection in self.connections.drain(..) {
            connection.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_every_handler() {
        let signal = Signal::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = seen.clone();
            let _ = signal.connect(move |value| seen.borrow_mut().push(format!("{tag}{value}")));
        }
        signal.emit(&7);
        let mut seen = seen.borrow().clone();
        seen.sort();
        assert_eq!(seen, vec!["a7".to_string(), "b7".to_string()]);
    }

    #[test]
    fn disconnect_removes_only_that_handler() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let first = {
            let hits = hits.clone();
            signal.connect(move |_| hits.set(hits.get() + 1))
        };
        let _second = {
            let hits = hits.clone();
            signal.connect(move |_| hits.set(hits.get() + 10))
        };

        assert!(first.disconnect());
        signal.emit(&());
        assert_eq!(hits.get(), 10);
        assert_eq!(signal.handler_count(), 1);
    }

    #[test]
    fn dropping_subscription_disconnects() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        {
            let hits = hits.clone();
            let _subscription = Subscription::new(signal.connect(move |_| hits.set(hits.get() + 1)));
            signal.emit(&());
        }
        signal.emit(&());
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.handler_count(), 0);
    }

    #[test]
    fn handler_may_disconnect_itself_during_emit() {
        let signal = Rc::new(Signal::<()>::new());
        let slot: Rc<RefCell<Option<Connection>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));
        let connection = {
            let slot = slot.clone();
            let hits = hits.clone();
            signal.connect(move |_| {
                hits.set(hits.get() + 1);
                if let Some(connection) = slot.borrow_mut().take() {
                    connection.disconnect();
                }
            })
        };
        *slot.borrow_mut() = Some(connection);

        signal.emit(&());
        signal.emit(&());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn stale_connection_does_not_remove_a_reused_slot() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let first = signal.connect(|_| {});
        let stale = Connection {
            slots: first.slots.clone(),
            id: first.id,
        };
        assert!(first.disconnect());

        let _second = {
            let hits = hits.clone();
            signal.connect(move |_| hits.set(hits.get() + 1))
        };
        assert!(!stale.disconnect());
        signal.emit(&());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn connection_outliving_signal_is_inert() {
        let signal = Signal::<()>::new();
        let connection = signal.connect(|_| {});
        drop(signal);
        assert!(!connection.is_connected());
        assert!(!connection.disconnect());
    }
}
