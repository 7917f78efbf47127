//! Fan-out event bus between the transport and the placement engines.
//!
//! Single-threaded by contract: handlers are `Rc` closures and the handler
//! list lives in a `RefCell`. `publish` snapshots the handler list before
//! dispatching, so a handler may subscribe or unsubscribe (itself or others)
//! while a publish is in flight. Such changes apply to the next publish only.
//!
//! There is no buffering. Publishing with zero subscribers drops the event.

use crate::model::Comment;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value (for logging).
    pub fn get(&self) -> u64 {
        self.0
    }
}

type Handler<E> = Rc<dyn Fn(&E)>;

/// Multicast channel delivering every published event to all current
/// subscribers, synchronously and in subscription order.
pub struct EventBus<E> {
    handlers: RefCell<Vec<(SubscriptionId, Handler<E>)>>,
    next_id: Cell<u64>,
}

/// The bus carrying identified comments.
pub type CommentBus = EventBus<Comment>;

impl<E> EventBus<E> {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a handler. It receives every event published from now on.
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        trace!(subscription = id.0, "subscribed");
        id
    }

    /// Remove a handler. Returns `false` if the id was not subscribed.
    ///
    /// A publish already iterating its snapshot still calls the handler.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        let removed = handlers.len() != before;
        trace!(subscription = id.0, removed, "unsubscribed");
        removed
    }

    /// Deliver `event` to every handler subscribed at the time of the call.
    ///
    /// Returns how many handlers were invoked.
    pub fn publish(&self, event: &E) -> usize {
        let snapshot: Vec<Handler<E>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    /// Number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
