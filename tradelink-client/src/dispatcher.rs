/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Multicast callback registry.
//!
//! Handlers are stored as identity-keyed sets: re-adding the same handler
//! reference is a no-op, and firing order across the handlers of one event
//! is unspecified; callers must not depend on any incidental ordering.
//! Firing is fail-fast: the first handler error propagates immediately and
//! remaining handlers in that fan-out may be skipped. Handlers needing
//! isolation wrap their own bodies.

use parking_lot::RwLock;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tradelink_core::error::ClientError;
use tradelink_wire::Payload;

/// Error type handlers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A registered payload handler.
///
/// Identity is the `Arc` allocation: two clones of the same `Arc` are the
/// same handler, two separately created closures are not.
pub type Handler = Arc<dyn Fn(&Payload) -> Result<(), BoxError> + Send + Sync>;

type HandlerSet = SmallVec<[Handler; 2]>;

fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<u8>(),
        Arc::as_ptr(b).cast::<u8>(),
    )
}

fn insert(set: &mut HandlerSet, handler: &Handler) -> bool {
    if set.iter().any(|existing| same_handler(existing, handler)) {
        return false;
    }
    set.push(Arc::clone(handler));
    true
}

fn remove(set: &mut HandlerSet, handler: &Handler) -> bool {
    let before = set.len();
    set.retain(|existing| !same_handler(existing, handler));
    before != set.len()
}

/// Registry mapping event names to handler sets, plus a global set invoked
/// for every payload.
///
/// All operations are internally synchronized; add, remove, and fire may be
/// called from any thread.
#[derive(Default)]
pub struct CallbackRegistry {
    named: RwLock<HashMap<String, HandlerSet>>,
    global: RwLock<HandlerSet>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`.
    ///
    /// Returns false when the same handler reference was already
    /// registered for that name.
    pub fn add(&self, name: impl Into<String>, handler: &Handler) -> bool {
        insert(self.named.write().entry(name.into()).or_default(), handler)
    }

    /// Removes `handler` from `name`. No-op if absent.
    pub fn remove(&self, name: &str, handler: &Handler) -> bool {
        let mut named = self.named.write();
        let Some(set) = named.get_mut(name) else {
            return false;
        };
        let removed = remove(set, handler);
        if set.is_empty() {
            named.remove(name);
        }
        removed
    }

    /// Registers a handler invoked for every inbound payload.
    pub fn add_global(&self, handler: &Handler) -> bool {
        insert(&mut self.global.write(), handler)
    }

    /// Removes a global handler. No-op if absent.
    pub fn remove_global(&self, handler: &Handler) -> bool {
        remove(&mut self.global.write(), handler)
    }

    /// Returns the number of handlers registered under `name`.
    #[must_use]
    pub fn len(&self, name: &str) -> usize {
        self.named.read().get(name).map_or(0, HandlerSet::len)
    }

    /// Returns the number of global handlers.
    #[must_use]
    pub fn global_len(&self) -> usize {
        self.global.read().len()
    }

    /// Returns true when no handlers are registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.named.read().is_empty() && self.global.read().is_empty()
    }

    /// Invokes every handler registered under `name`, then every global
    /// handler, passing `payload`.
    ///
    /// Handler sets are snapshotted before invocation, so a handler may
    /// register or remove handlers without deadlocking; the changes take
    /// effect from the next fire.
    ///
    /// # Errors
    /// Propagates the first handler failure as [`ClientError::Handler`].
    /// Registry state is unaffected by handler failures.
    pub fn fire(&self, name: &str, payload: &Payload) -> Result<(), ClientError> {
        let named: HandlerSet = self
            .named
            .read()
            .get(name)
            .map(|set| set.iter().map(Arc::clone).collect())
            .unwrap_or_default();
        let global: HandlerSet = self.global.read().iter().map(Arc::clone).collect();

        for handler in named.iter().chain(global.iter()) {
            handler(payload).map_err(|source| ClientError::Handler {
                event: name.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("events", &self.named.read().len())
            .field("global", &self.global.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tradelink_wire::{Body, Control};

    fn counting_handler(counter: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_payload| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn pong() -> Payload {
        Payload::with_body(1.into(), Body::Session(Control::Pong))
    }

    #[test]
    fn test_simple_fire() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(Arc::clone(&count));

        assert!(registry.add("session.pong", &handler));
        assert_eq!(registry.len("session.pong"), 1);

        registry.fire("session.pong", &pong()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len("session.pong"), 1);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(Arc::clone(&count));

        assert!(registry.add("session.pong", &handler));
        assert!(!registry.add("session.pong", &handler));
        assert_eq!(registry.len("session.pong"), 1);

        registry.fire("session.pong", &pong()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_handlers_fire_exactly_once() {
        let registry = CallbackRegistry::new();
        let counters: Vec<Arc<AtomicUsize>> =
            (0..20).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let handlers: Vec<Handler> = counters
            .iter()
            .map(|c| counting_handler(Arc::clone(c)))
            .collect();

        for handler in &handlers {
            registry.add("session.pong", handler);
        }
        assert_eq!(registry.len("session.pong"), handlers.len());

        registry.fire("session.pong", &pong()).unwrap();
        for counter in &counters {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_removed_handler_never_fires() {
        let registry = CallbackRegistry::new();
        let kept_count = Arc::new(AtomicUsize::new(0));
        let removed_count = Arc::new(AtomicUsize::new(0));
        let kept = counting_handler(Arc::clone(&kept_count));
        let removed = counting_handler(Arc::clone(&removed_count));

        registry.add("session.pong", &kept);
        registry.add("session.pong", &removed);
        assert!(registry.remove("session.pong", &removed));
        assert_eq!(registry.len("session.pong"), 1);

        registry.fire("session.pong", &pong()).unwrap();
        assert_eq!(kept_count.load(Ordering::SeqCst), 1);
        assert_eq!(removed_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_absent_handler_is_noop() {
        let registry = CallbackRegistry::new();
        let handler = counting_handler(Arc::new(AtomicUsize::new(0)));
        assert!(!registry.remove("session.pong", &handler));
    }

    #[test]
    fn test_global_handlers_fire_for_every_event() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(Arc::clone(&count));

        registry.add_global(&handler);
        assert_eq!(registry.global_len(), 1);

        registry.fire("session.pong", &pong()).unwrap();
        registry.fire("market_quotes", &pong()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_handler_propagates_and_preserves_registry() {
        let registry = CallbackRegistry::new();
        let failing: Handler = Arc::new(|_payload| Err("handler exploded".into()));
        let count = Arc::new(AtomicUsize::new(0));
        let counting = counting_handler(Arc::clone(&count));

        registry.add("session.pong", &failing);
        registry.add("session.pong", &counting);

        let err = registry.fire("session.pong", &pong()).unwrap_err();
        assert!(matches!(err, ClientError::Handler { .. }));

        // Registry state survives the failure; remove the bad handler and
        // the rest keep firing.
        assert_eq!(registry.len("session.pong"), 2);
        registry.remove("session.pong", &failing);
        registry.fire("session.pong", &pong()).unwrap();
        assert!(count.load(Ordering::SeqCst) >= 1);
    }
}
