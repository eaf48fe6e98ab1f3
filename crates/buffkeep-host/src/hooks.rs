//! Host event hooks with disposable subscriptions
//!
//! Each host event (tick, login, leave) has a [`HookRegistry`]. Subscribing
//! returns a [`HookHandle`]; dropping the handle, or calling
//! [`HookHandle::release`], removes the handler. A plugin keeps its handles
//! for as long as it is loaded, so shutdown always unsubscribes.

use buffkeep_core::SlotIndex;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Subscribers<A> {
    next_id: u64,
    handlers: Vec<(u64, Handler<A>)>,
}

/// Subscribers to one host event
pub struct HookRegistry<A> {
    inner: Arc<Mutex<Subscribers<A>>>,
}

impl<A: 'static> HookRegistry<A> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register a handler; it stays registered while the handle lives
    #[must_use = "dropping the handle unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> HookHandle
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut subs = self.inner.lock();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.handlers.push((id, Arc::new(handler)));

        let weak: Weak<Mutex<Subscribers<A>>> = Arc::downgrade(&self.inner);
        HookHandle {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().handlers.retain(|(hid, _)| *hid != id);
                }
            })),
        }
    }

    /// Invoke every handler with `args`
    ///
    /// Handlers run outside the registry lock, so a handler may subscribe or
    /// release handles without deadlocking.
    pub fn emit(&self, args: &A) {
        let handlers: Vec<Handler<A>> = self
            .inner
            .lock()
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(args);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }
}

impl<A: 'static> Default for HookRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription token; unsubscribes on drop
pub struct HookHandle {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl HookHandle {
    /// Unsubscribe now
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for HookHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookHandle")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Payload of the host's post-login hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginArgs {
    pub slot: SlotIndex,
    /// Host-side permission check result for login grants
    pub eligible: bool,
}

/// Payload of the host's leave hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveArgs {
    pub slot: SlotIndex,
}

/// The host events the scheduler listens to
#[derive(Default)]
pub struct HostHooks {
    /// Game update; fires every host tick with no payload
    pub tick: HookRegistry<()>,
    /// A player finished logging in
    pub login: HookRegistry<LoginArgs>,
    /// A connection was torn down
    pub leave: HookRegistry<LeaveArgs>,
}

impl HostHooks {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_emit() {
        let registry: HookRegistry<u32> = HookRegistry::new();
        let total = Arc::new(AtomicUsize::new(0));

        let t = Arc::clone(&total);
        let _handle = registry.subscribe(move |n| {
            t.fetch_add(*n as usize, Ordering::SeqCst);
        });

        registry.emit(&3);
        registry.emit(&4);
        assert_eq!(total.load(Ordering::SeqCst), 7);
        assert_eq!(registry.subscriber_count(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry: HookRegistry<()> = HookRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        let handle = registry.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = Arc::clone(&calls);
        let other = registry.subscribe(move |_| {
            c.fetch_add(10, Ordering::SeqCst);
        });

        registry.emit(&());
        assert_eq!(calls.load(Ordering::SeqCst), 11);

        drop(handle);
        registry.emit(&());
        assert_eq!(calls.load(Ordering::SeqCst), 21);

        other.release();
        registry.emit(&());
        assert_eq!(calls.load(Ordering::SeqCst), 21);
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[test]
    fn test_handle_outlives_registry() {
        let registry: HookRegistry<()> = HookRegistry::new();
        let handle = registry.subscribe(|_| {});
        drop(registry);
        // Releasing after the registry is gone is a no-op
        handle.release();
    }
}
