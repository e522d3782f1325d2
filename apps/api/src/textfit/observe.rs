//! Change-notification plumbing: `subscribe(callback) → Subscription`.
#![allow(dead_code)]
//!
//! Single-threaded. A `Notifier` calls its subscribers synchronously from `notify`;
//! dropping (or explicitly unsubscribing) a `Subscription` removes the callback, after
//! which it is never called again.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub type Callback = Rc<dyn Fn()>;

/// Something that can tell interested parties that it changed.
pub trait ChangeSource {
    fn subscribe(&self, callback: Box<dyn Fn()>) -> Subscription;
}

// ────────────────────────────────────────────────────────────────────────────
// Subscription
// ────────────────────────────────────────────────────────────────────────────

/// Handle to a registered callback. Releases the registration when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Notifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Basic `ChangeSource` with explicit `notify`.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Rc<RefCell<Registry>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().callbacks.len()
    }

    /// Calls every current subscriber once.
    ///
    /// The subscriber list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe while running. A callback removed mid-notify is skipped.
    pub fn notify(&self) {
        let snapshot: Vec<(u64, Callback)> = self.registry.borrow().callbacks.clone();
        for (id, callback) in snapshot {
            let still_registered = self
                .registry
                .borrow()
                .callbacks
                .iter()
                .any(|(other, _)| *other == id);
            if still_registered {
                callback();
            }
        }
    }
}

impl ChangeSource for Notifier {
    fn subscribe(&self, callback: Box<dyn Fn()>) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.callbacks.push((id, Rc::from(callback)));
            id
        };

        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().callbacks.retain(|(other, _)| *other != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Box<dyn Fn()>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Box::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn test_notify_reaches_subscribers() {
        let notifier = Notifier::new();
        let (count, cb) = counter();
        let _sub = notifier.subscribe(cb);
        notifier.notify();
        notifier.notify();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier = Notifier::new();
        let (count, cb) = counter();
        let sub = notifier.subscribe(cb);
        assert_eq!(notifier.subscriber_count(), 1);
        drop(sub);
        assert_eq!(notifier.subscriber_count(), 0);
        notifier.notify();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let notifier = Notifier::new();
        let (count, cb) = counter();
        notifier.subscribe(cb).unsubscribe();
        notifier.notify();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_subscription_outliving_notifier_is_harmless() {
        let (_count, cb) = counter();
        let sub = {
            let notifier = Notifier::new();
            notifier.subscribe(cb)
        };
        drop(sub);
    }

    #[test]
    fn test_callback_removed_during_notify_is_skipped() {
        let notifier = Notifier::new();
        let (count, cb) = counter();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let v = Rc::clone(&victim);
        let _killer = notifier.subscribe(Box::new(move || {
            v.borrow_mut().take();
        }));
        *victim.borrow_mut() = Some(notifier.subscribe(cb));

        notifier.notify();
        assert_eq!(count.get(), 0);
        assert_eq!(notifier.subscriber_count(), 1);
    }
}
