//! # Change Notification
//!
//! Publish/subscribe keyed by [`Address`]. The store publishes the address
//! it mutated; every subscription whose address is related to it is told
//! that something changed.
//!
//! Notifications carry no diff, so they coalesce: each subscription holds
//! at most one pending change, the first one since it last looked.
//!
//! ## Routing
//! ```text
//! notify(content://a/products)
//!     ├──► observer at content://a/products          (same address)
//!     ├──► observer at content://a/products/7        (changed is ancestor)
//!     └──► observer at content://a                    (only if it asked for
//!                                                      descendants)
//!
//! notify(content://a/products/7)
//!     ├──► observer at content://a/products/7
//!     ├──► observer at content://a/products, descendants = true
//!     └─╳─ observer at content://a/products/8
//! ```
//!
//! ## Lifetime
//! A [`Subscription`] unregisters itself when dropped. Closing the last
//! sender ends the receiver, so a waiting [`Subscription::changed`] returns
//! `None` once the subscription is gone.

use catalog_core::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::trace;

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug)]
struct Observer {
    address: Address,
    notify_for_descendants: bool,
    tx: Sender<Address>,
    notified: Arc<AtomicBool>,
}

impl Observer {
    fn is_reached_by(&self, changed: &Address) -> bool {
        self.address == *changed
            || changed.is_ancestor_of(&self.address)
            || (self.notify_for_descendants && self.address.is_ancestor_of(changed))
    }

    /// Leaves `changed` pending unless a change is already waiting.
    fn deliver(&self, changed: &Address) -> bool {
        match self.tx.try_send(changed.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => {
                self.notified.store(true, Ordering::Release);
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    observers: HashMap<u64, Observer>,
}

type SharedRegistry = Arc<Mutex<Registry>>;

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // a panic while holding the lock leaves the map consistent
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Change Notifier
// =============================================================================

/// Routes change notifications from the store to observers.
///
/// Clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    registry: SharedRegistry,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        ChangeNotifier::default()
    }

    /// Starts observing `address`.
    ///
    /// With `notify_for_descendants`, changes to addresses below `address`
    /// are delivered too.
    pub fn register(&self, address: Address, notify_for_descendants: bool) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let notified = Arc::new(AtomicBool::new(false));

        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.observers.insert(
                id,
                Observer {
                    address: address.clone(),
                    notify_for_descendants,
                    tx,
                    notified: Arc::clone(&notified),
                },
            );
            id
        };

        trace!(id, address = %address, notify_for_descendants, "Observer registered");

        Subscription {
            registration: Registration {
                id,
                registry: Arc::downgrade(&self.registry),
                notified,
            },
            address,
            rx,
        }
    }

    /// Delivers `changed` to every observer it reaches.
    ///
    /// Returns how many observers were notified.
    pub fn notify_change(&self, changed: &Address) -> usize {
        let registry = lock(&self.registry);
        let delivered = registry
            .observers
            .values()
            .filter(|o| o.is_reached_by(changed))
            .filter(|o| o.deliver(changed))
            .count();

        trace!(address = %changed, delivered, "Change notified");
        delivered
    }

    /// Number of live registrations.
    pub fn observer_count(&self) -> usize {
        lock(&self.registry).observers.len()
    }
}

// =============================================================================
// Registration
// =============================================================================

/// The registry entry behind a subscription. Unregisters on drop.
#[derive(Debug)]
pub(crate) struct Registration {
    id: u64,
    registry: Weak<Mutex<Registry>>,
    notified: Arc<AtomicBool>,
}

impl Registration {
    /// Removes the entry. Safe to call more than once.
    pub(crate) fn cancel(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if lock(&registry).observers.remove(&self.id).is_some() {
                trace!(id = self.id, "Observer unregistered");
            }
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let guard = lock(&registry);
                guard.observers.contains_key(&self.id)
            }
            None => false,
        }
    }

    /// True once any change has reached this entry. Never resets.
    pub(crate) fn was_notified(&self) -> bool {
        self.notified.load(Ordering::Acquire)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A live observer registration and its pending change, if any.
#[derive(Debug)]
pub struct Subscription {
    registration: Registration,
    address: Address,
    rx: Receiver<Address>,
}

impl Subscription {
    /// The address this subscription observes.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Waits for the next change. `None` once unsubscribed and drained.
    pub async fn changed(&mut self) -> Option<Address> {
        self.rx.recv().await
    }

    /// Takes a pending change without waiting.
    pub fn try_changed(&mut self) -> Option<Address> {
        self.rx.try_recv().ok()
    }

    /// Stops receiving new changes. A pending one stays readable.
    pub fn unsubscribe(&mut self) {
        self.registration.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.registration.is_active()
    }

    pub(crate) fn into_parts(self) -> (Registration, Receiver<Address>) {
        (self.registration, self.rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::CONTENT_AUTHORITY;

    fn collection() -> Address {
        Address::collection(CONTENT_AUTHORITY)
    }

    fn item(id: i64) -> Address {
        Address::item(CONTENT_AUTHORITY, id)
    }

    #[test]
    fn test_exact_match() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(collection(), false);

        assert_eq!(notifier.notify_change(&collection()), 1);
        assert_eq!(sub.try_changed(), Some(collection()));
        assert_eq!(sub.try_changed(), None);
    }

    #[test]
    fn test_ancestor_change_reaches_item_observer() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(item(7), false);

        notifier.notify_change(&collection());
        assert_eq!(sub.try_changed(), Some(collection()));
    }

    #[test]
    fn test_descendant_change_needs_opt_in() {
        let notifier = ChangeNotifier::new();
        let mut plain = notifier.register(collection(), false);
        let mut deep = notifier.register(collection(), true);

        assert_eq!(notifier.notify_change(&item(3)), 1);
        assert_eq!(plain.try_changed(), None);
        assert_eq!(deep.try_changed(), Some(item(3)));
    }

    #[test]
    fn test_sibling_items_are_isolated() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(item(8), true);

        assert_eq!(notifier.notify_change(&item(7)), 0);
        assert_eq!(sub.try_changed(), None);
    }

    #[test]
    fn test_other_authority_is_isolated() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(collection(), true);

        notifier.notify_change(&Address::collection("com.example.other"));
        assert_eq!(sub.try_changed(), None);
    }

    #[test]
    fn test_unsubscribe_and_drop() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(collection(), true);
        let other = notifier.register(collection(), true);
        assert_eq!(notifier.observer_count(), 2);

        notifier.notify_change(&collection());
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(notifier.notify_change(&collection()), 1);

        // delivered before unsubscribing
        assert_eq!(sub.try_changed(), Some(collection()));
        assert_eq!(sub.try_changed(), None);

        drop(other);
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_pending_changes_coalesce() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(collection(), true);

        for id in 0..5000 {
            assert_eq!(notifier.notify_change(&item(id)), 1);
        }

        // first change since the last look, the rest folded into it
        assert_eq!(sub.try_changed(), Some(item(0)));
        assert_eq!(sub.try_changed(), None);

        notifier.notify_change(&collection());
        assert_eq!(sub.try_changed(), Some(collection()));
    }

    #[test]
    fn test_registration_remembers_notification() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.register(collection(), false);
        let (registration, _rx) = sub.into_parts();
        assert!(!registration.was_notified());

        notifier.notify_change(&collection());
        assert!(registration.was_notified());
    }

    #[tokio::test]
    async fn test_changed_ends_after_unsubscribe() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.register(collection(), false);

        notifier.notify_change(&collection());
        assert_eq!(sub.changed().await, Some(collection()));

        sub.unsubscribe();
        assert_eq!(sub.changed().await, None);
    }
}
