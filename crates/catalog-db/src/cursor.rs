//! # Live Result Handles
//!
//! A [`ResultHandle`] is the materialised result of one query plus a
//! subscription to the address it was queried from. The rows never change;
//! the handle only learns that they have gone *stale* and the holder
//! decides when to query again.
//!
//! ```text
//! ProductStore::query ──► ResultHandle ──► ResultSlot (list screen)
//!                              ▲                │
//!         notify_change ───────┘                └─ replace(new) closes old
//! ```

use catalog_core::{Address, Row};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::sync::Mutex;

use crate::notify::{Registration, Subscription};

#[derive(Debug)]
struct Inner {
    address: Address,
    columns: Arc<[String]>,
    rows: Vec<Row>,
    registration: Registration,
    changes: Mutex<Receiver<Address>>,
    closed: AtomicBool,
}

/// Rows from one query, observing their address for changes.
///
/// Clones share the same result: closing one closes them all.
#[derive(Debug, Clone)]
pub struct ResultHandle {
    inner: Arc<Inner>,
}

impl ResultHandle {
    pub(crate) fn new(
        address: Address,
        columns: Arc<[String]>,
        rows: Vec<Row>,
        subscription: Subscription,
    ) -> Self {
        let (registration, changes) = subscription.into_parts();
        ResultHandle {
            inner: Arc::new(Inner {
                address,
                columns,
                rows,
                registration,
                changes: Mutex::new(changes),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// The address the query was made against.
    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    /// Column names, in projection order.
    pub fn columns(&self) -> &[String] {
        &self.inner.columns
    }

    /// The rows, or an empty slice once closed.
    pub fn rows(&self) -> &[Row] {
        if self.is_closed() {
            &[]
        } else {
            &self.inner.rows
        }
    }

    pub fn count(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows().iter()
    }

    /// True once a change to the observed address has been published.
    ///
    /// Set by the notifier itself, so it is accurate even while another
    /// task is parked in [`ResultHandle::changed`]. Does not wait.
    pub fn is_stale(&self) -> bool {
        self.inner.registration.was_notified()
    }

    /// Waits for the next change to the observed address.
    ///
    /// Returns `None` when the handle is closed.
    pub async fn changed(&self) -> Option<Address> {
        if self.is_closed() {
            return None;
        }
        self.inner.changes.lock().await.recv().await
    }

    /// Releases the rows and stops observing. Idempotent.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            self.inner.registration.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// True if both handles share the same underlying result.
    pub fn ptr_eq(a: &ResultHandle, b: &ResultHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<'a> IntoIterator for &'a ResultHandle {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Result Slot
// =============================================================================

/// Holds the result a screen is currently showing.
///
/// ```text
/// replace(Some(B)) while holding A   → A closed, holds B
/// replace(Some(A)) while holding A   → A kept open
/// replace(None)    while holding A   → A closed, holds nothing
/// ```
#[derive(Debug, Default)]
pub struct ResultSlot {
    current: Option<ResultHandle>,
}

impl ResultSlot {
    pub fn new() -> Self {
        ResultSlot::default()
    }

    /// Swaps in `next`, closing the previous handle unless it is the same
    /// underlying result.
    pub fn replace(&mut self, next: Option<ResultHandle>) {
        if let Some(previous) = self.current.take() {
            let same = next
                .as_ref()
                .is_some_and(|n| ResultHandle::ptr_eq(&previous, n));
            if !same {
                previous.close();
            }
        }
        self.current = next;
    }

    pub fn get(&self) -> Option<&ResultHandle> {
        self.current.as_ref()
    }

    /// Removes the handle without closing it.
    pub fn take(&mut self) -> Option<ResultHandle> {
        self.current.take()
    }

    /// Rows in the current result, 0 when empty.
    pub fn count(&self) -> usize {
        self.current.as_ref().map_or(0, ResultHandle::count)
    }
}

impl Drop for ResultSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeNotifier;
    use catalog_core::{Value, CONTENT_AUTHORITY};

    fn handle(notifier: &ChangeNotifier, names: &[&str]) -> ResultHandle {
        let address = Address::collection(CONTENT_AUTHORITY);
        let columns: Arc<[String]> = vec!["name".to_string()].into();
        let rows = names
            .iter()
            .map(|n| Row::new(columns.clone(), vec![Value::from(*n)]))
            .collect();
        let subscription = notifier.register(address.clone(), true);
        ResultHandle::new(address, columns, rows, subscription)
    }

    #[test]
    fn test_rows_and_close() {
        let notifier = ChangeNotifier::new();
        let result = handle(&notifier, &["Cap", "Boot"]);

        assert_eq!(result.count(), 2);
        assert_eq!(result.row(1).and_then(|r| r.get_text("name")), Some("Boot"));
        assert_eq!(result.iter().count(), 2);
        assert_eq!(notifier.observer_count(), 1);

        result.close();
        result.close();
        assert!(result.is_closed());
        assert_eq!(result.count(), 0);
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_stale_after_notification() {
        let notifier = ChangeNotifier::new();
        let result = handle(&notifier, &["Cap"]);
        assert!(!result.is_stale());

        notifier.notify_change(&Address::item(CONTENT_AUTHORITY, 1));
        assert!(result.is_stale());
        assert!(result.is_stale());
    }

    #[tokio::test]
    async fn test_changed_wakes_and_ends_on_close() {
        let notifier = ChangeNotifier::new();
        let result = handle(&notifier, &[]);

        notifier.notify_change(&Address::collection(CONTENT_AUTHORITY));
        assert!(result.changed().await.is_some());

        result.close();
        assert_eq!(result.changed().await, None);
    }

    #[tokio::test]
    async fn test_stale_while_another_task_waits() {
        let notifier = ChangeNotifier::new();
        let result = handle(&notifier, &["Cap"]);

        let waiter = tokio::spawn({
            let result = result.clone();
            async move { result.changed().await }
        });
        tokio::task::yield_now().await;

        notifier.notify_change(&Address::item(CONTENT_AUTHORITY, 1));
        assert!(result.is_stale());
        assert_eq!(
            waiter.await.unwrap(),
            Some(Address::item(CONTENT_AUTHORITY, 1))
        );
    }

    #[test]
    fn test_slot_replace_closes_previous() {
        let notifier = ChangeNotifier::new();
        let a = handle(&notifier, &["Cap"]);
        let b = handle(&notifier, &["Boot", "Jogger"]);

        let mut slot = ResultSlot::new();
        slot.replace(Some(a.clone()));
        slot.replace(Some(b.clone()));

        assert!(a.is_closed());
        assert!(!b.is_closed());
        assert_eq!(slot.count(), 2);
    }

    #[test]
    fn test_slot_replace_same_handle_keeps_it_open() {
        let notifier = ChangeNotifier::new();
        let a = handle(&notifier, &["Cap"]);

        let mut slot = ResultSlot::new();
        slot.replace(Some(a.clone()));
        slot.replace(Some(a.clone()));

        assert!(!a.is_closed());
        assert_eq!(slot.count(), 1);
    }

    #[test]
    fn test_slot_clear_and_drop() {
        let notifier = ChangeNotifier::new();
        let a = handle(&notifier, &["Cap"]);
        let b = handle(&notifier, &["Boot"]);

        let mut slot = ResultSlot::new();
        slot.replace(Some(a.clone()));
        slot.replace(None);
        assert!(a.is_closed());
        assert!(slot.get().is_none());

        {
            let mut slot = ResultSlot::new();
            slot.replace(Some(b.clone()));
        }
        assert!(b.is_closed());
        assert_eq!(notifier.observer_count(), 0);
    }
}
