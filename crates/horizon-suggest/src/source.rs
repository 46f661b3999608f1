//! Candidate collections and the raw candidate cache.
//!
//! A suggestion control reads its candidates from a [`CandidateCollection`].
//! Collections that can change over time expose a change signal carrying
//! [`CollectionChange`] notifications; [`ObservableList`] is the stock
//! implementation.
//!
//! [`CandidateSource`] owns the control's private copy of the candidates (the
//! raw cache). It subscribes to the current collection, queues incoming
//! notifications, and mirrors them into the cache when the control drains the
//! queue. Replacing the collection tears down the old subscription before the
//! new one is attached.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_suggest::source::{CandidateCollection, CandidateSource, ObservableList};
//!
//! let states = Arc::new(ObservableList::new(vec!["Alabama".to_string()]));
//! let mut source = CandidateSource::new();
//! source.set_source(Some(states.clone() as Arc<dyn CandidateCollection<String>>));
//!
//! states.push("Alaska".to_string());
//! for change in source.drain_pending() {
//!     source.apply_change(change);
//! }
//! assert_eq!(source.snapshot(), ["Alabama", "Alaska"]);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use horizon_suggest_core::logging::targets;
use horizon_suggest_core::{Signal, Subscription};
use parking_lot::{Mutex, RwLock};

/// An index-based change to a candidate collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// `items` were inserted starting at `index`.
    Add {
        /// Position of the first inserted item.
        index: usize,
        /// The inserted items, in order.
        items: Vec<T>,
    },
    /// `items` were removed starting at `index`.
    Remove {
        /// Position of the first removed item.
        index: usize,
        /// The removed items, in order.
        items: Vec<T>,
    },
    /// The items starting at `index` were replaced.
    Replace {
        /// Position of the first replaced item.
        index: usize,
        /// The items that were there before.
        old: Vec<T>,
        /// The items that are there now.
        new: Vec<T>,
    },
    /// The collection changed too much to describe; re-read it.
    Reset,
}

/// A collection the control can draw candidates from.
pub trait CandidateCollection<T>: Send + Sync {
    /// A copy of the current contents, in order.
    fn snapshot(&self) -> Vec<T>;

    /// The signal announcing changes, if the collection can change.
    fn change_signal(&self) -> Option<&Signal<CollectionChange<T>>> {
        None
    }
}

impl<T: Clone + Send + Sync> CandidateCollection<T> for Vec<T> {
    fn snapshot(&self) -> Vec<T> {
        self.clone()
    }
}

/// A list that announces every mutation through [`CollectionChange`]s.
///
/// Notifications are emitted after the lock is released, so slots may read
/// the list.
pub struct ObservableList<T: Send + 'static> {
    items: RwLock<Vec<T>>,
    changed: Signal<CollectionChange<T>>,
}

impl<T: Clone + Send + Sync + 'static> ObservableList<T> {
    /// Creates a list with initial items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            changed: Signal::new(),
        }
    }

    /// Creates an empty list.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a copy of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Returns a copy of all items.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// The signal emitted after every mutation.
    pub fn changed(&self) -> &Signal<CollectionChange<T>> {
        &self.changed
    }

    /// Appends an item to the end of the list.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.changed.emit(CollectionChange::Add {
            index,
            items: vec![item],
        });
    }

    /// Appends several items with a single notification.
    pub fn extend(&self, new_items: Vec<T>) {
        if new_items.is_empty() {
            return;
        }
        let index = {
            let mut items = self.items.write();
            let index = items.len();
            items.extend(new_items.iter().cloned());
            index
        };
        self.changed.emit(CollectionChange::Add {
            index,
            items: new_items,
        });
    }

    /// Inserts an item at the specified index.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, item: T) {
        self.items.write().insert(index, item.clone());
        self.changed.emit(CollectionChange::Add {
            index,
            items: vec![item],
        });
    }

    /// Removes and returns the item at the specified index.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.write();
            (index < items.len()).then(|| items.remove(index))
        }?;
        self.changed.emit(CollectionChange::Remove {
            index,
            items: vec![removed.clone()],
        });
        Some(removed)
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        let old = {
            let mut items = self.items.write();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item.clone())
        };
        self.changed.emit(CollectionChange::Replace {
            index,
            old: vec![old.clone()],
            new: vec![item],
        });
        Some(old)
    }

    /// Replaces all items.
    pub fn replace_all(&self, items: Vec<T>) {
        *self.items.write() = items;
        self.changed.emit(CollectionChange::Reset);
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.replace_all(Vec::new());
    }
}

impl<T: Clone + Send + Sync + 'static> CandidateCollection<T> for ObservableList<T> {
    fn snapshot(&self) -> Vec<T> {
        self.to_vec()
    }

    fn change_signal(&self) -> Option<&Signal<CollectionChange<T>>> {
        Some(&self.changed)
    }
}

/// What mirroring a change did to the raw cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEffect<T> {
    /// Items that left the cache and must leave the filtered view too.
    pub removed: Vec<T>,
    /// Whether the cache was rebuilt from scratch.
    pub rebuilt: bool,
}

impl<T> ChangeEffect<T> {
    fn rebuilt() -> Self {
        Self {
            removed: Vec::new(),
            rebuilt: true,
        }
    }

    fn removed(removed: Vec<T>) -> Self {
        Self {
            removed,
            rebuilt: false,
        }
    }
}

type PendingQueue<T> = Arc<Mutex<VecDeque<CollectionChange<T>>>>;

/// The control's private mirror of its candidate collection.
pub struct CandidateSource<T: Send + 'static> {
    source: Option<Arc<dyn CandidateCollection<T>>>,
    raw: Vec<T>,
    pending: PendingQueue<T>,
    subscription: Subscription<CollectionChange<T>>,
}

impl<T> CandidateSource<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a source with no collection attached.
    pub fn new() -> Self {
        Self {
            source: None,
            raw: Vec::new(),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            subscription: Subscription::detached(),
        }
    }

    /// Attaches a new collection, or detaches with `None`.
    ///
    /// The previous subscription is torn down first and any of its queued
    /// notifications are discarded. The raw cache is rebuilt from the new
    /// collection's current contents.
    pub fn set_source(&mut self, source: Option<Arc<dyn CandidateCollection<T>>>) {
        self.subscription.cancel();
        self.pending.lock().clear();

        self.raw = source.as_ref().map(|s| s.snapshot()).unwrap_or_default();
        self.subscription = match &source {
            Some(collection) => {
                let pending = Arc::clone(&self.pending);
                Subscription::new(
                    Arc::clone(collection),
                    |collection| collection.change_signal(),
                    move |change: &CollectionChange<T>| pending.lock().push_back(change.clone()),
                )
            }
            None => Subscription::detached(),
        };

        tracing::debug!(
            target: targets::SOURCE,
            attached = source.is_some(),
            observable = self.subscription.is_attached(),
            len = self.raw.len(),
            "candidate source replaced"
        );
        self.source = source;
    }

    /// Whether a collection is attached.
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Whether the attached collection reports its changes.
    pub fn is_observing(&self) -> bool {
        self.subscription.is_attached()
    }

    /// The raw cache, in source order.
    pub fn snapshot(&self) -> &[T] {
        &self.raw
    }

    /// Whether `item` is currently a candidate.
    pub fn contains(&self, item: &T) -> bool {
        self.raw.contains(item)
    }

    /// Whether notifications are waiting to be mirrored.
    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Takes every queued notification, oldest first.
    pub fn drain_pending(&self) -> Vec<CollectionChange<T>> {
        self.pending.lock().drain(..).collect()
    }

    /// Mirrors one change into the raw cache.
    ///
    /// Indices that no longer line up with the cache are tolerated: inserts
    /// past the end are appended, and removed or replaced items are located by
    /// value when they are not at the reported position.
    pub fn apply_change(&mut self, change: CollectionChange<T>) -> ChangeEffect<T> {
        match change {
            CollectionChange::Add { index, items } => {
                let len = self.raw.len();
                let at = if index > len {
                    tracing::warn!(
                        target: targets::SOURCE,
                        index,
                        len,
                        "add notification past the end of the cache, appending"
                    );
                    len
                } else {
                    index
                };
                let count = items.len();
                let tail = self.raw.split_off(at);
                self.raw.extend(items);
                self.raw.extend(tail);
                tracing::trace!(target: targets::SOURCE, index = at, count, "mirrored add");
                ChangeEffect::removed(Vec::new())
            }
            CollectionChange::Remove { index, items } => {
                let removed = items
                    .into_iter()
                    .filter_map(|item| self.remove_near(index, item))
                    .collect::<Vec<_>>();
                tracing::trace!(target: targets::SOURCE, index, count = removed.len(), "mirrored remove");
                ChangeEffect::removed(removed)
            }
            CollectionChange::Replace { index, old, new } => {
                for (offset, item) in new.into_iter().enumerate() {
                    let position = index + offset;
                    match self.raw.get_mut(position) {
                        Some(slot) => *slot = item,
                        None => tracing::warn!(
                            target: targets::SOURCE,
                            index = position,
                            len = self.raw.len(),
                            "replace notification out of range, skipping"
                        ),
                    }
                }
                let removed = old
                    .into_iter()
                    .filter(|item| !self.raw.contains(item))
                    .collect::<Vec<_>>();
                tracing::trace!(target: targets::SOURCE, index, "mirrored replace");
                ChangeEffect::removed(removed)
            }
            CollectionChange::Reset => {
                self.raw = self
                    .source
                    .as_ref()
                    .map(|s| s.snapshot())
                    .unwrap_or_default();
                tracing::debug!(target: targets::SOURCE, len = self.raw.len(), "cache rebuilt after reset");
                ChangeEffect::rebuilt()
            }
        }
    }

    fn remove_near(&mut self, index: usize, item: T) -> Option<T> {
        if self.raw.get(index) == Some(&item) {
            return Some(self.raw.remove(index));
        }
        match self.raw.iter().position(|candidate| *candidate == item) {
            Some(position) => {
                tracing::debug!(
                    target: targets::SOURCE,
                    reported = index,
                    actual = position,
                    "removed item found away from its reported index"
                );
                Some(self.raw.remove(position))
            }
            None => {
                tracing::warn!(
                    target: targets::SOURCE,
                    index,
                    "remove notification for an item not in the cache, skipping"
                );
                None
            }
        }
    }
}

impl<T> Default for CandidateSource<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> Vec<String> {
        ["Alabama", "Alaska", "Arizona"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn attach(list: &Arc<ObservableList<String>>) -> CandidateSource<String> {
        let mut source = CandidateSource::new();
        source.set_source(Some(list.clone() as Arc<dyn CandidateCollection<String>>));
        source
    }

    fn sync(source: &mut CandidateSource<String>) {
        for change in source.drain_pending() {
            source.apply_change(change);
        }
    }

    #[test]
    fn test_observable_list_emits_changes() {
        let list = ObservableList::new(states());
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        list.changed().connect(move |change| received_clone.lock().push(change.clone()));

        list.push("Arkansas".into());
        list.remove(0);
        list.set(0, "Alaska!".into());
        list.clear();

        let received = received.lock();
        assert_eq!(received.len(), 4);
        assert!(matches!(received[0], CollectionChange::Add { index: 3, .. }));
        assert!(matches!(received[1], CollectionChange::Remove { index: 0, .. }));
        assert!(matches!(received[2], CollectionChange::Replace { index: 0, .. }));
        assert_eq!(received[3], CollectionChange::Reset);
    }

    #[test]
    fn test_observable_list_out_of_range_is_silent() {
        let list = ObservableList::new(states());
        let emitted = Arc::new(Mutex::new(0));

        let emitted_clone = emitted.clone();
        list.changed().connect(move |_| *emitted_clone.lock() += 1);

        assert_eq!(list.remove(10), None);
        assert_eq!(list.set(10, "x".into()), None);
        list.extend(Vec::new());
        assert_eq!(*emitted.lock(), 0);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_set_source_copies_snapshot() {
        let list = Arc::new(ObservableList::new(states()));
        let source = attach(&list);
        assert_eq!(source.snapshot(), states().as_slice());
        assert!(source.is_observing());
    }

    #[test]
    fn test_static_collection_is_not_observed() {
        let mut source = CandidateSource::new();
        source.set_source(Some(Arc::new(states()) as Arc<dyn CandidateCollection<String>>));
        assert_eq!(source.snapshot().len(), 3);
        assert!(!source.is_observing());
    }

    #[test]
    fn test_absent_source_is_empty() {
        let list = Arc::new(ObservableList::new(states()));
        let mut source = attach(&list);
        source.set_source(None);
        assert!(source.snapshot().is_empty());
        assert!(!source.has_source());
    }

    #[test]
    fn test_replacing_source_tears_down_subscription() {
        let old = Arc::new(ObservableList::new(states()));
        let mut source = attach(&old);
        assert_eq!(old.changed().connection_count(), 1);

        let new = Arc::new(ObservableList::new(vec!["Texas".to_string()]));
        source.set_source(Some(new.clone() as Arc<dyn CandidateCollection<String>>));
        assert_eq!(old.changed().connection_count(), 0);

        old.push("Ignored".into());
        assert!(!source.has_pending());
        assert_eq!(source.snapshot(), ["Texas"]);
    }

    #[test]
    fn test_incremental_changes_are_mirrored() {
        let list = Arc::new(ObservableList::new(states()));
        let mut source = attach(&list);

        list.insert(1, "Alaskan".into());
        list.remove(0);
        list.set(2, "Arizona!".into());
        sync(&mut source);

        assert_eq!(source.snapshot(), list.to_vec().as_slice());
    }

    #[test]
    fn test_reset_rebuilds_from_live_source() {
        let list = Arc::new(ObservableList::new(states()));
        let mut source = attach(&list);

        list.replace_all(vec!["Texas".into(), "Utah".into()]);
        let effect = source.apply_change(source.drain_pending().remove(0));

        assert!(effect.rebuilt);
        assert_eq!(source.snapshot(), ["Texas", "Utah"]);
    }

    #[test]
    fn test_add_past_end_is_appended() {
        let mut source = CandidateSource::new();
        source.set_source(Some(Arc::new(states()) as Arc<dyn CandidateCollection<String>>));

        source.apply_change(CollectionChange::Add {
            index: 99,
            items: vec!["Wyoming".into()],
        });
        assert_eq!(source.snapshot().last().map(String::as_str), Some("Wyoming"));
    }

    #[test]
    fn test_remove_with_stale_index_finds_item() {
        let mut source = CandidateSource::new();
        source.set_source(Some(Arc::new(states()) as Arc<dyn CandidateCollection<String>>));

        let effect = source.apply_change(CollectionChange::Remove {
            index: 0,
            items: vec!["Arizona".into()],
        });
        assert_eq!(effect.removed, vec!["Arizona".to_string()]);
        assert_eq!(source.snapshot(), ["Alabama", "Alaska"]);

        let effect = source.apply_change(CollectionChange::Remove {
            index: 5,
            items: vec!["Nowhere".into()],
        });
        assert!(effect.removed.is_empty());
        assert_eq!(source.snapshot().len(), 2);
    }

    #[test]
    fn test_replace_reports_departed_items() {
        let mut source = CandidateSource::new();
        source.set_source(Some(Arc::new(states()) as Arc<dyn CandidateCollection<String>>));

        let effect = source.apply_change(CollectionChange::Replace {
            index: 1,
            old: vec!["Alaska".into()],
            new: vec!["Arkansas".into()],
        });
        assert_eq!(effect.removed, vec!["Alaska".to_string()]);
        assert!(source.contains(&"Arkansas".to_string()));
        assert!(!source.contains(&"Alaska".to_string()));
    }
}
