//! Group registry: the open/closed flags of every item in one group.
//!
//! `Registry` is the plain state machine. `GroupContext` is the shared handle
//! a group hands to its items; it applies transitions and pushes each change
//! to registered listeners.
//!
//! # Invariants
//!
//! 1. Ids are unique within a registry; `subscribe` never overwrites.
//! 2. `toggle`/`unsubscribe` of an unknown id change nothing and notify no one.
//! 3. A `Snapshot` never changes after it is taken. Transitions copy the
//!    record map only while an older snapshot is still alive.
//! 4. Listeners run after the transition is applied, outside the borrow.
//! 5. Every listener sees changes in the order they were applied, even when a
//!    listener triggers further transitions. Nested changes are queued and
//!    delivered by the outermost call.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::identity::InstanceId;

/// One item's entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub id: InstanceId,
    pub is_open: bool,
}

/// Immutable view of all records at one point in time.
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Rc<HashMap<InstanceId, bool>>,
}

impl Snapshot {
    /// Open flag of `id`; absent ids read as closed.
    pub fn is_open(&self, id: &InstanceId) -> bool {
        self.records.get(id).copied().unwrap_or(false)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &InstanceId) -> Option<InstanceRecord> {
        self.records.get(id).map(|&is_open| InstanceRecord {
            id: id.clone(),
            is_open,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records currently open.
    pub fn open_count(&self) -> usize {
        self.records.values().filter(|&&open| open).count()
    }

    pub fn records(&self) -> impl Iterator<Item = InstanceRecord> + '_ {
        self.records.iter().map(|(id, &is_open)| InstanceRecord {
            id: id.clone(),
            is_open,
        })
    }

    /// True when both snapshots share the same underlying storage.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Rc::ptr_eq(&self.records, &other.records)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for Snapshot {}

/// A transition that actually changed the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Subscribed(InstanceId),
    Unsubscribed(InstanceId),
    Toggled { id: InstanceId, is_open: bool },
}

impl Change {
    pub fn id(&self) -> &InstanceId {
        match self {
            Change::Subscribed(id) | Change::Unsubscribed(id) | Change::Toggled { id, .. } => id,
        }
    }
}

/// Registry state machine.
///
/// Every method returns the `Change` it made, or `None` for a no-op.
#[derive(Debug, Default)]
pub struct Registry {
    records: Rc<HashMap<InstanceId, bool>>,
    generation: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` as closed.
    pub fn subscribe(&mut self, id: InstanceId) -> Option<Change> {
        if self.records.contains_key(&id) {
            termcordion_logger::warn(format!("registry: duplicate subscribe of {}", id));
            return None;
        }
        Rc::make_mut(&mut self.records).insert(id.clone(), false);
        self.generation += 1;
        Some(Change::Subscribed(id))
    }

    /// Remove `id` if present.
    pub fn unsubscribe(&mut self, id: &InstanceId) -> Option<Change> {
        if !self.records.contains_key(id) {
            return None;
        }
        Rc::make_mut(&mut self.records).remove(id);
        self.generation += 1;
        Some(Change::Unsubscribed(id.clone()))
    }

    /// Flip the flag of `id` if present.
    pub fn toggle(&mut self, id: &InstanceId) -> Option<Change> {
        let current = *self.records.get(id)?;
        Rc::make_mut(&mut self.records).insert(id.clone(), !current);
        self.generation += 1;
        Some(Change::Toggled {
            id: id.clone(),
            is_open: !current,
        })
    }

    pub fn read_all(&self) -> Snapshot {
        Snapshot {
            records: Rc::clone(&self.records),
        }
    }

    /// Count of applied (non no-op) transitions.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle returned by [`GroupContext::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Snapshot, &Change)>;

#[derive(Default)]
struct Shared {
    registry: Registry,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    pending: VecDeque<(Snapshot, Change)>,
    dispatching: bool,
}

/// Clears the dispatch flag even if a listener panics.
struct DispatchGuard<'a>(&'a RefCell<Shared>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let mut shared = self.0.borrow_mut();
        shared.dispatching = false;
        shared.pending.clear();
    }
}

/// Shared handle to one group's registry.
///
/// Cloning is cheap and every clone refers to the same group. The handle is
/// single-threaded (`!Send`): all transitions run on the UI thread.
#[derive(Clone, Default)]
pub struct GroupContext {
    inner: Rc<RefCell<Shared>>,
}

impl GroupContext {
    /// Create an empty registry for a newly mounted group.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, id: InstanceId) {
        self.apply(|registry| registry.subscribe(id));
    }

    pub fn unsubscribe(&self, id: &InstanceId) {
        self.apply(|registry| registry.unsubscribe(id));
    }

    pub fn toggle(&self, id: &InstanceId) {
        self.apply(|registry| registry.toggle(id));
    }

    pub fn read_all(&self) -> Snapshot {
        self.inner.borrow().registry.read_all()
    }

    pub fn is_open(&self, id: &InstanceId) -> bool {
        self.inner.borrow().registry.records.get(id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().registry.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn generation(&self) -> u64 {
        self.inner.borrow().registry.generation()
    }

    /// Register a listener called after every applied transition.
    pub fn on_change(&self, listener: impl Fn(&Snapshot, &Change) + 'static) -> ListenerId {
        let mut shared = self.inner.borrow_mut();
        let id = ListenerId(shared.next_listener);
        shared.next_listener += 1;
        shared.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut shared = self.inner.borrow_mut();
        let before = shared.listeners.len();
        shared.listeners.retain(|(lid, _)| *lid != id);
        shared.listeners.len() != before
    }

    /// True if both handles point at the same group.
    pub fn same_group(&self, other: &GroupContext) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn apply(&self, transition: impl FnOnce(&mut Registry) -> Option<Change>) {
        {
            let mut shared = self.inner.borrow_mut();
            let Some(change) = transition(&mut shared.registry) else {
                return;
            };
            termcordion_logger::debug(format!("registry: {:?}", change));
            let snapshot = shared.registry.read_all();
            shared.pending.push_back((snapshot, change));
            if shared.dispatching {
                return;
            }
            shared.dispatching = true;
        }

        let _guard = DispatchGuard(&self.inner);
        loop {
            let (snapshot, change, listeners) = {
                let mut shared = self.inner.borrow_mut();
                let Some((snapshot, change)) = shared.pending.pop_front() else {
                    break;
                };
                let listeners: Vec<Listener> =
                    shared.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
                (snapshot, change, listeners)
            };
            for listener in listeners {
                listener(&snapshot, &change);
            }
        }
    }
}

impl fmt::Debug for GroupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.borrow();
        f.debug_struct("GroupContext")
            .field("records", &shared.registry.records.len())
            .field("generation", &shared.registry.generation)
            .field("listeners", &shared.listeners.len())
            .field("pending", &shared.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn id(s: &str) -> InstanceId {
        InstanceId::from(s)
    }

    #[test]
    fn test_subscribe_starts_closed() {
        let group = GroupContext::new();
        group.subscribe(id("a"));

        assert_eq!(group.len(), 1);
        assert!(!group.is_open(&id("a")));
        assert_eq!(
            group.read_all().get(&id("a")),
            Some(InstanceRecord {
                id: id("a"),
                is_open: false
            })
        );
    }

    #[test]
    fn test_toggle_twice_restores() {
        let group = GroupContext::new();
        group.subscribe(id("a"));

        group.toggle(&id("a"));
        assert!(group.is_open(&id("a")));
        group.toggle(&id("a"));
        assert!(!group.is_open(&id("a")));
    }

    #[test]
    fn test_toggle_is_isolated() {
        let group = GroupContext::new();
        group.subscribe(id("a"));
        group.subscribe(id("b"));

        group.toggle(&id("a"));
        assert!(group.is_open(&id("a")));
        assert!(!group.is_open(&id("b")));

        group.toggle(&id("b"));
        group.toggle(&id("a"));
        assert!(!group.is_open(&id("a")));
        assert!(group.is_open(&id("b")));
    }

    #[test]
    fn test_toggle_unknown_is_noop() {
        let group = GroupContext::new();
        group.subscribe(id("a"));
        group.toggle(&id("a"));

        let before = group.read_all();
        let generation = group.generation();
        group.toggle(&id("missing"));
        let after = group.read_all();

        assert_eq!(before, after);
        assert!(before.ptr_eq(&after));
        assert_eq!(group.generation(), generation);
        assert!(!after.contains(&id("missing")));
    }

    #[test]
    fn test_unknown_id_reads_closed() {
        let group = GroupContext::new();
        assert!(!group.is_open(&id("ghost")));
        assert!(!group.read_all().is_open(&id("ghost")));
    }

    #[test]
    fn test_unsubscribe_twice_is_safe() {
        let group = GroupContext::new();
        group.subscribe(id("a"));
        group.subscribe(id("b"));

        group.unsubscribe(&id("a"));
        group.unsubscribe(&id("a"));
        group.unsubscribe(&id("never"));

        assert_eq!(group.len(), 1);
        assert!(group.read_all().contains(&id("b")));
    }

    #[test]
    fn test_duplicate_subscribe_keeps_existing_record() {
        let mut registry = Registry::new();
        registry.subscribe(id("a"));
        registry.toggle(&id("a"));

        assert_eq!(registry.subscribe(id("a")), None);
        assert!(registry.read_all().is_open(&id("a")));
        assert_eq!(registry.read_all().len(), 1);
    }

    #[test]
    fn test_snapshot_is_copy_on_write() {
        let group = GroupContext::new();
        group.subscribe(id("a"));

        let held = group.read_all();
        group.toggle(&id("a"));
        group.subscribe(id("b"));

        assert!(!held.is_open(&id("a")));
        assert_eq!(held.len(), 1);

        let fresh = group.read_all();
        assert!(fresh.is_open(&id("a")));
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh.open_count(), 1);
    }

    #[test]
    fn test_registry_changes() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.subscribe(id("a")),
            Some(Change::Subscribed(id("a")))
        );
        assert_eq!(
            registry.toggle(&id("a")),
            Some(Change::Toggled {
                id: id("a"),
                is_open: true
            })
        );
        assert_eq!(registry.toggle(&id("b")), None);
        assert_eq!(
            registry.unsubscribe(&id("a")),
            Some(Change::Unsubscribed(id("a")))
        );
        assert_eq!(registry.unsubscribe(&id("a")), None);
        assert_eq!(registry.generation(), 3);
    }

    #[test]
    fn test_listeners_see_applied_changes_only() {
        let group = GroupContext::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        group.on_change(move |snapshot, change| {
            sink.borrow_mut().push((change.clone(), snapshot.len()));
        });

        group.subscribe(id("a"));
        group.toggle(&id("a"));
        group.toggle(&id("zzz"));
        group.unsubscribe(&id("zzz"));
        group.unsubscribe(&id("a"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (Change::Subscribed(id("a")), 1));
        assert_eq!(
            seen[1],
            (
                Change::Toggled {
                    id: id("a"),
                    is_open: true
                },
                1
            )
        );
        assert_eq!(seen[2], (Change::Unsubscribed(id("a")), 0));
    }

    #[test]
    fn test_remove_listener() {
        let group = GroupContext::new();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        let listener = group.on_change(move |_, _| counter.set(counter.get() + 1));

        group.subscribe(id("a"));
        assert!(group.remove_listener(listener));
        assert!(!group.remove_listener(listener));
        group.toggle(&id("a"));

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_listener_may_reenter_registry() {
        let group = GroupContext::new();
        let handle = group.clone();

        // Opening "a" also subscribes "b"
        group.on_change(move |_, change| {
            if let Change::Toggled { is_open: true, .. } = change {
                handle.subscribe(InstanceId::from("b"));
            }
        });

        group.subscribe(id("a"));
        group.toggle(&id("a"));

        let snapshot = group.read_all();
        assert!(snapshot.is_open(&id("a")));
        assert!(snapshot.contains(&id("b")));
        assert!(!snapshot.is_open(&id("b")));
    }

    #[test]
    fn test_same_group() {
        let group = GroupContext::new();
        let other = GroupContext::new();
        assert!(group.same_group(&group.clone()));
        assert!(!group.same_group(&other));
    }

    #[test]
    fn test_nested_changes_reach_every_listener_in_order() {
        let group = GroupContext::new();
        let handle = group.clone();
        group.on_change(move |_, change| {
            if let Change::Toggled { is_open: true, .. } = change {
                handle.subscribe(InstanceId::from("b"));
            }
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        group.on_change(move |snapshot, change| {
            sink.borrow_mut().push((change.clone(), snapshot.len()));
        });

        group.subscribe(id("a"));
        group.toggle(&id("a"));

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                (Change::Subscribed(id("a")), 1),
                (
                    Change::Toggled {
                        id: id("a"),
                        is_open: true
                    },
                    1
                ),
                (Change::Subscribed(id("b")), 2),
            ]
        );
        let (last, len) = seen.last().unwrap();
        assert_eq!(last.id(), &id("b"));
        assert_eq!(*len, group.len());
    }

    #[test]
    fn test_listener_panic_does_not_block_later_changes() {
        let group = GroupContext::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        group.on_change(move |_, change| {
            counter.set(counter.get() + 1);
            if change.id().as_str() == "boom" {
                panic!("listener failure");
            }
        });

        let handle = group.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handle.subscribe(id("boom"));
        }));
        assert!(result.is_err());

        group.subscribe(id("a"));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_snapshot_records_lists_every_entry() {
        let group = GroupContext::new();
        group.subscribe(id("a"));
        group.subscribe(id("b"));
        group.toggle(&id("b"));

        let mut records: Vec<InstanceRecord> = group.read_all().records().collect();
        records.sort_by(|x, y| x.id.as_str().cmp(y.id.as_str()));
        assert_eq!(
            records,
            vec![
                InstanceRecord {
                    id: id("a"),
                    is_open: false
                },
                InstanceRecord {
                    id: id("b"),
                    is_open: true
                },
            ]
        );
    }
}
