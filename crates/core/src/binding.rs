//! Item bindings: one accordion item's lifetime tied to its group registry.

use std::fmt;

use crate::error::CompositionError;
use crate::identity::{IdSource, InstanceId};
use crate::registry::GroupContext;

/// Scope handle for one registry subscription.
///
/// Acquiring subscribes; [`release`](Subscription::release) or dropping the
/// handle unsubscribes. The unsubscribe happens exactly once, whichever exit
/// path is taken.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: InstanceId,
    group: GroupContext,
    released: bool,
}

impl Subscription {
    pub fn acquire(group: &GroupContext, id: InstanceId) -> Self {
        group.subscribe(id.clone());
        Self {
            id,
            group: group.clone(),
            released: false,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn group(&self) -> &GroupContext {
        &self.group
    }

    /// Unsubscribe now.
    pub fn release(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        if !self.released {
            self.released = true;
            self.group.unsubscribe(&self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

/// What an item hands down to its header and panel.
///
/// Holds no flag of its own: `is_open` is looked up in the group's current
/// state on every call, so it is never stale.
#[derive(Clone)]
pub struct ItemContext {
    id: InstanceId,
    group: GroupContext,
}

impl ItemContext {
    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        self.group.is_open(&self.id)
    }

    pub fn toggle(&self) {
        self.group.toggle(&self.id);
    }

    pub fn group(&self) -> &GroupContext {
        &self.group
    }
}

impl fmt::Debug for ItemContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemContext")
            .field("id", &self.id)
            .field("is_open", &self.is_open())
            .finish()
    }
}

/// A mounted item: its id, its subscription and its derived context.
#[derive(Debug)]
pub struct ItemBinding {
    subscription: Subscription,
    context: ItemContext,
}

impl ItemBinding {
    /// Mount an item into `group`, drawing exactly one id from `ids`.
    pub fn mount(
        group: Option<&GroupContext>,
        ids: &dyn IdSource,
    ) -> Result<Self, CompositionError> {
        let group = group.ok_or(CompositionError::MissingGroupContext { component: "Item" })?;
        let id = unclaimed_id(group, ids.generate());
        let subscription = Subscription::acquire(group, id.clone());

        Ok(Self {
            subscription,
            context: ItemContext {
                id,
                group: group.clone(),
            },
        })
    }

    pub fn id(&self) -> &InstanceId {
        self.subscription.id()
    }

    pub fn context(&self) -> &ItemContext {
        &self.context
    }

    pub fn is_open(&self) -> bool {
        self.context.is_open()
    }

    pub fn toggle(&self) {
        self.context.toggle();
    }

    /// Unmount explicitly.
    pub fn release(self) {
        self.subscription.release();
    }
}

/// Returns `id`, or `id-N` with the smallest free `N` if `id` is taken.
///
/// A subscription must own its record: subscribing a taken id would be
/// ignored, and the later unsubscribe would remove another item's record.
fn unclaimed_id(group: &GroupContext, id: InstanceId) -> InstanceId {
    let snapshot = group.read_all();
    if !snapshot.contains(&id) {
        return id;
    }
    termcordion_logger::warn(format!("binding: id {} already in use", id));
    let mut n: u64 = 1;
    loop {
        let candidate = InstanceId::new(format!("{}-{}", id, n));
        if !snapshot.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SequentialIdSource;
    use std::cell::Cell;

    struct CountingIds {
        calls: Cell<usize>,
        inner: SequentialIdSource,
    }

    impl IdSource for CountingIds {
        fn generate(&self) -> InstanceId {
            self.calls.set(self.calls.get() + 1);
            self.inner.generate()
        }
    }

    #[test]
    fn test_mount_without_group_fails() {
        let ids = SequentialIdSource::new();
        let err = ItemBinding::mount(None, &ids).unwrap_err();
        assert_eq!(
            err,
            CompositionError::MissingGroupContext { component: "Item" }
        );
    }

    #[test]
    fn test_mount_generates_one_id_and_subscribes() {
        let group = GroupContext::new();
        let ids = CountingIds {
            calls: Cell::new(0),
            inner: SequentialIdSource::new(),
        };

        let binding = ItemBinding::mount(Some(&group), &ids).unwrap();
        assert_eq!(ids.calls.get(), 1);
        assert_eq!(group.len(), 1);
        assert!(group.read_all().contains(binding.id()));

        // Reading and toggling never draws a new id
        binding.toggle();
        binding.toggle();
        let _ = binding.is_open();
        assert_eq!(ids.calls.get(), 1);
        assert_eq!(binding.context().id(), binding.id());
    }

    #[test]
    fn test_fresh_binding_is_closed() {
        let group = GroupContext::new();
        let binding = ItemBinding::mount(Some(&group), &SequentialIdSource::new()).unwrap();
        assert!(!binding.is_open());
    }

    #[test]
    fn test_context_follows_registry() {
        let group = GroupContext::new();
        let ids = SequentialIdSource::new();
        let a = ItemBinding::mount(Some(&group), &ids).unwrap();
        let b = ItemBinding::mount(Some(&group), &ids).unwrap();

        let a_ctx = a.context().clone();
        a_ctx.toggle();
        assert!(a.is_open());
        assert!(a_ctx.is_open());
        assert!(!b.is_open());

        // Toggling through the group directly is visible to the binding
        group.toggle(b.id());
        assert!(b.context().is_open());
    }

    #[test]
    fn test_release_unsubscribes_once() {
        let group = GroupContext::new();
        let ids = SequentialIdSource::new();
        let a = ItemBinding::mount(Some(&group), &ids).unwrap();
        let _b = ItemBinding::mount(Some(&group), &ids).unwrap();
        let generation = group.generation();

        let stale = a.context().clone();
        a.release();
        assert_eq!(group.len(), 1);
        assert_eq!(group.generation(), generation + 1);

        // A context outliving its binding reads closed and toggles nothing
        stale.toggle();
        assert!(!stale.is_open());
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let group = GroupContext::new();
        {
            let _a = ItemBinding::mount(Some(&group), &SequentialIdSource::new()).unwrap();
            assert_eq!(group.len(), 1);
        }
        assert!(group.is_empty());
    }

    #[test]
    fn test_drop_on_unwind_unsubscribes() {
        let group = GroupContext::new();
        let handle = group.clone();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _a = ItemBinding::mount(Some(&handle), &SequentialIdSource::new()).unwrap();
            panic!("teardown");
        }));

        assert!(result.is_err());
        assert!(group.is_empty());
    }

    #[test]
    fn test_membership_lockstep() {
        let group = GroupContext::new();
        let ids = SequentialIdSource::new();
        let mut bindings: Vec<_> = (0..5)
            .map(|_| ItemBinding::mount(Some(&group), &ids).unwrap())
            .collect();
        assert_eq!(group.len(), 5);

        bindings.remove(3).release();
        drop(bindings.remove(0));
        drop(bindings.remove(1));

        let snapshot = group.read_all();
        assert_eq!(snapshot.len(), 2);
        for binding in &bindings {
            assert!(snapshot.contains(binding.id()));
        }
    }

    struct FixedIds;

    impl IdSource for FixedIds {
        fn generate(&self) -> InstanceId {
            InstanceId::from("dup")
        }
    }

    #[test]
    fn test_repeated_id_gets_its_own_record() {
        let group = GroupContext::new();
        let a = ItemBinding::mount(Some(&group), &FixedIds).unwrap();
        let b = ItemBinding::mount(Some(&group), &FixedIds).unwrap();
        let c = ItemBinding::mount(Some(&group), &FixedIds).unwrap();

        assert_eq!(a.id().as_str(), "dup");
        assert_eq!(b.id().as_str(), "dup-1");
        assert_eq!(c.id().as_str(), "dup-2");
        assert_eq!(b.context().id(), b.id());
        assert_eq!(group.len(), 3);

        drop(b);
        assert_eq!(group.len(), 2);
        a.toggle();
        assert!(a.is_open());
        assert!(!c.is_open());
    }

    #[test]
    fn test_handles_point_at_mounting_group() {
        let group = GroupContext::new();
        let binding = ItemBinding::mount(Some(&group), &SequentialIdSource::new()).unwrap();
        assert!(binding.context().group().same_group(&group));

        let subscription = Subscription::acquire(&group, InstanceId::from("extra"));
        assert!(subscription.group().same_group(binding.context().group()));
        assert_eq!(subscription.id().as_str(), "extra");
        subscription.release();
        assert_eq!(group.len(), 1);
    }
}
