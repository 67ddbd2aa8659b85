//! Key/value containers.
//!
//! A container is a reference-identity aggregate of named slots. Slots keep
//! insertion order. A container may delegate missing keys to a prototype and
//! may carry a task, which makes it a callable container.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::slot::{PropertyFlags, ReactiveSlot, Slot};
use super::value::Value;
use crate::error::{Error, Result};
use crate::reactive::Task;

/// Key that would alias the prototype link; never made reactive.
pub(crate) const PROTOTYPE_KEY: &str = "__proto__";

/// Unique identifier for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct ContainerInner {
    id: ContainerId,
    slots: RefCell<IndexMap<String, Slot>>,
    prototype: Option<Container>,
    task: Option<Task>,
    observed: Cell<bool>,
    ignored: Cell<bool>,
}

/// Handle to a key/value aggregate. Clones refer to the same container.
///
/// # Example
///
/// ```rust,ignore
/// let point = Container::new().with("x", 1).with("y", 2);
/// runtime.observe_container(&point)?;
///
/// point.set("x", 5)?; // re-runs every task that read `x`
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Rc<ContainerInner>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Create an empty container whose missing keys are read from
    /// `prototype`.
    pub fn with_prototype(prototype: Container) -> Self {
        Self::build(Some(prototype), None)
    }

    /// Create an empty callable container carrying `task`.
    pub fn callable(task: Task) -> Self {
        Self::build(None, Some(task))
    }

    fn build(prototype: Option<Container>, task: Option<Task>) -> Self {
        Self {
            inner: Rc::new(ContainerInner {
                id: ContainerId::new(),
                slots: RefCell::new(IndexMap::new()),
                prototype,
                task,
                observed: Cell::new(false),
                ignored: Cell::new(false),
            }),
        }
    }

    /// Builder-style insert of a plain, open data slot.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner
            .slots
            .borrow_mut()
            .insert(key.into(), Slot::data(value.into()));
        self
    }

    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    pub fn ptr_eq(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn prototype(&self) -> Option<&Container> {
        self.inner.prototype.as_ref()
    }

    pub fn task(&self) -> Option<&Task> {
        self.inner.task.as_ref()
    }

    pub fn is_callable(&self) -> bool {
        self.inner.task.is_some()
    }

    /// Check if the container carries the reactive marker.
    pub fn is_observed(&self) -> bool {
        self.inner.observed.get()
    }

    /// Check if the container was opted out of reactivity.
    pub fn is_ignored(&self) -> bool {
        self.inner.ignored.get()
    }

    pub(crate) fn mark_observed(&self) {
        self.inner.observed.set(true);
    }

    pub(crate) fn mark_ignored(&self) {
        self.inner.ignored.set(true);
    }

    /// Read a key. Reactive slots record the running task as a dependant.
    ///
    /// Missing keys are looked up on the prototype chain, then default to
    /// `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        self.read(key, true)
    }

    /// Read a key without recording a dependency.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.read(key, false)
    }

    fn read(&self, key: &str, tracked: bool) -> Value {
        let slot = self.inner.slots.borrow().get(key).cloned();
        match slot {
            Some(Slot::Data { value, .. }) => value,
            Some(Slot::Reactive(slot)) if tracked => slot.get(),
            Some(Slot::Reactive(slot)) => slot.peek(),
            None => match &self.inner.prototype {
                Some(prototype) => prototype.read(key, tracked),
                None => Value::Undefined,
            },
        }
    }

    /// Write a key.
    ///
    /// Reactive slots notify their dependants before this returns, and any
    /// task failure is returned here after the value has been stored. Missing
    /// keys become plain, untracked slots. Writes to read-only slots are
    /// ignored.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let reactive = match self.inner.slots.borrow().get(key) {
            Some(Slot::Reactive(slot)) => Some(slot.clone()),
            _ => None,
        };
        if let Some(slot) = reactive {
            return slot.set(value);
        }

        let previous = {
            let mut slots = self.inner.slots.borrow_mut();
            match slots.get_mut(key) {
                Some(Slot::Data {
                    value: current,
                    flags,
                }) => {
                    if !flags.writable {
                        return Ok(());
                    }
                    std::mem::replace(current, value)
                }
                _ => {
                    slots.insert(key.to_string(), Slot::data(value));
                    Value::Undefined
                }
            }
        };
        drop(previous);
        Ok(())
    }

    /// Define or redefine a plain data slot with explicit flags.
    ///
    /// Redefining a reactive slot turns it back into plain data. Fails if the
    /// existing slot is not configurable.
    pub fn define_property(
        &self,
        key: &str,
        value: impl Into<Value>,
        flags: PropertyFlags,
    ) -> Result<()> {
        let previous = {
            let mut slots = self.inner.slots.borrow_mut();
            if let Some(existing) = slots.get(key) {
                if !existing.is_configurable() {
                    return Err(Error::NonConfigurable(key.to_string()));
                }
            }
            slots.insert(
                key.to_string(),
                Slot::Data {
                    value: value.into(),
                    flags,
                },
            )
        };
        drop(previous);
        Ok(())
    }

    /// Check for an own slot, enumerable or not.
    pub fn has_own(&self, key: &str) -> bool {
        self.inner.slots.borrow().contains_key(key)
    }

    /// Own enumerable keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .slots
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.is_enumerable())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of own slots.
    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.borrow().is_empty()
    }

    /// Check if `key` is backed by a reactive slot.
    pub fn is_reactive_key(&self, key: &str) -> bool {
        matches!(self.inner.slots.borrow().get(key), Some(Slot::Reactive(_)))
    }

    /// Number of tasks depending on `key`. Zero for plain or missing keys.
    pub fn dependant_count(&self, key: &str) -> usize {
        match self.inner.slots.borrow().get(key) {
            Some(Slot::Reactive(slot)) => slot.dependants().len(),
            _ => 0,
        }
    }

    /// Own data slots eligible for reactivity, with their current values.
    pub(crate) fn reactive_candidates(&self) -> Vec<(String, Value)> {
        self.inner
            .slots
            .borrow()
            .iter()
            .filter(|(key, slot)| {
                key.as_str() != PROTOTYPE_KEY && slot.is_enumerable() && slot.is_configurable()
            })
            .filter_map(|(key, slot)| match slot {
                Slot::Data { value, .. } => Some((key.clone(), value.clone())),
                Slot::Reactive(_) => None,
            })
            .collect()
    }

    /// Replace a slot in place with a reactive accessor.
    pub(crate) fn install_slot(&self, key: String, slot: ReactiveSlot) {
        let previous = self
            .inner
            .slots
            .borrow_mut()
            .insert(key, Slot::Reactive(Rc::new(slot)));
        drop(previous);
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Container {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Container::new(), |container, (key, value)| container.with(key, value))
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// Containers may reference themselves, so never print slot values.
impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id())
            .field("keys", &self.keys())
            .field("callable", &self.is_callable())
            .field("observed", &self.is_observed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_plain_slots() {
        let container = Container::new().with("a", 10);

        assert_eq!(container.get("a"), Value::from(10));
        assert_eq!(container.get("missing"), Value::Undefined);

        container.set("a", true).unwrap();
        container.set("added", "new").unwrap();
        assert_eq!(container.get("a"), Value::from(true));
        assert_eq!(container.keys(), vec!["a", "added"]);
    }

    #[test]
    fn prototype_keys_are_read_through() {
        let prototype = Container::new().with("inherited", 1);
        let container = Container::with_prototype(prototype.clone()).with("own", 2);

        assert_eq!(container.get("inherited"), Value::from(1));
        assert!(!container.has_own("inherited"));
        assert_eq!(container.keys(), vec!["own"]);

        prototype.set("inherited", 3).unwrap();
        assert_eq!(container.get("inherited"), Value::from(3));

        // Writing creates an own slot and leaves the prototype alone.
        container.set("inherited", 4).unwrap();
        assert_eq!(prototype.get("inherited"), Value::from(3));
        assert_eq!(container.get("inherited"), Value::from(4));
    }

    #[test]
    fn hidden_slots_are_not_listed() {
        let container = Container::new().with("shown", 1);
        container
            .define_property("hidden", 2, PropertyFlags::new().with_enumerable(false))
            .unwrap();

        assert_eq!(container.keys(), vec!["shown"]);
        assert!(container.has_own("hidden"));
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn read_only_writes_are_ignored() {
        let container = Container::new();
        container
            .define_property("fixed", 1, PropertyFlags::new().with_writable(false))
            .unwrap();

        container.set("fixed", 2).unwrap();
        assert_eq!(container.get("fixed"), Value::from(1));
    }

    #[test]
    fn non_configurable_cannot_be_redefined() {
        let container = Container::new();
        container
            .define_property("locked", 1, PropertyFlags::new().with_configurable(false))
            .unwrap();

        let err = container
            .define_property("locked", 2, PropertyFlags::new())
            .unwrap_err();
        assert!(matches!(err, Error::NonConfigurable(key) if key == "locked"));
    }

    #[test]
    fn candidates_skip_hidden_locked_and_prototype_key() {
        let container = Container::new().with("a", 1).with(PROTOTYPE_KEY, 2);
        container
            .define_property("hidden", 3, PropertyFlags::new().with_enumerable(false))
            .unwrap();
        container
            .define_property("locked", 4, PropertyFlags::new().with_configurable(false))
            .unwrap();

        let keys: Vec<String> = container
            .reactive_candidates()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn self_reference_debug_terminates() {
        let container = Container::new();
        container.set("self", container.clone()).unwrap();

        let printed = format!("{container:?}");
        assert!(printed.contains("self"));

        container.set("self", Value::Null).unwrap();
    }

    #[test]
    fn from_iterator_keeps_order() {
        let container: Container = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
        assert_eq!(container.keys(), vec!["z", "a", "m"]);
    }
}
