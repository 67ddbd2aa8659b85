//! Container slots.
//!
//! A slot is either plain data with property flags, or a reactive accessor
//! installed by `observe`. A reactive slot keeps the shadow value, the
//! dependency store of tasks that read it, and the runtime whose scheduler
//! attributes reads and runs notified tasks.

use std::cell::RefCell;
use std::rc::Rc;

use super::value::{Value, ValueKind};
use crate::error::Result;
use crate::reactive::{DependencyStore, Runtime};

/// Flags of a plain data slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyFlags {
    /// Listed by `Container::keys` and eligible for `observe`.
    pub enumerable: bool,
    /// May be redefined, and eligible for `observe`.
    pub configurable: bool,
    /// Writes through `Container::set` take effect.
    pub writable: bool,
}

impl PropertyFlags {
    /// Enumerable, configurable and writable.
    pub const fn new() -> Self {
        Self {
            enumerable: true,
            configurable: true,
            writable: true,
        }
    }

    pub const fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    pub const fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    pub const fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }
}

impl Default for PropertyFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) enum Slot {
    Data { value: Value, flags: PropertyFlags },
    Reactive(Rc<ReactiveSlot>),
}

impl Slot {
    pub(crate) fn data(value: Value) -> Self {
        Slot::Data {
            value,
            flags: PropertyFlags::new(),
        }
    }

    pub(crate) fn is_enumerable(&self) -> bool {
        match self {
            Slot::Data { flags, .. } => flags.enumerable,
            Slot::Reactive(_) => true,
        }
    }

    pub(crate) fn is_configurable(&self) -> bool {
        match self {
            Slot::Data { flags, .. } => flags.configurable,
            Slot::Reactive(_) => true,
        }
    }
}

/// Accessor pair backing one reactive key.
pub(crate) struct ReactiveSlot {
    runtime: Runtime,
    value: RefCell<Value>,
    dependants: Rc<DependencyStore>,
}

impl ReactiveSlot {
    pub(crate) fn new(runtime: Runtime, value: Value) -> Self {
        Self {
            runtime,
            value: RefCell::new(value),
            dependants: Rc::new(DependencyStore::new()),
        }
    }

    /// Read the value, recording the running task as a dependant.
    pub(crate) fn get(&self) -> Value {
        if let Some(task) = self.runtime.current_task() {
            DependencyStore::track(&self.dependants, &task);
        }
        self.peek()
    }

    /// Read the value without recording anything.
    pub(crate) fn peek(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Store a value and notify every dependant in first-read order.
    ///
    /// Plain containers are made reactive before they are stored. A dependant
    /// disposed by an earlier one during the fan-out is skipped. The write
    /// stays in place even if a notified task fails.
    pub(crate) fn set(&self, value: Value) -> Result<()> {
        if let (ValueKind::Aggregate, Some(container)) = (value.kind(), value.as_container()) {
            self.runtime.install(container);
        }

        let previous = self.value.replace(value);
        drop(previous);

        for task in self.dependants.snapshot() {
            if self.dependants.contains(&task) {
                self.runtime.notify(&task)?;
            }
        }
        Ok(())
    }

    pub(crate) fn dependants(&self) -> &DependencyStore {
        &self.dependants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Task;
    use std::cell::Cell;

    #[test]
    fn default_flags_are_open() {
        let flags = PropertyFlags::default();
        assert!(flags.enumerable && flags.configurable && flags.writable);

        let hidden = flags.with_enumerable(false);
        assert!(!hidden.enumerable);
        assert!(hidden.configurable);
    }

    #[test]
    fn reads_outside_tasks_track_nothing() {
        let slot = ReactiveSlot::new(Runtime::new(), Value::from(1));
        assert_eq!(slot.get(), Value::from(1));
        assert_eq!(slot.dependants().len(), 0);
    }

    #[test]
    fn set_notifies_readers() {
        let runtime = Runtime::new();
        let slot = Rc::new(ReactiveSlot::new(runtime.clone(), Value::from(1)));
        let seen = Rc::new(Cell::new(0.0));

        let task = {
            let slot = slot.clone();
            let seen = seen.clone();
            Task::new(move || {
                seen.set(slot.get().as_f64().unwrap_or_default());
                Ok(())
            })
        };
        runtime.computed(&task).unwrap();
        assert_eq!(slot.dependants().len(), 1);

        slot.set(Value::from(7)).unwrap();
        assert_eq!(seen.get(), 7.0);
        assert_eq!(task.run_count(), 2);

        runtime.dispose(Some(&task), Default::default()).unwrap();
    }
}
