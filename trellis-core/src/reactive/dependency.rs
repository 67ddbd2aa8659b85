//! Dependency Store
//!
//! Each reactive slot owns one store: the ordered set of tasks that read the
//! slot. Insertion order is first-read order and is the order dependants get
//! notified in.
//!
//! A task registers a remover (a weak back-reference to the store) on itself
//! when it is first tracked, so disposal can detach the task from every store
//! without the stores knowing about each other.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::task::{Task, TaskId};

/// Ordered, identity-keyed set of dependant tasks.
#[derive(Default)]
pub(crate) struct DependencyStore {
    dependants: RefCell<IndexMap<TaskId, Task>>,
}

impl DependencyStore {
    /// Create an empty store.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that `task` read the slot owning `store`.
    ///
    /// A task appears at most once per store and keeps its position when it
    /// reads the slot again. Disposed tasks are never recorded.
    pub(crate) fn track(store: &Rc<Self>, task: &Task) {
        if task.is_disposed() {
            return;
        }

        let inserted = {
            let mut dependants = store.dependants.borrow_mut();
            if dependants.contains_key(&task.id()) {
                false
            } else {
                dependants.insert(task.id(), task.clone());
                true
            }
        };

        if inserted {
            task.add_dependency(store);
        } else {
            task.refresh_dependency(store);
        }
    }

    /// Remove a task, keeping the order of the remaining dependants.
    pub(crate) fn remove(&self, task: TaskId) {
        self.dependants.borrow_mut().shift_remove(&task);
    }

    /// Copy of the dependants in notification order.
    ///
    /// Notifying can run tasks that re-register with this store, so callers
    /// iterate over a snapshot rather than the live set.
    pub(crate) fn snapshot(&self) -> SmallVec<[Task; 8]> {
        self.dependants.borrow().values().cloned().collect()
    }

    /// Check if `task` is currently a dependant.
    pub(crate) fn contains(&self, task: &Task) -> bool {
        self.dependants.borrow().contains_key(&task.id())
    }

    /// Number of dependants.
    pub(crate) fn len(&self) -> usize {
        self.dependants.borrow().len()
    }
}

impl std::fmt::Debug for DependencyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyStore")
            .field("dependants", &self.dependants.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}
