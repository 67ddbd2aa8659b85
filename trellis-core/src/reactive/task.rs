//! Task handles for the reactive system.
//!
//! A Task is a zero-argument computation that gets re-run whenever one of
//! the reactive slots it read changes. Tasks are compared by identity: two
//! handles are the same task only if they were cloned from one another.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use super::dependency::DependencyStore;
use crate::error::Result;

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Generate a new unique task ID.
    ///
    /// Uses an atomic counter so IDs stay unique across runtimes and threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// Back-reference from a task to a dependency store it is registered in.
///
/// The task does not own the store; if the store is gone there is nothing
/// left to detach from. `run` is the last run of the task that read the
/// store.
pub(crate) struct DependencyRemover {
    store: Weak<DependencyStore>,
    run: Cell<usize>,
}

impl DependencyRemover {
    pub(crate) fn new(store: &Rc<DependencyStore>, run: usize) -> Self {
        Self {
            store: Rc::downgrade(store),
            run: Cell::new(run),
        }
    }

    fn points_to(&self, store: &Rc<DependencyStore>) -> bool {
        std::ptr::eq(self.store.as_ptr(), Rc::as_ptr(store))
    }

    fn remove(&self, task: TaskId) {
        if let Some(store) = self.store.upgrade() {
            store.remove(task);
        }
    }
}

type TaskBody = Box<dyn Fn() -> Result<()>>;

struct TaskInner {
    id: TaskId,
    name: Option<String>,
    body: TaskBody,
    disposed: Cell<bool>,
    removers: RefCell<SmallVec<[DependencyRemover; 4]>>,
    run_count: Cell<usize>,
}

/// A registered unit of re-computation.
///
/// # Example
///
/// ```rust,ignore
/// let task = Task::named("double", move || {
///     let a = x.get("a").as_f64().unwrap_or(0.0);
///     x.set("b", a * 2.0)
/// });
/// runtime.computed(&task)?;
/// ```
#[derive(Clone)]
pub struct Task {
    inner: Rc<TaskInner>,
}

impl Task {
    /// Create an anonymous task.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self::build(None, Box::new(body))
    }

    /// Create a task with a name shown in overflow diagnostics.
    pub fn named<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self::build(Some(name.into()), Box::new(body))
    }

    fn build(name: Option<String>, body: TaskBody) -> Self {
        Self {
            inner: Rc::new(TaskInner {
                id: TaskId::new(),
                name,
                body,
                disposed: Cell::new(false),
                removers: RefCell::new(SmallVec::new()),
                run_count: Cell::new(0),
            }),
        }
    }

    /// Get the task's unique ID.
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// Name used for diagnostics.
    pub fn name(&self) -> &str {
        self.inner.name.as_deref().unwrap_or("anonymous")
    }

    /// Check if the task has been permanently disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of times the scheduler has executed this task.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Number of reactive slots this task is currently registered with.
    pub fn dependency_count(&self) -> usize {
        self.inner.removers.borrow().len()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn mark_disposed(&self) {
        self.inner.disposed.set(true);
    }

    /// Record a newly tracked store, stamped with the current run.
    pub(crate) fn add_dependency(&self, store: &Rc<DependencyStore>) {
        let remover = DependencyRemover::new(store, self.run_count());
        self.inner.removers.borrow_mut().push(remover);
    }

    /// Mark an already tracked store as read by the current run.
    pub(crate) fn refresh_dependency(&self, store: &Rc<DependencyStore>) {
        let run = self.run_count();
        if let Some(remover) = self
            .inner
            .removers
            .borrow()
            .iter()
            .find(|remover| remover.points_to(store))
        {
            remover.run.set(run);
        }
    }

    /// Remove this task from every dependency store it is registered with.
    pub(crate) fn detach(&self) {
        // Take the list first: removers call back into stores, never into us.
        let removers = std::mem::take(&mut *self.inner.removers.borrow_mut());
        for remover in &removers {
            remover.remove(self.id());
        }
    }

    /// Run the body once. Only the scheduler calls this.
    ///
    /// Stores read again keep the task at its old position. Stores the run
    /// did not read are detached afterwards, even when the body fails.
    pub(crate) fn invoke(&self) -> Result<()> {
        let run = self.run_count() + 1;
        self.inner.run_count.set(run);

        let result = (self.inner.body)();
        self.prune(run);
        result
    }

    fn prune(&self, run: usize) {
        let stale: SmallVec<[DependencyRemover; 4]> = {
            let mut removers = self.inner.removers.borrow_mut();
            let (current, stale) = std::mem::take(&mut *removers)
                .into_iter()
                .partition(|remover| remover.run.get() == run);
            *removers = current;
            stale
        };

        for remover in &stale {
            remover.remove(self.id());
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_are_unique() {
        let id1 = TaskId::new();
        let id2 = TaskId::new();
        let id3 = TaskId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn tasks_compare_by_identity() {
        let a = Task::new(|| Ok(()));
        let b = Task::new(|| Ok(()));
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(a.id(), a2.id());
    }

    #[test]
    fn invoke_counts_runs() {
        let task = Task::named("counter", || Ok(()));
        assert_eq!(task.name(), "counter");
        assert_eq!(task.run_count(), 0);

        task.invoke().unwrap();
        task.invoke().unwrap();
        assert_eq!(task.run_count(), 2);
    }

    #[test]
    fn anonymous_name() {
        assert_eq!(Task::new(|| Ok(())).name(), "anonymous");
    }

    #[test]
    fn detach_removes_from_all_stores() {
        let task = Task::new(|| Ok(()));
        let first = Rc::new(DependencyStore::new());
        let second = Rc::new(DependencyStore::new());

        DependencyStore::track(&first, &task);
        DependencyStore::track(&second, &task);
        assert_eq!(task.dependency_count(), 2);

        task.detach();
        assert_eq!(task.dependency_count(), 0);
        assert_eq!(first.len(), 0);
        assert_eq!(second.len(), 0);
    }

    #[test]
    fn rerun_keeps_positions_and_drops_unread_stores() {
        let kept = Rc::new(DependencyStore::new());
        let dropped = Rc::new(DependencyStore::new());
        let later = Task::new(|| Ok(()));
        let this: Rc<RefCell<Option<Task>>> = Rc::new(RefCell::new(None));

        let task = {
            let (kept, dropped, this) = (kept.clone(), dropped.clone(), this.clone());
            Task::new(move || {
                let task = this.borrow().clone();
                if let Some(task) = task {
                    DependencyStore::track(&kept, &task);
                    if task.run_count() == 1 {
                        DependencyStore::track(&dropped, &task);
                    }
                }
                Ok(())
            })
        };
        *this.borrow_mut() = Some(task.clone());

        task.invoke().unwrap();
        DependencyStore::track(&kept, &later);
        assert_eq!(task.dependency_count(), 2);

        task.invoke().unwrap();
        assert_eq!(task.dependency_count(), 1);
        assert_eq!(dropped.len(), 0);

        let order: Vec<TaskId> = kept.snapshot().iter().map(Task::id).collect();
        assert_eq!(order, vec![task.id(), later.id()]);

        this.borrow_mut().take();
    }
}
