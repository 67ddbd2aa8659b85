//! Task Scheduler
//!
//! The scheduler owns the queue of tasks waiting to run, the cursor into
//! that queue, and the lock that decides which call owns the drain loop.
//!
//! # Algorithm
//!
//! 1. `notify` appends a task unless it is disposed or already pending at or
//!    after the cursor.
//! 2. If nobody is draining, the caller takes the lock and walks the queue by
//!    index. Tasks may call `notify` while running; those calls only append,
//!    and the active loop reaches them before it returns.
//! 3. Each run re-derives the task's dependency set. Slots read again keep
//!    the task at its old position; slots it no longer reads drop it once the
//!    run ends.
//! 4. A guard resets queue, cursor and lock when the outermost drain ends,
//!    whether it finished, returned an error, or unwound.

use std::cell::RefCell;

use tracing::{debug, error, trace};

use super::task::Task;
use crate::config::RuntimeConfig;
use crate::error::{Error, Result};

#[derive(Default)]
struct QueueState {
    queue: Vec<Task>,
    cursor: usize,
    locked: bool,
}

/// Queue, cursor and reentrancy lock for one runtime.
pub(crate) struct Scheduler {
    state: RefCell<QueueState>,
    max_queue: usize,
    overflow_window: usize,
}

/// Releases the drain when dropped.
///
/// This keeps the scheduler usable after a task fails or panics.
struct DrainGuard<'a> {
    state: &'a RefCell<QueueState>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        let queue = {
            let mut state = self.state.borrow_mut();
            state.cursor = 0;
            state.locked = false;
            std::mem::take(&mut state.queue)
        };
        // Dropping tasks can drop whatever they captured; do it unborrowed.
        drop(queue);
    }
}

impl Scheduler {
    pub(crate) fn new(config: &RuntimeConfig) -> Self {
        Self {
            state: RefCell::new(QueueState::default()),
            max_queue: config.max_queue,
            overflow_window: config.overflow_window,
        }
    }

    /// Check if a drain is in progress.
    pub(crate) fn is_locked(&self) -> bool {
        self.state.borrow().locked
    }

    /// The task at the cursor of the active drain, if any.
    pub(crate) fn current_task(&self) -> Option<Task> {
        let state = self.state.borrow();
        if !state.locked {
            return None;
        }
        state.queue.get(state.cursor).cloned()
    }

    /// Number of tasks waiting behind the cursor.
    pub(crate) fn pending(&self) -> usize {
        let state = self.state.borrow();
        if !state.locked {
            return 0;
        }
        state.queue.len().saturating_sub(state.cursor + 1)
    }

    /// Queue a task and, unless a drain is already running, drain the queue.
    pub(crate) fn notify(&self, task: &Task) -> Result<()> {
        if task.is_disposed() {
            return Ok(());
        }

        {
            let mut state = self.state.borrow_mut();
            let cursor = state.cursor;
            if state.queue.iter().skip(cursor).any(|queued| queued.ptr_eq(task)) {
                return Ok(());
            }
            state.queue.push(task.clone());

            if state.locked {
                trace!(task = task.name(), "queued during drain");
                return Ok(());
            }
            state.locked = true;
        }

        let _guard = DrainGuard { state: &self.state };
        self.drain()
    }

    /// Remove a task that is queued behind the cursor, keeping the order of
    /// the rest of the queue.
    pub(crate) fn unschedule(&self, task: &Task) {
        let mut state = self.state.borrow_mut();
        if !state.locked {
            return;
        }

        let start = state.cursor + 1;
        let position = state
            .queue
            .iter()
            .skip(start)
            .position(|queued| queued.ptr_eq(task));

        if let Some(offset) = position {
            state.queue.remove(start + offset);
        }
    }

    fn drain(&self) -> Result<()> {
        let mut executed = 0usize;
        debug!("drain started");

        loop {
            let task = {
                let state = self.state.borrow();
                match state.queue.get(state.cursor) {
                    Some(task) => task.clone(),
                    None => break,
                }
            };

            if executed >= self.max_queue {
                return Err(self.overflow());
            }

            if !task.is_disposed() {
                executed += 1;
                task.invoke()?;
            }

            self.state.borrow_mut().cursor += 1;
        }

        debug!(executed, "drain finished");
        Ok(())
    }

    fn overflow(&self) -> Error {
        let state = self.state.borrow();
        let start = state.queue.len().saturating_sub(self.overflow_window);
        let recent = state.queue[start..]
            .iter()
            .enumerate()
            .map(|(offset, task)| format!("{}: {}", start + offset + 1, task.name()))
            .collect();

        error!(limit = self.max_queue, "computed queue overflow");
        Error::Overflow {
            limit: self.max_queue,
            recent,
        }
    }
}
