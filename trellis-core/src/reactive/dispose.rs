//! Task disposal.
//!
//! Disposing a task detaches it from every reactive slot it depends on and
//! drops it from the pending part of the queue. A permanent disposal also
//! marks the task so it can never run again; a clean disposal leaves it
//! unregistered but reusable.

use tracing::debug;

use super::runtime::Runtime;
use super::task::Task;
use crate::container::{Value, ValueKind};
use crate::error::{Error, Result, MESSAGE_DISPOSE_NOT_FUNCTION};

/// How a disposal treats the task afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposeMode {
    /// The task is marked disposed and never runs again.
    #[default]
    Permanent,

    /// The task is detached everywhere but may be registered again with
    /// `computed`.
    Clean,
}

impl Runtime {
    /// Dispose of `task`, or of the currently running task when `None`.
    ///
    /// Returns the task when one was supplied and nothing when disposing the
    /// running task. Disposing an already disposed task does nothing.
    pub fn dispose(&self, task: Option<&Task>, mode: DisposeMode) -> Result<Option<Task>> {
        let (target, supplied) = match task {
            Some(task) => (task.clone(), true),
            None => (self.current_task().ok_or(Error::NoActiveTask)?, false),
        };

        if !target.is_disposed() {
            if mode == DisposeMode::Permanent {
                target.mark_disposed();
            }
            target.detach();
            self.scheduler().unschedule(&target);
            debug!(task = target.name(), ?mode, "task disposed");
        }

        Ok(supplied.then_some(target))
    }

    /// Dispose of the task of a callable container, or of the running task
    /// when `None`.
    pub fn dispose_value(&self, value: Option<&Value>, mode: DisposeMode) -> Result<Option<Task>> {
        match value {
            None => self.dispose(None, mode),
            Some(value) => {
                let task = match value.kind() {
                    ValueKind::CallableAggregate => value.as_task(),
                    _ => None,
                }
                .ok_or_else(|| Error::invalid(MESSAGE_DISPOSE_NOT_FUNCTION))?;
                self.dispose(Some(&task), mode)
            }
        }
    }
}
