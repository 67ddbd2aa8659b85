//! Reactive Runtime
//!
//! The runtime is the execution context that ties reactive slots to tasks.
//! It owns the scheduler and its configuration, and answers the one question
//! every reactive read asks: which task is running right now?
//!
//! # How It Works
//!
//! 1. `computed` queues a task and, at top level, runs it at once. Every
//!    reactive slot the task reads records it as a dependant.
//!
//! 2. Writing a reactive slot notifies each recorded dependant through the
//!    runtime that observed the slot's container.
//!
//! 3. The scheduler drains the queue, re-running each task with a fresh
//!    dependency set.
//!
//! # Threading
//!
//! A runtime is a single-threaded, reference-counted handle. Nothing is
//! stored in thread-locals or globals, so independent runtimes never see
//! each other's tasks.

use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::scheduler::Scheduler;
use super::task::Task;
use crate::config::RuntimeConfig;
use crate::container::{Value, ValueKind};
use crate::error::{Error, Result, MESSAGE_NOT_FUNCTION};

struct RuntimeInner {
    config: RuntimeConfig,
    scheduler: Scheduler,
}

/// Handle to a reactive runtime.
///
/// Clones share the same scheduler.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let scheduler = Scheduler::new(&config);
        Self {
            inner: Rc::new(RuntimeInner { config, scheduler }),
        }
    }

    /// The configuration this runtime was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The task whose body is currently executing, if any.
    pub fn current_task(&self) -> Option<Task> {
        self.inner.scheduler.current_task()
    }

    /// Check if a drain is in progress.
    pub fn is_draining(&self) -> bool {
        self.inner.scheduler.is_locked()
    }

    /// Check if two handles refer to the same runtime.
    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Run a task now and re-run it whenever a reactive slot it reads is
    /// written.
    ///
    /// Registering a task that is already registered just forces it to run
    /// again. A permanently disposed task is ignored.
    pub fn computed(&self, task: &Task) -> Result<Task> {
        if self.is_draining() {
            warn!(
                task = task.name(),
                "Creating computed functions from within another computed function is not recommended"
            );
        }

        self.notify(task)?;
        Ok(task.clone())
    }

    /// Register the task of a callable container.
    pub fn computed_value(&self, value: &Value) -> Result<Task> {
        let task = match value.kind() {
            ValueKind::CallableAggregate => value.as_task(),
            _ => None,
        }
        .ok_or_else(|| Error::invalid(MESSAGE_NOT_FUNCTION))?;

        self.computed(&task)
    }

    /// Queue a task for execution, draining the queue unless a drain is
    /// already in progress.
    pub fn notify(&self, task: &Task) -> Result<()> {
        self.inner.scheduler.notify(task)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("draining", &self.is_draining())
            .field("pending", &self.inner.scheduler.pending())
            .finish()
    }
}
