//! Reactive Engine
//!
//! This module implements dependency tracking and task scheduling: the part
//! of the system that decides what re-runs, when, and in which order.
//!
//! # Concepts
//!
//! ## Tasks
//!
//! A Task is a zero-argument computation registered with `computed`. It runs
//! once immediately, and every reactive slot it reads records it as a
//! dependant. When one of those slots is written, the task runs again.
//!
//! ## Dependency Stores
//!
//! Every reactive slot owns a Dependency Store: the ordered set of tasks that
//! read it. Tasks keep weak back-references to the stores they are in, so a
//! task can be detached from all of them at once.
//!
//! ## Scheduler
//!
//! The scheduler queues notified tasks, de-duplicates pending entries, and
//! drains the queue in FIFO order. Only the outermost call drains; nested
//! notifications are appended and picked up by the active loop. A ceiling
//! on executions per drain turns accidental cycles into an error.
//!
//! ## Disposal
//!
//! Disposal detaches a task from every store and from the pending queue,
//! either permanently or in a clean, reusable way.

mod dependency;
mod dispose;
mod runtime;
mod scheduler;
mod task;

pub(crate) use dependency::DependencyStore;
pub use dispose::DisposeMode;
pub use runtime::Runtime;
pub use task::{Task, TaskId};
