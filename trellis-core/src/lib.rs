//! Trellis Core
//!
//! This crate provides a fine-grained reactive dependency-tracking engine for
//! key/value containers. It implements:
//!
//! - Reactive slots installed on containers in place (`observe`)
//! - Tasks that re-run whenever a slot they read is written (`computed`)
//! - A single-threaded, reentrant scheduler with de-duplication and cycle
//!   detection
//! - Permanent and clean disposal of tasks (`dispose`)
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `reactive`: tasks, dependency stores, the scheduler, and the runtime
//! - `container`: values, containers, arrays, and slot installation
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{Container, Runtime, Task, Value};
//!
//! # fn main() -> trellis_core::Result<()> {
//! let runtime = Runtime::new();
//! let x = runtime.observe_container(&Container::new().with("a", 1).with("b", 0))?;
//!
//! let source = x.clone();
//! runtime.computed(&Task::new(move || {
//!     let a = source.get("a").as_f64().unwrap_or_default();
//!     source.set("b", a * 2.0)
//! }))?;
//! assert_eq!(x.get("b"), Value::from(2));
//!
//! x.set("a", 5)?;
//! assert_eq!(x.get("b"), Value::from(10));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod reactive;

pub use config::RuntimeConfig;
pub use container::{Array, Container, PropertyFlags, Value, ValueKind};
pub use error::{Error, Result};
pub use reactive::{DisposeMode, Runtime, Task, TaskId};
