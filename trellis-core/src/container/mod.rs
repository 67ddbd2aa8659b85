//! Containers and Reactive Slots
//!
//! This module holds the data side of the system: dynamic values, key/value
//! containers, shared arrays, and the installer that turns container slots
//! into reactive accessors.
//!
//! # Reactive Slots
//!
//! Observing a container replaces each own enumerable, configurable data
//! slot with an accessor pair:
//!
//! - `get` records the running task (if any) in the slot's dependency store
//!   and returns the shadow value.
//! - `set` makes plain container values reactive, stores the value, and
//!   notifies every dependant through the scheduler.
//!
//! Arrays are shared handles and are never tracked element by element. Only
//! storing an array reference into a reactive slot notifies.

mod array;
mod json;
mod object;
mod observe;
mod slot;
mod value;

pub use array::{Array, MAX_ARRAY_LENGTH};
pub use object::{Container, ContainerId};
pub use slot::PropertyFlags;
pub use value::{Value, ValueKind};
