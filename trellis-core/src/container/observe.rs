//! Reactive slot installation.
//!
//! `observe` turns the own enumerable, configurable data slots of a container
//! into reactive slots bound to the observing runtime, recursing eagerly into
//! nested plain containers. The observed marker is set before recursing, so
//! cyclic container graphs terminate. Keys added afterwards stay plain.

use tracing::trace;

use super::object::Container;
use super::slot::ReactiveSlot;
use super::value::{Value, ValueKind};
use crate::error::{Error, Result, MESSAGE_NOT_OBJECT};
use crate::reactive::Runtime;

impl Runtime {
    /// Make a container reactive in place and return it.
    ///
    /// Observing an already observed (or ignored) container does nothing.
    /// Fails for primitives and arrays, and for callable containers when the
    /// runtime is configured to reject them.
    pub fn observe(&self, value: &Value) -> Result<Value> {
        let container = self.aggregate(value)?;
        self.install(container);
        Ok(value.clone())
    }

    /// Typed form of [`Runtime::observe`].
    pub fn observe_container(&self, container: &Container) -> Result<Container> {
        if container.is_callable() && !self.config().observe_callable {
            return Err(Error::invalid(MESSAGE_NOT_OBJECT));
        }
        self.install(container);
        Ok(container.clone())
    }

    /// Opt a container out of reactivity. The installer will skip it, both
    /// when observed directly and when reached through another container.
    pub fn ignore(&self, value: &Value) -> Result<Value> {
        let container = self.aggregate(value)?;
        container.mark_ignored();
        Ok(value.clone())
    }

    fn aggregate<'a>(&self, value: &'a Value) -> Result<&'a Container> {
        let accepted = match value.kind() {
            ValueKind::Aggregate => true,
            ValueKind::CallableAggregate => self.config().observe_callable,
            ValueKind::Array | ValueKind::Primitive => false,
        };

        match value.as_container() {
            Some(container) if accepted => Ok(container),
            _ => Err(Error::invalid(MESSAGE_NOT_OBJECT)),
        }
    }

    /// Install reactive slots on `container` and every plain container it
    /// reaches.
    pub(crate) fn install(&self, container: &Container) {
        if container.is_observed() || container.is_ignored() {
            return;
        }
        container.mark_observed();
        trace!(container = container.id().raw(), "observing container");

        for (key, value) in container.reactive_candidates() {
            if let (ValueKind::Aggregate, Some(child)) = (value.kind(), value.as_container()) {
                self.install(child);
            }
            container.install_slot(key, ReactiveSlot::new(self.clone(), value));
        }
    }
}
