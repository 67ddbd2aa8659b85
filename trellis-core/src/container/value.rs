//! Dynamic values stored in container slots.

use std::rc::Rc;

use super::array::Array;
use super::object::Container;
use crate::reactive::Task;

/// A value held by a container slot or an array element.
///
/// Primitives compare by value; arrays and containers compare by identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Array),
    Object(Container),
}

/// Classification used at the `observe`, `ignore`, `computed` and `dispose`
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Scalars, strings, null and undefined.
    Primitive,
    /// Lists. Never made reactive element by element.
    Array,
    /// A plain key/value container.
    Aggregate,
    /// A container that also carries a task.
    CallableAggregate,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Array(_) => ValueKind::Array,
            Value::Object(container) if container.is_callable() => ValueKind::CallableAggregate,
            Value::Object(_) => ValueKind::Aggregate,
            _ => ValueKind::Primitive,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Value::Object(container) => Some(container),
            _ => None,
        }
    }

    /// The task carried by a callable container.
    pub fn as_task(&self) -> Option<Task> {
        self.as_container().and_then(|container| container.task().cloned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Container> for Value {
    fn from(container: Container) -> Self {
        Value::Object(container)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
