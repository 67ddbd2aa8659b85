//! Shared list values.
//!
//! Arrays are never reactive element by element. Changing an element does
//! not notify anyone; only storing a (possibly identical) array reference in
//! a reactive slot does.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::value::Value;
use crate::error::{Error, Result};

/// Largest length an array may be grown to by `Array::set`.
pub const MAX_ARRAY_LENGTH: usize = u32::MAX as usize;

fn next_array_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

struct ArrayInner {
    id: u64,
    items: RefCell<Vec<Value>>,
}

/// A reference-identity list handle. Clones share the same storage.
#[derive(Clone)]
pub struct Array {
    inner: Rc<ArrayInner>,
}

impl Array {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Element at `index`, or `Undefined` past the end.
    pub fn get(&self, index: usize) -> Value {
        self.inner
            .items
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    /// Store an element, padding with `Undefined` when writing past the end.
    ///
    /// Fails without touching the array if the write would grow it beyond
    /// [`MAX_ARRAY_LENGTH`].
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let required = index
            .checked_add(1)
            .filter(|length| *length <= MAX_ARRAY_LENGTH)
            .ok_or_else(|| Error::invalid("Invalid array length"))?;

        let mut items = self.inner.items.borrow_mut();
        if required > items.len() {
            items.resize(required, Value::Undefined);
        }
        items[index] = value.into();
        Ok(())
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.inner.items.borrow_mut().push(value.into());
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Copy of the current elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(ArrayInner {
                id: next_array_id(),
                items: RefCell::new(items),
            }),
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// Arrays may contain themselves, so never print elements.
impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("id", &self.id())
            .field("len", &self.len())
            .finish()
    }
}
