//! Conversion between values and `serde_json` documents.

use serde_json::{Map, Number};

use super::array::Array;
use super::object::Container;
use super::value::Value;
use crate::error::{Error, Result};

impl Value {
    /// Build fresh, unobserved containers and arrays from a JSON document.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(*value),
            serde_json::Value::Number(number) => {
                number.as_f64().map_or(Value::Null, Value::Number)
            }
            serde_json::Value::String(text) => Value::from(text.as_str()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect::<Array>())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::from_json(value)))
                    .collect::<Container>(),
            ),
        }
    }

    /// Snapshot a value as JSON without recording dependencies.
    ///
    /// Only enumerable own keys are written and `Undefined` entries are
    /// skipped. Fails on cyclic graphs.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut path = Vec::new();
        to_json(self, &mut path)
    }
}

#[derive(PartialEq)]
enum Visit {
    Array(u64),
    Container(u64),
}

fn to_json(value: &Value, path: &mut Vec<Visit>) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Bool(value) => serde_json::Value::Bool(*value),
        Value::Number(value) => Number::from_f64(*value)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(text) => serde_json::Value::String(text.to_string()),
        Value::Array(array) => {
            enter(path, Visit::Array(array.id()))?;
            let items = array
                .to_vec()
                .iter()
                .map(|item| to_json(item, path))
                .collect::<Result<Vec<_>>>()?;
            path.pop();
            serde_json::Value::Array(items)
        }
        Value::Object(container) => {
            enter(path, Visit::Container(container.id().raw()))?;
            let mut entries = Map::new();
            for key in container.keys() {
                let value = container.get_untracked(&key);
                if !value.is_undefined() {
                    entries.insert(key, to_json(&value, path)?);
                }
            }
            path.pop();
            serde_json::Value::Object(entries)
        }
    })
}

fn enter(path: &mut Vec<Visit>, visit: Visit) -> Result<()> {
    if path.contains(&visit) {
        return Err(Error::invalid("Cannot convert a cyclic value to JSON"));
    }
    path.push(visit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Runtime;
    use serde_json::json;

    #[test]
    fn from_json_builds_plain_containers() {
        let value = Value::from_json(&json!({
            "a": 10,
            "example": { "hello": "Hello", "happy": true },
            "list": [1, 2, 3],
            "nothing": null
        }));

        let container = value.as_container().unwrap();
        assert!(!container.is_observed());
        assert_eq!(container.keys(), vec!["a", "example", "list", "nothing"]);
        assert_eq!(container.get("a"), Value::from(10));
        assert_eq!(container.get("list").as_array().unwrap().len(), 3);
        assert_eq!(
            container.get("example").as_container().unwrap().get("hello"),
            Value::from("Hello")
        );
    }

    #[test]
    fn to_json_reads_reactive_slots_untracked() {
        let runtime = Runtime::new();
        let document = json!({ "a": 1.5, "nested": { "b": [true, "x"] } });
        let value = runtime.observe(&Value::from_json(&document)).unwrap();

        assert_eq!(value.to_json().unwrap(), document);
    }

    #[test]
    fn to_json_skips_undefined_and_hidden() {
        let container = Container::new().with("kept", 1).with("gone", Value::Undefined);
        container
            .define_property(
                "hidden",
                2,
                crate::container::PropertyFlags::new().with_enumerable(false),
            )
            .unwrap();

        assert_eq!(Value::from(container).to_json().unwrap(), json!({ "kept": 1.0 }));
    }

    #[test]
    fn shared_references_are_not_cycles() {
        let shared = Container::new().with("v", 1);
        let root = Container::new().with("left", shared.clone()).with("right", shared);

        assert!(Value::from(root).to_json().is_ok());
    }

    #[test]
    fn cycles_are_rejected() {
        let container = Container::new();
        container.set("self", container.clone()).unwrap();

        let err = Value::from(container.clone()).to_json().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        container.set("self", Value::Null).unwrap();
    }
}
