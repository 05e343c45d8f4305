//! Response envelopes and result shaping.

use crate::resolver::RootField;
use serde::Serialize;
use serde_json::{Map, Value};

/// A response envelope carried by a `next` frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

impl Response {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    pub fn errors(errors: Vec<Value>) -> Self {
        Self {
            data: None,
            errors: Some(errors),
        }
    }

    /// Returns true when there is nothing to publish.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.errors.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Turns one value produced for a root field into a response envelope.
///
/// Returning an empty response drops the value without sending a frame.
pub trait ResultShaper: Send + Sync {
    fn shape(&self, field: &RootField, value: Value) -> Response;
}

impl<F> ResultShaper for F
where
    F: Fn(&RootField, Value) -> Response + Send + Sync,
{
    fn shape(&self, field: &RootField, value: Value) -> Response {
        self(field, value)
    }
}

/// Places each value under the root field's response key.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedShaper;

impl ResultShaper for KeyedShaper {
    fn shape(&self, field: &RootField, value: Value) -> Response {
        let mut data = Map::new();
        data.insert(field.response_key.clone(), value);
        Response::data(Value::Object(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field() -> RootField {
        RootField::new("newDog").with_response_key("dog")
    }

    #[test]
    fn test_keyed_shaper() {
        let response = KeyedShaper.shape(&field(), json!({ "name": "Rex" }));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": { "dog": { "name": "Rex" } } })
        );
    }

    #[test]
    fn test_closure_shaper_can_skip() {
        let shaper = |_: &RootField, value: Value| {
            if value.is_null() {
                Response::default()
            } else {
                Response::data(value)
            }
        };
        assert!(shaper.shape(&field(), Value::Null).is_empty());
        assert!(!shaper.shape(&field(), json!(1)).is_empty());
    }

    #[test]
    fn test_empty_error_list_is_empty() {
        assert!(Response::errors(Vec::new()).is_empty());
        assert!(!Response::errors(vec![json!({ "message": "boom" })]).is_empty());
    }
}
