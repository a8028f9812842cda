//! Immutable domain values decoded from loosely-typed server JSON.
//!
//! # Design
//! The API is loose about scalar types (ids arrive as numbers or numeric
//! strings, flags as booleans or `0`/`1`). Decoders coerce scalars the way
//! the server's own serializer produces them, reject containers where a
//! scalar is expected, and never hand out a partially built value.

mod category;
mod product;
mod timestamp;

pub use category::{Category, Translation, DEFAULT_LOCALE_KEY};
pub use product::Product;

use serde_json::Value;

use crate::error::DecodeError;
use crate::transport::JsonObject;

/// A model that can be built from one JSON object.
pub trait Decode: Sized {
    /// Model name used in error messages.
    const NAME: &'static str;

    fn decode(raw: &JsonObject) -> Result<Self, DecodeError>;

    /// Decode every element in order. The first failure aborts the whole
    /// collection.
    fn decode_all(items: &[Value]) -> Result<Vec<Self>, DecodeError> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_object()
                    .ok_or(DecodeError::NotAnObject { model: Self::NAME })
                    .and_then(Self::decode)
                    .map_err(|source| DecodeError::Element {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }
}

/// Typed access to the fields of one raw object.
pub(crate) struct Fields<'a> {
    model: &'static str,
    raw: &'a JsonObject,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(model: &'static str, raw: &'a JsonObject) -> Self {
        Self { model, raw }
    }

    /// The field's value; absent and `null` are treated alike.
    pub(crate) fn get(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field).filter(|v| !v.is_null())
    }

    pub(crate) fn required(&self, field: &'static str) -> Result<&'a Value, DecodeError> {
        self.get(field).ok_or(DecodeError::MissingField {
            model: self.model,
            field,
        })
    }

    pub(crate) fn invalid(&self, field: &'static str, reason: impl Into<String>) -> DecodeError {
        DecodeError::InvalidField {
            model: self.model,
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn model(&self) -> &'static str {
        self.model
    }

    pub(crate) fn int(&self, field: &'static str) -> Result<i64, DecodeError> {
        let value = self.required(field)?;
        coerce_int(value).ok_or_else(|| self.invalid(field, format!("is not an integer: {value}")))
    }

    pub(crate) fn string(&self, field: &'static str) -> Result<String, DecodeError> {
        let value = self.required(field)?;
        coerce_string(value).ok_or_else(|| self.invalid(field, format!("is not a string: {value}")))
    }

    pub(crate) fn opt_string(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        self.get(field)
            .map(|value| {
                coerce_string(value)
                    .ok_or_else(|| self.invalid(field, format!("is not a string: {value}")))
            })
            .transpose()
    }

    pub(crate) fn bool(&self, field: &'static str) -> Result<bool, DecodeError> {
        let value = self.required(field)?;
        coerce_bool(value).ok_or_else(|| self.invalid(field, format!("is not a boolean: {value}")))
    }

    pub(crate) fn bool_or(&self, field: &'static str, default: bool) -> Result<bool, DecodeError> {
        match self.get(field) {
            None => Ok(default),
            Some(_) => self.bool(field),
        }
    }
}

pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        _ => None,
    }
}

pub(crate) fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => Some(!(s.is_empty() || s == "0")),
        _ => None,
    }
}
