//! Core types for session items.

use crate::error::{Result, SessionError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A session variable value.
///
/// Session values are dynamically typed: a single collection can hold text,
/// numbers and nested structures side by side. `TextBuffer` is the growable
/// counterpart of `Text` and is meant to be edited in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionValue {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Text(String),
    TextBuffer(String),
    Bytes(Vec<u8>),
    List(Vec<SessionValue>),
    Map(BTreeMap<String, SessionValue>),
}

/// Tag identifying the variant of a [`SessionValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Text,
    TextBuffer,
    Bytes,
    List,
    Map,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 18] = [
        ValueKind::Null,
        ValueKind::Bool,
        ValueKind::I8,
        ValueKind::I16,
        ValueKind::I32,
        ValueKind::I64,
        ValueKind::U8,
        ValueKind::U16,
        ValueKind::U32,
        ValueKind::U64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::Char,
        ValueKind::Text,
        ValueKind::TextBuffer,
        ValueKind::Bytes,
        ValueKind::List,
        ValueKind::Map,
    ];

    /// Fixed-width numeric kinds.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::I8
                | ValueKind::I16
                | ValueKind::I32
                | ValueKind::I64
                | ValueKind::U8
                | ValueKind::U16
                | ValueKind::U32
                | ValueKind::U64
                | ValueKind::F32
                | ValueKind::F64
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Char => "char",
            ValueKind::Text => "text",
            ValueKind::TextBuffer => "text_buffer",
            ValueKind::Bytes => "bytes",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

impl SessionValue {
    /// The variant tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            SessionValue::Null => ValueKind::Null,
            SessionValue::Bool(_) => ValueKind::Bool,
            SessionValue::I8(_) => ValueKind::I8,
            SessionValue::I16(_) => ValueKind::I16,
            SessionValue::I32(_) => ValueKind::I32,
            SessionValue::I64(_) => ValueKind::I64,
            SessionValue::U8(_) => ValueKind::U8,
            SessionValue::U16(_) => ValueKind::U16,
            SessionValue::U32(_) => ValueKind::U32,
            SessionValue::U64(_) => ValueKind::U64,
            SessionValue::F32(_) => ValueKind::F32,
            SessionValue::F64(_) => ValueKind::F64,
            SessionValue::Char(_) => ValueKind::Char,
            SessionValue::Text(_) => ValueKind::Text,
            SessionValue::TextBuffer(_) => ValueKind::TextBuffer,
            SessionValue::Bytes(_) => ValueKind::Bytes,
            SessionValue::List(_) => ValueKind::List,
            SessionValue::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SessionValue::Null)
    }

    /// Borrow the text of a `Text` or `TextBuffer` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SessionValue::Text(s) | SessionValue::TextBuffer(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SessionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer variant that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            SessionValue::I8(v) => Some(v.into()),
            SessionValue::I16(v) => Some(v.into()),
            SessionValue::I32(v) => Some(v.into()),
            SessionValue::I64(v) => Some(v),
            SessionValue::U8(v) => Some(v.into()),
            SessionValue::U16(v) => Some(v.into()),
            SessionValue::U32(v) => Some(v.into()),
            SessionValue::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any numeric variant, widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            SessionValue::F32(v) => Some(v.into()),
            SessionValue::F64(v) => Some(v),
            SessionValue::U64(v) => Some(v as f64),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Mutable access to the contents of a `TextBuffer`.
    pub fn as_text_buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            SessionValue::TextBuffer(s) => Some(s),
            _ => None,
        }
    }

    /// Build a structured value from any serde-serializable type.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)?;
        Ok(Self::from(json))
    }

    /// Convert this value back into a serde-deserializable type.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json())
            .map_err(|e| SessionError::Deserialization(e.to_string()))
    }

    fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            SessionValue::Null => Value::Null,
            SessionValue::Bool(b) => Value::Bool(*b),
            SessionValue::I8(v) => Value::from(*v),
            SessionValue::I16(v) => Value::from(*v),
            SessionValue::I32(v) => Value::from(*v),
            SessionValue::I64(v) => Value::from(*v),
            SessionValue::U8(v) => Value::from(*v),
            SessionValue::U16(v) => Value::from(*v),
            SessionValue::U32(v) => Value::from(*v),
            SessionValue::U64(v) => Value::from(*v),
            // Non-finite floats have no JSON number form.
            SessionValue::F32(v) => serde_json::Number::from_f64(f64::from(*v))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SessionValue::F64(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SessionValue::Char(c) => Value::String(c.to_string()),
            SessionValue::Text(s) | SessionValue::TextBuffer(s) => Value::String(s.clone()),
            SessionValue::Bytes(bytes) => {
                Value::Array(bytes.iter().map(|b| Value::from(*b)).collect())
            }
            SessionValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            SessionValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for SessionValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => SessionValue::Null,
            Value::Bool(b) => SessionValue::Bool(b),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    SessionValue::I64(v)
                } else if let Some(v) = n.as_u64() {
                    SessionValue::U64(v)
                } else {
                    SessionValue::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => SessionValue::Text(s),
            Value::Array(items) => SessionValue::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                SessionValue::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SessionValue {
                fn from(v: $ty) -> Self {
                    SessionValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => Text,
    Vec<u8> => Bytes,
}

impl From<&str> for SessionValue {
    fn from(v: &str) -> Self {
        SessionValue::Text(v.to_string())
    }
}

impl From<Vec<SessionValue>> for SessionValue {
    fn from(v: Vec<SessionValue>) -> Self {
        SessionValue::List(v)
    }
}

impl From<BTreeMap<String, SessionValue>> for SessionValue {
    fn from(v: BTreeMap<String, SessionValue>) -> Self {
        SessionValue::Map(v)
    }
}

impl<T: Into<SessionValue>> From<Option<T>> for SessionValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SessionValue::Null, Into::into)
    }
}

/// Body encoding of an encoded value frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    #[default]
    MessagePack,
    Json,
}

impl PayloadEncoding {
    /// Tag byte written into the frame header.
    pub(crate) fn tag(self) -> u8 {
        match self {
            PayloadEncoding::MessagePack => 1,
            PayloadEncoding::Json => 2,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(PayloadEncoding::MessagePack),
            2 => Some(PayloadEncoding::Json),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(SessionValue::from("x").kind(), ValueKind::Text);
        assert_eq!(SessionValue::from(10).kind(), ValueKind::I32);
        assert_eq!(SessionValue::from(10u64).kind(), ValueKind::U64);
        assert_eq!(SessionValue::from(None::<i32>).kind(), ValueKind::Null);
        assert_eq!(
            SessionValue::TextBuffer("buf".into()).kind(),
            ValueKind::TextBuffer
        );
    }

    #[test]
    fn test_all_kinds_listed_once() {
        let mut kinds = ValueKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), ValueKind::ALL.len());
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(SessionValue::from(7u8).as_i64(), Some(7));
        assert_eq!(SessionValue::from(u64::MAX).as_i64(), None);
        assert_eq!(SessionValue::from(1.5f32).as_f64(), Some(1.5));
        assert_eq!(SessionValue::from("7").as_i64(), None);
        assert_eq!(SessionValue::from(true).as_bool(), Some(true));
        assert_eq!(SessionValue::from(1).as_bool(), None);
    }

    #[test]
    fn test_serializable_roundtrip() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Cart {
            owner: String,
            items: Vec<u32>,
            coupon: Option<String>,
        }

        let cart = Cart {
            owner: "ann".into(),
            items: vec![3, 5],
            coupon: None,
        };

        let value = SessionValue::from_serializable(&cart).unwrap();
        assert_eq!(value.kind(), ValueKind::Map);

        let back: Cart = value.deserialize_into().unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_into_wrong_shape() {
        let value = SessionValue::from("not a number");
        let result: Result<u32> = value.deserialize_into();
        assert!(matches!(result, Err(SessionError::Deserialization(_))));
    }

    #[test]
    fn test_encoding_tags() {
        for encoding in [PayloadEncoding::MessagePack, PayloadEncoding::Json] {
            assert_eq!(PayloadEncoding::from_tag(encoding.tag()), Some(encoding));
        }
        assert_eq!(PayloadEncoding::from_tag(0), None);
    }
}
