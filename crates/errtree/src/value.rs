//! Metadata values, key/value pairs and construction arguments.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::{Error, Sentinel};

/// A metadata value of unrestricted type.
#[derive(Clone)]
pub enum Value {
    /// A string
    Str(String),
    /// A signed integer of any width
    Int(i64),
    /// An unsigned integer of any width
    Uint(u64),
    /// A float of any width
    Float(f64),
    /// A boolean
    Bool(bool),
    /// An error stored as plain metadata, not as a child.
    Error(Error),
    /// Anything else, kept behind an `Arc` together with its type name.
    Any(AnyValue),
}

/// Type-erased value carried by [`Value::Any`].
#[derive(Clone)]
pub struct AnyValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl AnyValue {
    /// Wrap a value of any type
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Get the type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get the wrapped value as a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl Value {
    /// Wrap a value of any type.
    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        Value::Any(AnyValue::new(value))
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an `i64`, if it fits
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Uint(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Get the value as a `u64`, if it fits
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Uint(v) => Some(v),
            Value::Int(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Get the value as an `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as a `bool`
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Get the error stored as a metadata value
    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Downcast a [`Value::Any`] payload.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Any(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Canonical type name of the stored value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "String",
            Value::Int(_) => "i64",
            Value::Uint(_) => "u64",
            Value::Float(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Error(_) => type_name::<Error>(),
            Value::Any(any) => any.type_name(),
        }
    }

    pub(crate) fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a.ptr_eq(b),
            (Value::Any(a), Value::Any(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(&a.inner), Arc::as_ptr(&b.inner))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Error(err) => write!(f, "{err}"),
            Value::Any(any) => write!(f, "<{}>", any.type_name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Error(err) => write!(f, "Error({err})"),
            other => write!(f, "{other}"),
        }
    }
}

macro_rules! impl_value_from {
    ($variant:ident as $target:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )+
    };
}

impl_value_from!(Int as i64: i8, i16, i32, i64, isize);
impl_value_from!(Uint as u64: u8, u16, u32, u64, usize);
impl_value_from!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Error> for Value {
    fn from(err: Error) -> Self {
        Value::Error(err)
    }
}

impl From<&Error> for Value {
    fn from(err: &Error) -> Self {
        Value::Error(err.clone())
    }
}

impl From<&'static Sentinel> for Value {
    fn from(sentinel: &'static Sentinel) -> Self {
        Value::Error(Error::from(sentinel))
    }
}

/// An immutable key/value pair attached to an entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Kv {
    key: String,
    value: Value,
}

impl Kv {
    /// Create a key/value pair
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Kv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// One element of a construction or enrichment argument list.
///
/// Remembers the Rust type it was built from so that type violations can
/// name it.
#[derive(Clone, Debug)]
pub struct Arg {
    value: Value,
    type_name: &'static str,
}

impl Arg {
    /// An argument of unrestricted type.
    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Value::any(value),
            type_name: type_name::<T>(),
        }
    }

    /// Get the argument value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the name of the Rust type the argument was built from
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn into_value(self) -> Value {
        self.value
    }
}

impl<T: Into<Value>> From<T> for Arg {
    fn from(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: value.into(),
        }
    }
}
