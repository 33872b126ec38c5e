//! Runtime value types for Atom

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Property storage of an object, in insertion order
pub type Properties = IndexMap<String, Value>;

/// Shared handle to an object's properties
pub type ObjectRef = Rc<RefCell<Properties>>;

/// Runtime values in Atom
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Objects are shared: every copy of the value sees the same properties
    Object(ObjectRef),
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }

    pub fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    pub fn number(value: f64) -> Self {
        Value::Number(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// Build an object from entries. A repeated key keeps its first
    /// position and takes the last value.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let properties: Properties = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Whether `target` is this object or is nested somewhere inside it
    pub fn reaches(&self, target: &ObjectRef) -> bool {
        match self {
            Value::Object(obj) => {
                Rc::ptr_eq(obj, target) || obj.borrow().values().any(|v| v.reaches(target))
            }
            _ => false,
        }
    }

    /// Copy with every nested object duplicated rather than shared
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Object(obj) => {
                Value::object(obj.borrow().iter().map(|(k, v)| (k.clone(), v.deep_copy())))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(obj) => {
                let obj = obj.borrow();
                if obj.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in obj.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match value {
                        Value::String(s) => write!(f, "{}: {:?}", key, s)?,
                        other => write!(f, "{}: {}", key, other)?,
                    }
                }
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b) || a.borrow().iter().eq(b.borrow().iter())
            }
            _ => false,
        }
    }
}
