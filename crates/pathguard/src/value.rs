//! Values a store can hold, and what a read hands back.
//!
//! [`StoreValue`] is a closed sum type. Every traversal routine dispatches on
//! its variant; nothing outside these variants can be reached through a path.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use pathguard_core::Primitive;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Named fields of a plain object, or of a store.
pub type Fields = BTreeMap<String, StoreValue>;

/// A zero-argument function producing a value on every access.
#[derive(Clone)]
pub struct Lazy(Rc<dyn Fn() -> StoreValue>);

impl Lazy {
    pub fn new<F, V>(f: F) -> Self
    where
        F: Fn() -> V + 'static,
        V: Into<StoreValue>,
    {
        Self(Rc::new(move || f().into()))
    }

    /// Invoke the function.
    pub fn call(&self) -> StoreValue {
        (self.0)()
    }

    /// Whether both handles refer to the same function.
    pub fn ptr_eq(&self, other: &Lazy) -> bool {
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lazy(..)")
    }
}

impl PartialEq for Lazy {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A plain nested container. Owned by value: copying it copies the contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Object(Fields),
    Array(Vec<StoreValue>),
}

impl Container {
    /// JSON rendering. Undefined and lazy members are dropped from objects and
    /// become `null` inside arrays.
    pub fn to_json(&self) -> Value {
        match self {
            Container::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                    .collect(),
            ),
            Container::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| v.to_json().unwrap_or(Value::Null))
                    .collect(),
            ),
        }
    }
}

/// Anything a store field can hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StoreValue {
    /// No value. Reads back as undefined and is omitted from exports.
    #[default]
    Undefined,
    Primitive(Primitive),
    Container(Container),
    Store(Store),
    Lazy(Lazy),
}

impl StoreValue {
    /// A fresh empty plain object.
    pub fn object() -> Self {
        StoreValue::Container(Container::Object(Fields::new()))
    }

    /// A lazy value computed by `f` on every access.
    pub fn lazy<F, V>(f: F) -> Self
    where
        F: Fn() -> V + 'static,
        V: Into<StoreValue>,
    {
        StoreValue::Lazy(Lazy::new(f))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, StoreValue::Undefined)
    }

    /// `null` and undefined carry no fields but may be replaced by containers.
    pub fn is_nullish(&self) -> bool {
        matches!(
            self,
            StoreValue::Undefined | StoreValue::Primitive(Primitive::Null)
        )
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            StoreValue::Store(store) => Some(store),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            StoreValue::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            StoreValue::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Name of the value's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreValue::Undefined => "undefined",
            StoreValue::Primitive(p) => p.kind(),
            StoreValue::Container(Container::Object(_)) => "object",
            StoreValue::Container(Container::Array(_)) => "array",
            StoreValue::Store(_) => "store",
            StoreValue::Lazy(_) => "function",
        }
    }

    /// JSON rendering, or `None` for values JSON cannot express.
    ///
    /// Nested stores render as their readable entries. A store that is already
    /// being exported further up the call stack renders as `None`.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            StoreValue::Undefined | StoreValue::Lazy(_) => None,
            StoreValue::Primitive(p) => Some(p.to_json()),
            StoreValue::Container(c) => Some(c.to_json()),
            StoreValue::Store(store) if store.is_exporting() => None,
            StoreValue::Store(store) => Some(Value::Object(store.entries())),
        }
    }
}

/// Result of a read: never a plain container, which is snapshotted as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StoreResult {
    #[default]
    Undefined,
    Primitive(Primitive),
    Store(Store),
}

impl StoreResult {
    pub fn is_undefined(&self) -> bool {
        matches!(self, StoreResult::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StoreResult::Primitive(Primitive::Null))
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            StoreResult::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            StoreResult::Store(store) => Some(store),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_primitive().and_then(Primitive::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_primitive().and_then(Primitive::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_primitive().and_then(Primitive::as_bool)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(Primitive::as_str)
    }

    /// Parse a snapshotted container back into JSON.
    pub fn parse_json(&self) -> Option<Value> {
        self.as_str().and_then(|s| serde_json::from_str(s).ok())
    }
}

impl From<StoreResult> for StoreValue {
    fn from(result: StoreResult) -> Self {
        match result {
            StoreResult::Undefined => StoreValue::Undefined,
            StoreResult::Primitive(p) => StoreValue::Primitive(p),
            StoreResult::Store(store) => StoreValue::Store(store),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for StoreValue {
                fn from(v: $t) -> Self {
                    StoreValue::Primitive(Primitive::from(v))
                }
            }

            impl From<$t> for StoreResult {
                fn from(v: $t) -> Self {
                    StoreResult::Primitive(Primitive::from(v))
                }
            }
        )*
    };
}

impl_from_primitive!(bool, i32, i64, u64, f64, &str, String);

impl From<Primitive> for StoreValue {
    fn from(p: Primitive) -> Self {
        StoreValue::Primitive(p)
    }
}

impl From<Primitive> for StoreResult {
    fn from(p: Primitive) -> Self {
        StoreResult::Primitive(p)
    }
}

impl From<Store> for StoreValue {
    fn from(store: Store) -> Self {
        StoreValue::Store(store)
    }
}

impl From<Store> for StoreResult {
    fn from(store: Store) -> Self {
        StoreResult::Store(store)
    }
}

impl From<Lazy> for StoreValue {
    fn from(lazy: Lazy) -> Self {
        StoreValue::Lazy(lazy)
    }
}

impl From<Container> for StoreValue {
    fn from(container: Container) -> Self {
        StoreValue::Container(container)
    }
}

impl From<Fields> for StoreValue {
    fn from(fields: Fields) -> Self {
        StoreValue::Container(Container::Object(fields))
    }
}

impl From<Vec<StoreValue>> for StoreValue {
    fn from(items: Vec<StoreValue>) -> Self {
        StoreValue::Container(Container::Array(items))
    }
}

impl<T: Into<StoreValue>> From<Option<T>> for StoreValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StoreValue::Undefined, Into::into)
    }
}

impl From<Map<String, Value>> for StoreValue {
    fn from(map: Map<String, Value>) -> Self {
        StoreValue::Container(Container::Object(
            map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        ))
    }
}

impl From<Value> for StoreValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => StoreValue::Primitive(Primitive::Null),
            Value::Bool(b) => StoreValue::Primitive(Primitive::Bool(b)),
            Value::Number(n) => StoreValue::Primitive(Primitive::Number(n)),
            Value::String(s) => StoreValue::Primitive(Primitive::String(s)),
            Value::Array(items) => StoreValue::Container(Container::Array(
                items.into_iter().map(Into::into).collect(),
            )),
            Value::Object(map) => map.into(),
        }
    }
}

/// Keyed access to the fields of a container.
///
/// Objects are keyed by name. Arrays are keyed by canonical decimal index.
pub trait FieldMap {
    /// Look up a field.
    fn field(&self, key: &str) -> Option<&StoreValue>;

    /// Set a field, replacing any previous value.
    fn set_field(&mut self, key: &str, value: StoreValue) -> Result<()>;

    /// Get a field for mutation, inserting `default()` first if it is absent.
    fn slot_or_insert(
        &mut self,
        key: &str,
        default: impl FnOnce() -> StoreValue,
    ) -> Result<&mut StoreValue>;

    /// All field keys, in iteration order.
    fn field_names(&self) -> Vec<String>;
}

impl FieldMap for Fields {
    fn field(&self, key: &str) -> Option<&StoreValue> {
        self.get(key)
    }

    fn set_field(&mut self, key: &str, value: StoreValue) -> Result<()> {
        self.insert(key.to_string(), value);
        Ok(())
    }

    fn slot_or_insert(
        &mut self,
        key: &str,
        default: impl FnOnce() -> StoreValue,
    ) -> Result<&mut StoreValue> {
        Ok(match self.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        })
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Largest number of undefined slots a single array write may pad with.
pub const MAX_INDEX_GAP: usize = 1024;

/// Parse a canonical array index: decimal digits, no sign, no leading zeros.
fn parse_index(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

impl FieldMap for Vec<StoreValue> {
    fn field(&self, key: &str) -> Option<&StoreValue> {
        parse_index(key).and_then(|i| self.get(i))
    }

    fn set_field(&mut self, key: &str, value: StoreValue) -> Result<()> {
        *self.slot_or_insert(key, StoreValue::default)? = value;
        Ok(())
    }

    fn slot_or_insert(
        &mut self,
        key: &str,
        default: impl FnOnce() -> StoreValue,
    ) -> Result<&mut StoreValue> {
        let index = parse_index(key).ok_or_else(|| StoreError::InvalidIndex(key.to_string()))?;
        if index.saturating_sub(self.len()) > MAX_INDEX_GAP {
            return Err(StoreError::InvalidIndex(key.to_string()));
        }
        if index >= self.len() {
            // Gaps left by writing past the end hold undefined.
            self.resize(index, StoreValue::Undefined);
            self.push(default());
        }
        Ok(&mut self[index])
    }

    fn field_names(&self) -> Vec<String> {
        (0..self.len()).map(|i| i.to_string()).collect()
    }
}

impl FieldMap for Container {
    fn field(&self, key: &str) -> Option<&StoreValue> {
        match self {
            Container::Object(fields) => fields.field(key),
            Container::Array(items) => items.field(key),
        }
    }

    fn set_field(&mut self, key: &str, value: StoreValue) -> Result<()> {
        match self {
            Container::Object(fields) => fields.set_field(key, value),
            Container::Array(items) => items.set_field(key, value),
        }
    }

    fn slot_or_insert(
        &mut self,
        key: &str,
        default: impl FnOnce() -> StoreValue,
    ) -> Result<&mut StoreValue> {
        match self {
            Container::Object(fields) => fields.slot_or_insert(key, default),
            Container::Array(items) => items.slot_or_insert(key, default),
        }
    }

    fn field_names(&self) -> Vec<String> {
        match self {
            Container::Object(fields) => fields.field_names(),
            Container::Array(items) => items.field_names(),
        }
    }
}
