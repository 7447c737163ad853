////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{
    any::Any,
    fmt::{Debug, Display, Formatter},
    sync::{Arc, RwLock},
};

use ahash::AHashMap;
use compact_str::CompactString;

use crate::runtime::{LambdaValue, Primitive, TypeMeta};

/// A host object exposed to expressions.
///
/// The engine never looks inside a host object: all member access goes
/// through the [TypeProvider](crate::runtime::TypeProvider), which may
/// downcast the object through [as_any](Self::as_any).
pub trait HostObject: Debug + Send + Sync + 'static {
    /// The runtime class of the object.
    fn type_meta(&self) -> TypeMeta;

    fn as_any(&self) -> &dyn Any;

    /// A textual form used by string concatenation.
    fn describe(&self) -> String {
        let address = self.as_any() as *const dyn Any as *const ();

        format!("{}@{address:p}", self.type_meta().qualified_name())
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
    Array(ArrayValue),
    Object(Arc<dyn HostObject>),
    Function(Arc<LambdaValue>),
}

impl Default for Value {
    #[inline(always)]
    fn default() -> Self {
        Self::Null
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => formatter.write_str("null"),
            Self::Boolean(value) => Display::fmt(value, formatter),
            Self::Char(value) => Display::fmt(value, formatter),
            Self::Byte(value) => Display::fmt(value, formatter),
            Self::Short(value) => Display::fmt(value, formatter),
            Self::Int(value) => Display::fmt(value, formatter),
            Self::Long(value) => Display::fmt(value, formatter),
            Self::Float(value) => Debug::fmt(value, formatter),
            Self::Double(value) => Debug::fmt(value, formatter),
            Self::String(value) => formatter.write_str(value),
            Self::Array(value) => formatter.write_fmt(format_args!(
                "{}[{}]",
                value.component(),
                value.len()
            )),
            Self::Object(object) => formatter.write_str(&object.describe()),
            Self::Function(function) => Display::fmt(function, formatter),
        }
    }
}

impl From<bool> for Value {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<char> for Value {
    #[inline(always)]
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<i32> for Value {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    #[inline(always)]
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Value {
    #[inline(always)]
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Self::String(Arc::from(value))
    }
}

impl From<String> for Value {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::String(Arc::from(value))
    }
}

impl<T: HostObject> From<T> for Value {
    #[inline(always)]
    fn from(value: T) -> Self {
        Self::Object(Arc::new(value))
    }
}

impl Value {
    /// The runtime type of the value. Returns None for `null`.
    pub fn type_meta(&self) -> Option<TypeMeta> {
        Some(match self {
            Self::Null => return None,
            Self::Boolean(_) => TypeMeta::primitive(Primitive::Boolean),
            Self::Char(_) => TypeMeta::primitive(Primitive::Char),
            Self::Byte(_) => TypeMeta::primitive(Primitive::Byte),
            Self::Short(_) => TypeMeta::primitive(Primitive::Short),
            Self::Int(_) => TypeMeta::primitive(Primitive::Int),
            Self::Long(_) => TypeMeta::primitive(Primitive::Long),
            Self::Float(_) => TypeMeta::primitive(Primitive::Float),
            Self::Double(_) => TypeMeta::primitive(Primitive::Double),
            Self::String(_) => TypeMeta::string(),
            Self::Array(array) => TypeMeta::array(array.component().clone()),
            Self::Object(object) => object.type_meta(),
            Self::Function(function) => function.type_meta().clone(),
        })
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The zero value of a type: `false`, `0`, `'\0'` or `null`.
    pub fn default_of(ty: &TypeMeta) -> Self {
        match ty.as_primitive() {
            Some(Primitive::Boolean) => Self::Boolean(false),
            Some(Primitive::Char) => Self::Char('\0'),
            Some(Primitive::Byte) => Self::Byte(0),
            Some(Primitive::Short) => Self::Short(0),
            Some(Primitive::Int) => Self::Int(0),
            Some(Primitive::Long) => Self::Long(0),
            Some(Primitive::Float) => Self::Float(0.0),
            Some(Primitive::Double) => Self::Double(0.0),
            None => Self::Null,
        }
    }

    #[inline(always)]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integral value of `char`, `byte`, `short`, `int` and
    /// `long` values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Char(value) => Some(*value as i64),
            Self::Byte(value) => Some(*value as i64),
            Self::Short(value) => Some(*value as i64),
            Self::Int(value) => Some(*value as i64),
            Self::Long(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric value of any numeric primitive.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value as f64),
            Self::Double(value) => Some(*value),
            _ => self.as_i64().map(|value| value as f64),
        }
    }

    #[inline(always)]
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Downcasts a host object value.
    pub fn downcast<T: HostObject>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Reference identity for objects, arrays and functions, value equality
    /// for everything else.
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Array(left), Self::Array(right)) => Arc::ptr_eq(&left.items, &right.items),
            (Self::Object(left), Self::Object(right)) => {
                std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
            }
            (Self::Function(left), Self::Function(right)) => Arc::ptr_eq(left, right),
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(left), Some(right)) => left == right,
                _ => match (self.as_f64(), other.as_f64()) {
                    (Some(left), Some(right)) => left == right,
                    _ => false,
                },
            },
        }
    }
}

/// A mutable, shared array.
///
/// Clones of an array value refer to the same elements.
#[derive(Clone)]
pub struct ArrayValue {
    component: TypeMeta,
    items: Arc<RwLock<Vec<Value>>>,
}

impl Debug for ArrayValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ArrayValue")
            .field("component", &self.component)
            .field("items", &self.to_vec())
            .finish()
    }
}

impl ArrayValue {
    /// Creates an array of `component` typed elements.
    pub fn new(component: TypeMeta, items: Vec<Value>) -> Self {
        Self {
            component,
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Creates an array of `length` zero values.
    pub fn filled(component: TypeMeta, length: usize) -> Self {
        let items = vec![Value::default_of(&component); length];

        Self::new(component, items)
    }

    #[inline(always)]
    pub fn component(&self) -> &TypeMeta {
        &self.component
    }

    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(index)
            .cloned()
    }

    /// Replaces an element. Returns false if the index is out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut items = self
            .items
            .write()
            .unwrap_or_else(|poison| poison.into_inner());

        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }

            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

/// A general purpose host object that stores named field values.
///
/// [SchemaProvider](crate::runtime::SchemaProvider) classes keep their
/// instance fields in records.
#[derive(Debug)]
pub struct Record {
    ty: TypeMeta,
    fields: RwLock<AHashMap<CompactString, Value>>,
}

impl HostObject for Record {
    #[inline(always)]
    fn type_meta(&self) -> TypeMeta {
        self.ty.clone()
    }

    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Record {
    /// Creates a record of the `ty` class without field values.
    pub fn new(ty: TypeMeta) -> Self {
        Self {
            ty,
            fields: RwLock::new(AHashMap::new()),
        }
    }

    /// Sets a field value, builder style.
    pub fn with(self, name: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(name)
            .cloned()
    }

    pub fn set(&self, name: impl Into<CompactString>, value: Value) {
        let _ = self
            .fields
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
            .insert(name.into(), value);
    }

    /// Wraps the record into a [Value].
    #[inline(always)]
    pub fn into_value(self) -> Value {
        Value::Object(Arc::new(self))
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{ArrayValue, ClassMeta, Primitive, Record, TypeMeta, Value};

    #[test]
    fn test_value_identity() {
        let point = ClassMeta::new("geo.Point").into_type();

        let first = Record::new(point.clone()).with("x", 1).into_value();
        let second = Record::new(point.clone()).with("x", 1).into_value();

        assert!(first.same(&first.clone()));
        assert!(!first.same(&second));
        assert!(Value::Int(3).same(&Value::Long(3)));
        assert!(Value::Char('a').same(&Value::Int(97)));
        assert!(Value::from("abc").same(&Value::from(String::from("abc"))));
        assert!(!Value::Null.same(&Value::Int(0)));

        assert_eq!(first.type_meta(), Some(point));
        assert_eq!(Value::Null.type_meta(), None);
    }

    #[test]
    fn test_shared_array() {
        let array = ArrayValue::filled(Primitive::Int.into(), 3);
        let alias = Value::Array(array.clone());

        assert!(array.set(1, Value::Int(7)));
        assert!(!array.set(3, Value::Int(7)));

        let Some(alias) = alias.as_array() else {
            panic!("Not an array.");
        };

        assert_eq!(alias.get(1).and_then(|value| value.as_i64()), Some(7));
        assert_eq!(alias.len(), 3);
        assert_eq!(
            Value::Array(array).type_meta(),
            Some(TypeMeta::array(Primitive::Int.into())),
        );
    }

    #[test]
    fn test_object_description() {
        let point = ClassMeta::new("geo.Point").into_type();
        let value = Record::new(point).into_value();

        let description = value.to_string();

        let Some(address) = description.strip_prefix("geo.Point@0x") else {
            panic!("Unexpected description {description:?}.");
        };

        assert!(!address.is_empty());
        assert!(address.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
