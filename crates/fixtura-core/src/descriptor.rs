use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::{self, Impossible, SerializeStruct, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Types a factory can build.
///
/// Field keys are the serialized field names, so `#[serde(rename = "...")]`
/// and `#[serde(rename_all = "...")]` decide how a field is addressed.
pub trait Model: Serialize + DeserializeOwned + Default + Send + Sync + 'static {}

impl<T> Model for T where T: Serialize + DeserializeOwned + Default + Send + Sync + 'static {}

/// One field of a model shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub index: usize,
    pub key: String,
    /// Value captured from the model; `None` means "leave unset".
    pub default: Option<Value>,
}

/// Ordered field layout of a model, captured once from a model value.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    index_by_key: HashMap<String, usize>,
}

impl ModelDescriptor {
    /// Describe `model` in field declaration order.
    ///
    /// Fields omitted from the serialized form through `skip_serializing_if`
    /// are still described, with no default. Models serialized through a map
    /// (`#[serde(flatten)]`) are described by the keys they produce.
    pub fn describe<T: Serialize>(model: &T) -> Result<Self> {
        let type_name = std::any::type_name::<T>();
        let mut map = instance_of(model)?;
        let keys: Vec<String> = match model.serialize(FieldNames) {
            Ok(names) => names.into_iter().map(str::to_string).collect(),
            Err(_) => map.keys().cloned().collect(),
        };

        let fields: Vec<FieldDescriptor> = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| {
                let default = map.remove(&key).filter(|value| !value.is_null());
                FieldDescriptor {
                    index,
                    key,
                    default,
                }
            })
            .collect();
        let index_by_key = fields
            .iter()
            .map(|field| (field.key.clone(), field.index))
            .collect();

        Ok(Self {
            type_name,
            fields,
            index_by_key,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_by_key.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index_by_key.contains_key(key)
    }
}

/// Field values of `T::default()`, the starting point of every build.
pub fn zero_instance<T: Model>() -> Result<Map<String, Value>> {
    instance_of(&T::default())
}

/// Field values of `model` keyed by serialized field name.
pub fn instance_of<T: Serialize>(model: &T) -> Result<Map<String, Value>> {
    let type_name = std::any::type_name::<T>();
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidModel(format!(
            "{type_name} serializes to {} instead of a struct",
            kind_name(&other)
        ))),
    }
}

type NameError = serde::de::value::Error;

/// Serializer that only records struct field names, skipped ones included.
struct FieldNames;

struct FieldNameList(Vec<&'static str>);

fn not_a_struct() -> NameError {
    ser::Error::custom("not a struct")
}

macro_rules! reject_values {
    ($($method:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $method(self, $($arg: $ty),*) -> std::result::Result<Self::Ok, NameError> {
                Err(not_a_struct())
            }
        )*
    };
}

impl Serializer for FieldNames {
    type Ok = Vec<&'static str>;
    type Error = NameError;
    type SerializeSeq = Impossible<Self::Ok, NameError>;
    type SerializeTuple = Impossible<Self::Ok, NameError>;
    type SerializeTupleStruct = Impossible<Self::Ok, NameError>;
    type SerializeTupleVariant = Impossible<Self::Ok, NameError>;
    type SerializeMap = Impossible<Self::Ok, NameError>;
    type SerializeStruct = FieldNameList;
    type SerializeStructVariant = Impossible<Self::Ok, NameError>;

    reject_values! {
        serialize_bool(_v: bool);
        serialize_i8(_v: i8);
        serialize_i16(_v: i16);
        serialize_i32(_v: i32);
        serialize_i64(_v: i64);
        serialize_u8(_v: u8);
        serialize_u16(_v: u16);
        serialize_u32(_v: u32);
        serialize_u64(_v: u64);
        serialize_f32(_v: f32);
        serialize_f64(_v: f64);
        serialize_char(_v: char);
        serialize_str(_v: &str);
        serialize_bytes(_v: &[u8]);
        serialize_none();
        serialize_unit();
        serialize_unit_struct(_name: &'static str);
        serialize_unit_variant(_name: &'static str, _index: u32, _variant: &'static str);
    }

    fn serialize_some<V: ?Sized + Serialize>(
        self,
        _value: &V,
    ) -> std::result::Result<Self::Ok, NameError> {
        Err(not_a_struct())
    }

    fn serialize_newtype_struct<V: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _value: &V,
    ) -> std::result::Result<Self::Ok, NameError> {
        Err(not_a_struct())
    }

    fn serialize_newtype_variant<V: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &V,
    ) -> std::result::Result<Self::Ok, NameError> {
        Err(not_a_struct())
    }

    fn serialize_seq(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeSeq, NameError> {
        Err(not_a_struct())
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self::SerializeTuple, NameError> {
        Err(not_a_struct())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, NameError> {
        Err(not_a_struct())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, NameError> {
        Err(not_a_struct())
    }

    fn serialize_map(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeMap, NameError> {
        Err(not_a_struct())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<Self::SerializeStruct, NameError> {
        Ok(FieldNameList(Vec::with_capacity(len)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, NameError> {
        Err(not_a_struct())
    }
}

impl SerializeStruct for FieldNameList {
    type Ok = Vec<&'static str>;
    type Error = NameError;

    fn serialize_field<V: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        _value: &V,
    ) -> std::result::Result<(), NameError> {
        self.0.push(key);
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> std::result::Result<(), NameError> {
        self.0.push(key);
        Ok(())
    }

    fn end(self) -> std::result::Result<Self::Ok, NameError> {
        Ok(self.0)
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
