//! Record capability
//!
//! A table type tells the store three things about itself: the table it
//! lives in, how to read its identity, and how to read a named field for
//! secondary indexing. Nothing is discovered at runtime.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A value that can be stored in a table
///
/// ```
/// use litestore::{FieldValue, Record};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Car {
///     id: u32,
///     brand: String,
/// }
///
/// impl Record for Car {
///     type Id = u32;
///     const TABLE: &'static str = "cars";
///
///     fn identity(&self) -> Option<u32> {
///         Some(self.id)
///     }
///
///     fn field(&self, name: &str) -> Option<FieldValue> {
///         match name {
///             "id" => Some(self.id.into()),
///             "brand" => Some(self.brand.as_str().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned {
    /// Identity type, used as the primary index key
    type Id: Ord + Clone + Debug + Serialize + DeserializeOwned;

    /// Canonical table name; determines the file names on disk
    const TABLE: &'static str;

    /// Identity accessor. `None` means the record cannot be keyed.
    fn identity(&self) -> Option<Self::Id>;

    /// Named-field accessor used by secondary indexes.
    /// `None` means the field name is unknown to this type.
    fn field(&self, _name: &str) -> Option<FieldValue> {
        None
    }
}

/// A field value used as a secondary index key
///
/// Floats are deliberately absent: they have no total order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Text(String),
    Bytes(Vec<u8>),
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64);
impl_from_int!(UInt, u64, u8, u16, u32, u64, usize);

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        FieldValue::Bytes(v.to_vec())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}
