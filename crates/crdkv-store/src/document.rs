//! The document that holds a store's whole key space.
//!
//! A document is one custom object whose `data` field is a flat
//! string-to-string map. Keys are stored verbatim; hierarchy only exists in
//! how [`prefix`](crate::prefix) interprets them.

use std::collections::{BTreeMap, HashMap};

use crdkv_client::ObjectRef;
use serde::{Deserialize, Deserializer, Serialize};

/// Annotation present on every document.
///
/// It keeps the metadata non-empty so encoders that drop empty fields never
/// strip it down to nothing.
pub const MARKER_ANNOTATION: &str = "storageDoNotOmitempty";
pub const MARKER_VALUE: &str = "non-empty";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// The document as sent on create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub data: HashMap<String, String>,
}

impl Document {
    /// A fresh, empty document at `address`.
    pub fn empty(address: &ObjectRef) -> Self {
        let mut annotations = BTreeMap::new();
        annotations.insert(MARKER_ANNOTATION.to_string(), MARKER_VALUE.to_string());
        Self {
            api_version: address.kind.api_version(),
            kind: address.kind.kind().to_string(),
            metadata: ObjectMeta {
                name: address.name.clone(),
                namespace: address.namespace.clone(),
                annotations,
            },
            data: HashMap::new(),
        }
    }
}

/// The part of a fetched document that reads consume.
///
/// Everything besides `data` is ignored, so objects with missing or unusual
/// metadata still read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentData {
    #[serde(default, deserialize_with = "nullable_map")]
    pub data: HashMap<String, String>,
}

fn nullable_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Merge-patch body touching a single key.
///
/// `Some(value)` sets the key; `None` serializes as `null`, which removes it.
#[derive(Debug, Serialize)]
pub struct DataPatch<'a> {
    data: BTreeMap<&'a str, Option<&'a str>>,
}

impl<'a> DataPatch<'a> {
    pub fn set(key: &'a str, value: &'a str) -> Self {
        Self {
            data: BTreeMap::from([(key, Some(value))]),
        }
    }

    pub fn remove(key: &'a str) -> Self {
        Self {
            data: BTreeMap::from([(key, None)]),
        }
    }
}
