//! Addressing for custom resources.
//!
//! A custom resource kind is registered under a dotted name such as
//! `tpr-storage.giantswarm.io`: the first label names the resource, the rest
//! is the API group. Everything else (kind, plural, REST paths) is derived
//! from that name and a version.

use serde_json::{json, Value};

use crate::error::{ClientError, ClientResult};

/// A registered (or to-be-registered) custom resource kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    group: String,
    version: String,
    kind: String,
    plural: String,
}

impl ResourceKind {
    /// Derive a kind from its dotted schema name and version.
    ///
    /// `tpr-storage.giantswarm.io` + `v1` gives kind `TprStorage`, plural
    /// `tprstorages` and API version `giantswarm.io/v1`.
    pub fn from_schema_name(name: &str, version: &str) -> ClientResult<Self> {
        if version.is_empty() {
            return Err(ClientError::Config("schema version is empty".into()));
        }
        let (resource, group) = name
            .split_once('.')
            .ok_or_else(|| ClientError::Config(format!("schema name {name:?} has no group")))?;
        if resource.is_empty() || group.is_empty() {
            return Err(ClientError::Config(format!(
                "schema name {name:?} must look like <resource>.<group>"
            )));
        }

        let kind: String = resource
            .split('-')
            .filter(|part| !part.is_empty())
            .map(capitalize)
            .collect();
        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ClientError::Config(format!(
                "schema name {name:?} does not yield a valid kind"
            )));
        }
        let plural = format!("{}s", kind.to_lowercase());

        Ok(Self {
            group: group.to_string(),
            version: version.to_string(),
            kind,
            plural,
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// `<group>/<version>`, as carried in an object's `apiVersion`.
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    /// Name of the definition object that registers this kind.
    pub fn definition_name(&self) -> String {
        format!("{}.{}", self.plural, self.group)
    }

    /// Cluster-wide collection; servable once the kind is established.
    pub fn cluster_path(&self) -> String {
        format!("/apis/{}/{}/{}", self.group, self.version, self.plural)
    }

    /// Collection of objects of this kind within a namespace.
    pub fn collection_path(&self, namespace: &str) -> String {
        format!(
            "/apis/{}/{}/namespaces/{}/{}",
            self.group, self.version, namespace, self.plural
        )
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
        }
        None => String::new(),
    }
}

/// Everything needed to register a [`ResourceKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub kind: ResourceKind,
    pub description: String,
}

impl SchemaDefinition {
    pub fn new(kind: ResourceKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Path of the registered definition object.
    pub fn path(&self) -> String {
        format!("{}/{}", DEFINITIONS_PATH, self.kind.definition_name())
    }

    /// The definition body accepted by the API server.
    ///
    /// Objects of the kind are namespaced and schemaless: only the presence
    /// of a version is checked, the payload is preserved as sent.
    pub fn to_definition(&self) -> Value {
        json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "CustomResourceDefinition",
            "metadata": { "name": self.kind.definition_name() },
            "spec": {
                "group": self.kind.group,
                "scope": "Namespaced",
                "names": {
                    "plural": self.kind.plural,
                    "singular": self.kind.kind.to_lowercase(),
                    "kind": self.kind.kind,
                    "listKind": format!("{}List", self.kind.kind),
                },
                "versions": [{
                    "name": self.kind.version,
                    "served": true,
                    "storage": true,
                    "schema": {
                        "openAPIV3Schema": {
                            "type": "object",
                            "description": self.description,
                            "x-kubernetes-preserve-unknown-fields": true,
                        }
                    }
                }]
            }
        })
    }
}

/// Collection of custom resource definitions.
pub const DEFINITIONS_PATH: &str = "/apis/apiextensions.k8s.io/v1/customresourcedefinitions";

/// Collection of namespaces.
pub const NAMESPACES_PATH: &str = "/api/v1/namespaces";

/// Path of a single namespace.
pub fn namespace_path(name: &str) -> String {
    format!("{NAMESPACES_PATH}/{name}")
}

/// The body that creates a namespace.
pub fn namespace_definition(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name },
    })
}

/// Address of one object: (kind, namespace, name).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Collection the object is created in.
    pub fn collection_path(&self) -> String {
        self.kind.collection_path(&self.namespace)
    }

    /// Path of the object itself.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection_path(), self.name)
    }
}
