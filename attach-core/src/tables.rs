//! Routing and zip tables

use crate::error::{AttachError, Result};
use crate::registry::ProcessorRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Namespace prefix of every attachment key in an update document
pub const ATTACHMENTS_PREFIX: &str = "attachments.";

/// Prefix `key` with the attachments namespace
pub fn attachment_key(key: &str) -> String {
    format!("{}{}", ATTACHMENTS_PREFIX, key)
}

/// Processor type name -> body field keys processed by that type
///
/// ```toml
/// [attachments_by_type]
/// images = ["images", "cover"]
/// description = ["description"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable(BTreeMap<String, Vec<String>>);

impl RoutingTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `fields` to processor `type_name`, appending to any existing route
    pub fn route<I, S>(mut self, type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(type_name.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Iterate `(type_name, fields)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every field key referenced by any type
    pub fn attachment_keys(&self) -> BTreeSet<&str> {
        self.0.values().flatten().map(String::as_str).collect()
    }

    /// Type a field is routed to, if any
    pub fn type_of(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(_, fields)| fields.iter().any(|f| f == field))
            .map(|(type_name, _)| type_name)
    }

    /// Whether no type is routed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every type is registered and every field has exactly one type
    pub fn validate(&self, registry: &ProcessorRegistry) -> Result<()> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

        for (type_name, fields) in self.iter() {
            if !registry.contains(type_name) {
                return Err(AttachError::UnregisteredType {
                    type_name: type_name.to_string(),
                    field: fields.first().cloned().unwrap_or_default(),
                });
            }

            for field in fields {
                if let Some(first_type) = seen.insert(field.as_str(), type_name) {
                    return Err(AttachError::DuplicateRoute {
                        field: field.clone(),
                        first_type: first_type.to_string(),
                        second_type: type_name.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl<K, V, S> FromIterator<(K, V)> for RoutingTable
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (type_name, fields)| table.route(type_name, fields))
    }
}

/// New output key -> attachment field keys merged index by index
///
/// ```toml
/// [to_zip]
/// gallery = ["images", "description"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipTable(BTreeMap<String, Vec<String>>);

impl ZipTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip `inputs` into `output_key`; later inputs win on key conflicts
    pub fn zip<I, S>(mut self, output_key: impl Into<String>, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(output_key.into(), inputs.into_iter().map(Into::into).collect());
        self
    }

    /// Iterate `(output_key, inputs)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every input key consumed by some output
    pub fn input_keys(&self) -> BTreeSet<&str> {
        self.0.values().flatten().map(String::as_str).collect()
    }

    /// Whether the table has no outputs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every input key is routed by `routing`
    pub fn validate(&self, routing: &RoutingTable) -> Result<()> {
        let routed = routing.attachment_keys();
        for (output_key, inputs) in self.iter() {
            if let Some(input) = inputs.iter().find(|input| !routed.contains(input.as_str())) {
                return Err(AttachError::ZipInputNotRouted {
                    output_key: output_key.to_string(),
                    input_key: input.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<K, V, S> FromIterator<(K, V)> for ZipTable
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (output, inputs)| table.zip(output, inputs))
    }
}
