//! Field processor registry
//!
//! A registry maps a processor type name (as used in a routing table) to a
//! [`FieldProcessor`]. Registries are assembled with [`RegistryBuilder`]: the
//! builder starts from the built-in processors, callers apply overrides, and
//! [`RegistryBuilder::build`] yields an immutable [`ProcessorRegistry`].
//!
//! # Built-in processors
//!
//! - `images`: enriches a filename with upload and thumbnail URLs
//! - `description`, `title`: wrap the raw element under the field name
//!
//! Every built-in accepts either a scalar or an array and always returns one
//! record per element, tagged by position where the processor records it.

use crate::error::{AttachError, Result};
use crate::seq::{indexed_map, type_name};
use crate::Record;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Type name of the built-in image processor
pub const IMAGES: &str = "images";
/// Type name of the built-in description processor
pub const DESCRIPTION: &str = "description";
/// Type name of the built-in title processor
pub const TITLE: &str = "title";

/// Turns the raw value of one body field into its attachment records
pub trait FieldProcessor: Send + Sync {
    /// Process a body value (scalar or array) into one record per element
    fn process(&self, value: &Value) -> Result<Vec<Record>>;
}

impl<F> FieldProcessor for F
where
    F: Fn(&Value) -> Result<Vec<Record>> + Send + Sync,
{
    fn process(&self, value: &Value) -> Result<Vec<Record>> {
        self(value)
    }
}

/// Lift a per-element function `(element, index) -> record` into a field processor
pub fn indexed<F>(f: F) -> impl FieldProcessor
where
    F: Fn(&Value, usize) -> Result<Record> + Send + Sync,
{
    move |value: &Value| indexed_map(value, &f)
}

/// Processor that wraps each element under `prop`: `elem -> {prop: elem}`
pub fn text_processor(prop: impl Into<String>) -> impl FieldProcessor {
    let prop = prop.into();
    indexed(move |elem, _index| {
        let mut record = Record::new();
        record.insert(prop.clone(), elem.clone());
        Ok(record)
    })
}

/// Processor that expands image filenames into stored image records
///
/// `"a.jpg"` at index `i` becomes
/// `{image_id: "a.jpg", order: i, url: "<base>/a.jpg", thumbnail_url: "<base>/thumbnails/a.jpg"}`.
/// An empty filename yields empty URLs regardless of `uploads_folder`.
pub fn image_processor(uploads_folder: impl Into<String>) -> impl FieldProcessor {
    let base = uploads_folder.into();
    indexed(move |elem, index| {
        let filename = elem.as_str().ok_or_else(|| AttachError::InvalidElement {
            type_name: IMAGES.to_string(),
            index,
            expected: "string",
            found: type_name(elem),
        })?;
        Ok(image_record(&base, filename, index))
    })
}

fn image_record(base: &str, filename: &str, index: usize) -> Record {
    let (url, thumbnail_url) = if filename.is_empty() {
        (String::new(), String::new())
    } else {
        (
            format!("{}/{}", base, filename),
            format!("{}/thumbnails/{}", base, filename),
        )
    };

    let mut record = Record::new();
    record.insert("image_id".to_string(), Value::String(filename.to_string()));
    record.insert("order".to_string(), Value::from(index));
    record.insert("url".to_string(), Value::String(url));
    record.insert("thumbnail_url".to_string(), Value::String(thumbnail_url));
    record
}

/// Immutable lookup from processor type name to processor
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: BTreeMap<String, Arc<dyn FieldProcessor>>,
}

impl ProcessorRegistry {
    /// Start a builder preloaded with the built-in processors
    pub fn builder(uploads_folder: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder::with_defaults(uploads_folder)
    }

    /// Registry holding only the built-in processors
    pub fn with_defaults(uploads_folder: impl Into<String>) -> Self {
        Self::builder(uploads_folder).build()
    }

    /// Shallow merge: entries of `overrides` replace same-named entries of `self`
    pub fn merge(mut self, overrides: ProcessorRegistry) -> Self {
        self.processors.extend(overrides.processors);
        self
    }

    /// Look up the processor registered for `type_name`
    pub fn get(&self, type_name: &str) -> Option<&dyn FieldProcessor> {
        self.processors.get(type_name).map(|p| p.as_ref())
    }

    /// Look up a processor, reporting `field` as the routed key on failure
    pub fn resolve(&self, type_name: &str, field: &str) -> Result<&dyn FieldProcessor> {
        self.get(type_name)
            .ok_or_else(|| AttachError::UnregisteredType {
                type_name: type_name.to_string(),
                field: field.to_string(),
            })
    }

    /// Whether a processor is registered under `type_name`
    pub fn contains(&self, type_name: &str) -> bool {
        self.processors.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.processors.keys().map(String::as_str)
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("types", &self.processors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ProcessorRegistry`]
pub struct RegistryBuilder {
    processors: BTreeMap<String, Arc<dyn FieldProcessor>>,
}

impl RegistryBuilder {
    /// Empty builder with no built-in processors
    pub fn empty() -> Self {
        Self {
            processors: BTreeMap::new(),
        }
    }

    /// Builder preloaded with `images`, `description` and `title`
    pub fn with_defaults(uploads_folder: impl Into<String>) -> Self {
        Self::empty()
            .register(IMAGES, image_processor(uploads_folder.into()))
            .register(DESCRIPTION, text_processor(DESCRIPTION))
            .register(TITLE, text_processor(TITLE))
    }

    /// Register `processor` under `type_name`, replacing any previous entry
    pub fn register<P>(mut self, type_name: impl Into<String>, processor: P) -> Self
    where
        P: FieldProcessor + 'static,
    {
        self.processors.insert(type_name.into(), Arc::new(processor));
        self
    }

    /// Register a per-element function under `type_name`
    pub fn register_indexed<F>(self, type_name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, usize) -> Result<Record> + Send + Sync + 'static,
    {
        self.register(type_name, indexed(f))
    }

    /// Register a text processor that wraps elements under their own field name
    pub fn register_text(self, field: impl Into<String>) -> Self {
        let field = field.into();
        let processor = text_processor(field.clone());
        self.register(field, processor)
    }

    /// Apply every entry of `overrides`, replacing same-named processors
    pub fn overrides(mut self, overrides: ProcessorRegistry) -> Self {
        self.processors.extend(overrides.processors);
        self
    }

    /// Finish building
    pub fn build(self) -> ProcessorRegistry {
        ProcessorRegistry {
            processors: self.processors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://localhost:1231/public/uploads";

    fn records(value: Vec<Record>) -> Value {
        Value::Array(value.into_iter().map(Value::Object).collect())
    }

    #[test]
    fn image_processor_builds_urls() {
        let out = image_processor("http://x/up").process(&json!(["a.jpg"])).unwrap();
        assert_eq!(
            records(out),
            json!([{
                "image_id": "a.jpg",
                "order": 0,
                "url": "http://x/up/a.jpg",
                "thumbnail_url": "http://x/up/thumbnails/a.jpg"
            }])
        );
    }

    #[test]
    fn image_processor_empty_filename_has_empty_urls() {
        let out = image_processor(BASE).process(&json!(["a.jpg", ""])).unwrap();
        assert_eq!(
            Value::Object(out[1].clone()),
            json!({"image_id": "", "order": 1, "url": "", "thumbnail_url": ""})
        );
    }

    #[test]
    fn image_processor_accepts_scalar() {
        let out = image_processor(BASE).process(&json!("cat.jpg")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["order"], json!(0));
    }

    #[test]
    fn image_processor_rejects_non_string() {
        let err = image_processor(BASE).process(&json!(["a.jpg", 7])).unwrap_err();
        assert!(matches!(
            err,
            AttachError::InvalidElement {
                index: 1,
                found: "number",
                ..
            }
        ));
    }

    #[test]
    fn text_processor_wraps_element() {
        let out = text_processor("caption").process(&json!(["x", "y"])).unwrap();
        assert_eq!(records(out), json!([{"caption": "x"}, {"caption": "y"}]));
    }

    #[test]
    fn defaults_are_registered() {
        let registry = ProcessorRegistry::with_defaults(BASE);
        assert!(registry.contains(IMAGES));
        assert!(registry.contains(DESCRIPTION));
        assert!(registry.contains(TITLE));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn override_replaces_default() {
        let overrides = RegistryBuilder::empty()
            .register_indexed(TITLE, |elem, index| {
                let mut record = Record::new();
                record.insert("heading".to_string(), elem.clone());
                record.insert("order".to_string(), Value::from(index));
                Ok(record)
            })
            .build();
        let registry = ProcessorRegistry::with_defaults(BASE).merge(overrides);

        let out = registry.get(TITLE).unwrap().process(&json!("t")).unwrap();
        assert_eq!(records(out), json!([{"heading": "t", "order": 0}]));
        assert!(registry.contains(IMAGES));
    }

    #[test]
    fn builder_overrides_match_merge() {
        let overrides = RegistryBuilder::empty().register_text("caption").build();
        let registry = ProcessorRegistry::builder(BASE).overrides(overrides).build();
        let names: Vec<_> = registry.type_names().collect();
        assert_eq!(names, vec!["caption", "description", "images", "title"]);
    }

    #[test]
    fn resolve_reports_unregistered_type() {
        let registry = ProcessorRegistry::with_defaults(BASE);
        let err = registry.resolve("videos", "clips").err().unwrap();
        assert!(matches!(err, AttachError::UnregisteredType { .. }));
    }
}
