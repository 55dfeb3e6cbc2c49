//! Attach Core - Attachment processing for partial-update documents
//!
//! This crate turns a request body holding attachment fields (image filename
//! arrays, parallel description arrays, ...) plus arbitrary other fields into
//! a MongoDB-style `{"$set": {...}}` update document. It includes:
//!
//! - Sequence helpers (scalar normalization, indexed mapping, N-way zip)
//! - The field processor registry and its built-in processors
//! - Routing and zip tables
//! - Attachment extraction and zipping
//! - Update document assembly
//!
//! Everything here is pure: no I/O, no shared state, no mutation of inputs.
//!
//! ```
//! use attach_core::{process_attachments_and_body, ProcessorRegistry, RoutingTable};
//! use serde_json::json;
//!
//! let registry = ProcessorRegistry::with_defaults("http://x/up");
//! let routing = RoutingTable::new().route("images", ["images"]);
//! let body = serde_json::from_value(json!({"name": "bla", "images": ["a.jpg"]})).unwrap();
//!
//! let doc = process_attachments_and_body(&registry, &routing, &body).unwrap();
//! assert_eq!(doc.set["name"], json!("bla"));
//! assert_eq!(doc.set["attachments.images"][0]["url"], json!("http://x/up/a.jpg"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod assemble;
pub mod combinator;
pub mod error;
pub mod extract;
pub mod registry;
pub mod seq;
pub mod tables;
pub mod zip;

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Request body: field name -> scalar, array or nested mapping
pub type Body = Map<String, Value>;

/// One processed attachment record
pub type Record = Map<String, Value>;

/// `attachments.<key>` -> processed records, in input order
pub type Attachments = BTreeMap<String, Vec<Record>>;

// Re-export commonly used types
pub use assemble::{
    assemble, process_attachments_and_body, process_zipped_attachments_and_body,
    AttachmentProcessor, Request, UpdateDocument,
};
pub use combinator::{ReplaceArrays, SetCombinator};
pub use error::{AttachError, Result};
pub use extract::extract_attachments;
pub use registry::{
    image_processor, indexed, text_processor, FieldProcessor, ProcessorRegistry, RegistryBuilder,
};
pub use seq::{indexed_map, zip_many_with};
pub use tables::{attachment_key, RoutingTable, ZipTable, ATTACHMENTS_PREFIX};
pub use zip::zip_attachments;
