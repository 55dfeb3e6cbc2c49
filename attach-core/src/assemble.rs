//! Update document assembly
//!
//! Splits a request body into attachment fields and plain fields, runs the
//! attachments through extraction (and zipping, when a zip table is given)
//! and merges everything under a single `$set` operator.

use crate::combinator::{attachments_into_fields, ReplaceArrays, SetCombinator};
use crate::error::Result;
use crate::extract::extract_attachments;
use crate::registry::ProcessorRegistry;
use crate::tables::{RoutingTable, ZipTable};
use crate::zip::zip_attachments;
use crate::Body;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A request-shaped input: anything exposing a `body` mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request body fields
    #[serde(default)]
    pub body: Body,
}

/// MongoDB-style partial update: `{"$set": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDocument {
    /// Fields to set, plain body keys and `attachments.*` keys alike
    #[serde(rename = "$set")]
    pub set: Body,
}

impl UpdateDocument {
    /// Whether the document sets nothing
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> Value {
        let mut doc = Body::new();
        doc.insert("$set".to_string(), Value::Object(self.set));
        Value::Object(doc)
    }
}

/// Split `body` into (attachment fields, plain fields)
pub fn partition_body(body: &Body, attachment_keys: &BTreeSet<&str>) -> (Body, Body) {
    let mut attachments = Body::new();
    let mut plain = Body::new();
    for (key, value) in body {
        if attachment_keys.contains(key.as_str()) {
            attachments.insert(key.clone(), value.clone());
        } else {
            plain.insert(key.clone(), value.clone());
        }
    }
    (attachments, plain)
}

/// Build the update document for `body`
///
/// With `zip` absent, processed attachments are shaped by `combinator`; with
/// `zip` present, they go through the zipper. Either way a body without any
/// routed field yields no attachment entries. Plain fields, nested mappings
/// included, are copied verbatim.
pub fn assemble(
    registry: &ProcessorRegistry,
    routing: &RoutingTable,
    zip: Option<&ZipTable>,
    combinator: &dyn SetCombinator,
    body: &Body,
) -> Result<UpdateDocument> {
    let attachment_keys = routing.attachment_keys();
    let (attachments_body, plain_body) = partition_body(body, &attachment_keys);
    let processed = extract_attachments(registry, routing, &attachments_body)?;

    let mut set = if attachments_body.is_empty() {
        Body::new()
    } else {
        match zip {
            None => combinator.combine(processed),
            Some(zip) => attachments_into_fields(zip_attachments(zip, processed)?),
        }
    };

    tracing::debug!(
        target: "attach::assemble",
        attachment_fields = set.len(),
        plain_fields = plain_body.len(),
        zipped = zip.is_some(),
        "assembled update document"
    );

    set.extend(plain_body);
    Ok(UpdateDocument { set })
}

/// Build an update document without zipping
pub fn process_attachments_and_body(
    registry: &ProcessorRegistry,
    routing: &RoutingTable,
    body: &Body,
) -> Result<UpdateDocument> {
    assemble(registry, routing, None, &ReplaceArrays, body)
}

/// Build an update document, zipping attachments per `zip`
pub fn process_zipped_attachments_and_body(
    registry: &ProcessorRegistry,
    routing: &RoutingTable,
    zip: &ZipTable,
    body: &Body,
) -> Result<UpdateDocument> {
    assemble(registry, routing, Some(zip), &ReplaceArrays, body)
}

/// Registry and tables bound once, applied to many request bodies
#[derive(Clone)]
pub struct AttachmentProcessor {
    registry: ProcessorRegistry,
    routing: RoutingTable,
    zip: Option<ZipTable>,
    combinator: Arc<dyn SetCombinator>,
}

impl AttachmentProcessor {
    /// Bind `registry` and `routing`; no zipping, array-replacing combinator
    pub fn new(registry: ProcessorRegistry, routing: RoutingTable) -> Self {
        Self {
            registry,
            routing,
            zip: None,
            combinator: Arc::new(ReplaceArrays),
        }
    }

    /// Zip attachments with `zip` on every call
    pub fn with_zip(mut self, zip: ZipTable) -> Self {
        self.zip = Some(zip);
        self
    }

    /// Use `combinator` on the non-zipped path
    pub fn with_combinator<C: SetCombinator + 'static>(mut self, combinator: C) -> Self {
        self.combinator = Arc::new(combinator);
        self
    }

    /// Check the bound tables against the registry up front
    pub fn validate(&self) -> Result<()> {
        self.routing.validate(&self.registry)?;
        if let Some(zip) = &self.zip {
            zip.validate(&self.routing)?;
        }
        Ok(())
    }

    /// Build the update document for one body
    pub fn process(&self, body: &Body) -> Result<UpdateDocument> {
        assemble(
            &self.registry,
            &self.routing,
            self.zip.as_ref(),
            self.combinator.as_ref(),
            body,
        )
    }

    /// Build the update document for a request
    pub fn process_request(&self, request: &Request) -> Result<UpdateDocument> {
        self.process(&request.body)
    }

    /// Bound registry
    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Bound routing table
    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Bound zip table, if any
    pub fn zip_table(&self) -> Option<&ZipTable> {
        self.zip.as_ref()
    }
}
