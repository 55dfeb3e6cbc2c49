//! Attachment extraction: run each routed body field through its processor

use crate::error::{AttachError, Result};
use crate::registry::ProcessorRegistry;
use crate::tables::{attachment_key, RoutingTable};
use crate::{Attachments, Body};
use std::collections::BTreeMap;

/// Process every routed field of `body` into `attachments.<field>` records
///
/// A routed field that is absent from `body` produces no entry. A routed type
/// without a registered processor fails the whole extraction, whether or not
/// its fields are present, and so does a field routed to more than one type.
pub fn extract_attachments(
    registry: &ProcessorRegistry,
    routing: &RoutingTable,
    body: &Body,
) -> Result<Attachments> {
    let mut attachments = Attachments::new();
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

    for (type_name, fields) in routing.iter() {
        for field in fields {
            if let Some(first_type) = seen.insert(field.as_str(), type_name) {
                return Err(AttachError::DuplicateRoute {
                    field: field.clone(),
                    first_type: first_type.to_string(),
                    second_type: type_name.to_string(),
                });
            }
            let processor = registry.resolve(type_name, field)?;

            let Some(value) = body.get(field) else {
                tracing::debug!(
                    target: "attach::extract",
                    field = field.as_str(),
                    type_name,
                    "routed field absent from body; skipping"
                );
                continue;
            };

            let records = processor.process(value)?;
            attachments.insert(attachment_key(field), records);
        }
    }

    Ok(attachments)
}
