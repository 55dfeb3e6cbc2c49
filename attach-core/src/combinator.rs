//! Set combinators for the non-zipped path

use crate::{Attachments, Body};
use serde_json::Value;

/// Shapes processed attachments into update fields when nothing is zipped
///
/// Implementations decide how an attachment array lands in the `$set`
/// mapping. The default, [`ReplaceArrays`], makes each array the full
/// replacement value of its namespaced key.
pub trait SetCombinator: Send + Sync {
    /// Turn `attachments.<key> -> records` into update fields
    fn combine(&self, attachments: Attachments) -> Body;
}

/// Each processed array becomes the complete new value of its key
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceArrays;

impl SetCombinator for ReplaceArrays {
    fn combine(&self, attachments: Attachments) -> Body {
        attachments_into_fields(attachments)
    }
}

/// Convert typed attachment records into plain JSON update fields
pub fn attachments_into_fields(attachments: Attachments) -> Body {
    attachments
        .into_iter()
        .map(|(key, records)| {
            let array = records.into_iter().map(Value::Object).collect();
            (key, Value::Array(array))
        })
        .collect()
}
