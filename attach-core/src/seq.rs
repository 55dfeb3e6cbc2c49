//! Sequence helpers: scalar normalization, indexed mapping and N-way zipping

use crate::error::Result;
use serde_json::Value;

/// View a body value as a sequence of elements
///
/// Arrays are returned as-is; any other value (including objects and null)
/// becomes a single-element sequence.
pub fn as_elements(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// Apply `f(element, index)` to every element of `value`
///
/// A non-array value is first normalized into a one-element sequence, so a
/// scalar always maps to exactly one result at index 0. The first error
/// aborts the mapping.
pub fn indexed_map<T, F>(value: &Value, mut f: F) -> Result<Vec<T>>
where
    F: FnMut(&Value, usize) -> Result<T>,
{
    as_elements(value)
        .iter()
        .enumerate()
        .map(|(index, elem)| f(elem, index))
        .collect()
}

/// Zip several sequences element-wise with a combining function
///
/// The output length is the length of the shortest input; trailing elements
/// of longer inputs are dropped. With no inputs the result is empty.
pub fn zip_many_with<T, R, F>(inputs: &[&[T]], mut combine: F) -> Vec<R>
where
    F: FnMut(&[&T]) -> R,
{
    let len = match inputs.iter().map(|input| input.len()).min() {
        Some(len) => len,
        None => return Vec::new(),
    };

    let mut row = Vec::with_capacity(inputs.len());
    (0..len)
        .map(|idx| {
            row.clear();
            row.extend(inputs.iter().map(|input| &input[idx]));
            combine(&row)
        })
        .collect()
}

/// Get a human-readable type name for a JSON value
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
