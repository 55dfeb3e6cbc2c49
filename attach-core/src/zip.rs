//! Zipping processed attachments into combined records

use crate::error::{AttachError, Result};
use crate::seq::zip_many_with;
use crate::tables::{attachment_key, ZipTable};
use crate::{Attachments, Record};
use std::collections::BTreeSet;

/// Shallow-merge records left to right; later records win on key conflicts
pub fn merge_records(row: &[&Record]) -> Record {
    let mut merged = Record::new();
    for record in row {
        merged.extend((*record).clone());
    }
    merged
}

/// Merge the attachments named by each zip entry into `attachments.<output_key>`
///
/// Each output holds as many records as its shortest input. Attachments not
/// consumed by any zip entry are passed through under their original key; an
/// output key that collides with a passthrough key replaces it.
pub fn zip_attachments(zip: &ZipTable, processed: Attachments) -> Result<Attachments> {
    let mut zipped = Vec::new();

    for (output_key, inputs) in zip.iter() {
        let columns = inputs
            .iter()
            .map(|input| {
                processed
                    .get(&attachment_key(input))
                    .map(Vec::as_slice)
                    .ok_or_else(|| AttachError::MissingZipInput {
                        output_key: output_key.to_string(),
                        input_key: input.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let records = zip_many_with(&columns, merge_records);
        tracing::trace!(
            target: "attach::zip",
            output_key,
            inputs = inputs.len(),
            records = records.len(),
            "zipped attachments"
        );
        zipped.push((attachment_key(output_key), records));
    }

    let consumed: BTreeSet<String> = zip.input_keys().into_iter().map(attachment_key).collect();
    let mut result: Attachments = processed
        .into_iter()
        .filter(|(key, _)| !consumed.contains(key))
        .collect();
    result.extend(zipped);

    Ok(result)
}
