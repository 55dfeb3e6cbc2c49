//! Error types for attachment processing

use thiserror::Error;

/// Errors that can occur while building an update document
#[derive(Debug, Error)]
pub enum AttachError {
    /// A routing table names a processor type the registry does not know
    #[error(
        "Unregistered processor type '{type_name}' (routed field: '{field}').\n\
         \n\
         Register it on the registry builder or remove it from attachments_by_type."
    )]
    UnregisteredType {
        /// Processor type name that was looked up
        type_name: String,
        /// First field key routed to that type
        field: String,
    },

    /// The same body field is routed to more than one processor type
    #[error("Field '{field}' is routed to both '{first_type}' and '{second_type}'")]
    DuplicateRoute {
        /// Body field key
        field: String,
        /// Type the field was first routed to
        first_type: String,
        /// Conflicting type
        second_type: String,
    },

    /// A zip table references a field that no processor type routes
    #[error(
        "Zip output '{output_key}' references '{input_key}', which is not routed to any processor type"
    )]
    ZipInputNotRouted {
        /// Output key of the zip entry
        output_key: String,
        /// Unrouted input key
        input_key: String,
    },

    /// A zip input has no processed attachment to read from
    #[error(
        "Zip output '{output_key}' needs 'attachments.{input_key}', but the body did not provide '{input_key}'"
    )]
    MissingZipInput {
        /// Output key of the zip entry
        output_key: String,
        /// Input key without its namespace prefix
        input_key: String,
    },

    /// A processor received an element it cannot handle
    #[error("Processor '{type_name}' expected {expected} at index {index}, found {found}")]
    InvalidElement {
        /// Processor type name
        type_name: String,
        /// Position of the element in the normalized sequence
        index: usize,
        /// Expected JSON type
        expected: &'static str,
        /// JSON type actually found
        found: &'static str,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AttachError>;
