//! TOML configuration for the `attach` binary
//!
//! ```toml
//! uploads_folder = "http://localhost:1231/public/uploads"
//! text_fields = ["caption"]
//!
//! [attachments_by_type]
//! images = ["images"]
//! description = ["description"]
//!
//! [to_zip]
//! mis_images = ["images", "description"]
//! ```

use attach_core::{AttachError, AttachmentProcessor, ProcessorRegistry, RoutingTable, ZipTable};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the CLI outside of attachment processing
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading a file failed
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Creating an output file failed
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Configuration file is not valid TOML for [`AttachmentConfig`]
    #[error("Invalid config '{path}': {source}")]
    ConfigParse {
        /// Config file path
        path: PathBuf,
        /// Underlying parse error
        source: toml::de::Error,
    },
    /// Input line or document is not a JSON object
    #[error("Invalid input at line {line}: {reason}")]
    InvalidInput {
        /// 1-based line number (1 for whole-document input)
        line: usize,
        /// What was wrong
        reason: String,
    },
    /// Attachment processing failed
    #[error(transparent)]
    Attach(#[from] AttachError),
}

/// Processor setup loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentConfig {
    /// URL prefix used to build image and thumbnail URLs
    pub uploads_folder: String,
    /// Extra text fields, each registered as a processor of the same name
    #[serde(default)]
    pub text_fields: Vec<String>,
    /// Processor type -> body fields
    pub attachments_by_type: RoutingTable,
    /// Output key -> fields to zip; absent means no zipping
    #[serde(default)]
    pub to_zip: Option<ZipTable>,
}

impl AttachmentConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let contents = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Built-in processors plus one text processor per `text_fields` entry
    pub fn registry(&self) -> ProcessorRegistry {
        self.text_fields
            .iter()
            .fold(
                ProcessorRegistry::builder(self.uploads_folder.as_str()),
                |builder, field| builder.register_text(field.as_str()),
            )
            .build()
    }

    /// Build and validate a bound processor; `zip` selects the zipped entry point
    pub fn processor(&self, zip: bool) -> Result<AttachmentProcessor, CliError> {
        let mut processor =
            AttachmentProcessor::new(self.registry(), self.attachments_by_type.clone());
        if zip {
            if let Some(table) = &self.to_zip {
                processor = processor.with_zip(table.clone());
            }
        }
        processor.validate()?;
        Ok(processor)
    }
}
