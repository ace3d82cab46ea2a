//! Schema references
//!
//! A builder only records where the schema lives. The reference is checked
//! for shape when the app is built; reading and parsing the schema belong to
//! the engine.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Extension expected on schema files
pub const SCHEMA_EXTENSION: &str = "teo";

/// Default schema file name used when a host does not pick one
pub const DEFAULT_SCHEMA_FILE: &str = "schema.teo";

/// A validated schema location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    source: String,
}

impl SchemaRef {
    /// Validate a raw reference
    ///
    /// The reference must be non-blank, free of NUL bytes, and when it has a
    /// file extension, that extension must be `.teo`.
    pub fn parse(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(Error::schema("schema reference is empty", Some(source)));
        }
        if source.contains('\0') {
            return Err(Error::schema("schema reference contains a NUL byte", Some(source)));
        }
        if let Some(ext) = Path::new(source).extension().and_then(|e| e.to_str()) {
            if ext != SCHEMA_EXTENSION {
                return Err(Error::schema(
                    format!("expected a .{} file, got .{}", SCHEMA_EXTENSION, ext),
                    Some(source),
                ));
            }
        }
        Ok(Self {
            source: source.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for SchemaRef {
    fn default() -> Self {
        Self {
            source: DEFAULT_SCHEMA_FILE.to_string(),
        }
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_teo_files_and_bare_identifiers() {
        assert_eq!(SchemaRef::parse("schema.teo").unwrap().as_str(), "schema.teo");
        assert!(SchemaRef::parse("config/app.teo").is_ok());
        assert!(SchemaRef::parse("main").is_ok());
    }

    #[test]
    fn test_rejects_bad_references() {
        for bad in ["", "   ", "schema.json", "a\0b.teo"] {
            let err = SchemaRef::parse(bad).unwrap_err();
            assert!(matches!(err, Error::Schema { .. }), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_default_is_schema_teo() {
        assert_eq!(SchemaRef::default().to_string(), DEFAULT_SCHEMA_FILE);
    }
}
