//! Limits and constraints for schema set processing
//!
//! These bound the resources a single parse session may use: file sizes,
//! XML nesting, the length of the import/include chain and the size of the
//! merged component table.

use crate::error::{Error, Result};

/// Resource limits for a parse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum XML element nesting inside one schema document
    pub max_xml_depth: usize,

    /// Maximum schema file size in bytes
    pub max_xml_size: usize,

    /// Maximum length of the import/include/redefine chain
    pub max_schema_depth: usize,

    /// Maximum number of components in the merged table
    pub max_schema_components: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_schema_depth: 100,
            max_schema_components: 100_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_schema_depth: 20,
            max_schema_components: 10_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10_000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_schema_depth: 1000,
            max_schema_components: 1_000_000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the schema reference chain is within limits
    pub fn check_schema_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(Error::LimitExceeded(format!(
                "Schema depth {} exceeds maximum {}",
                depth, self.max_schema_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of schema components is within limits
    pub fn check_schema_components(&self, count: usize) -> Result<()> {
        if count > self.max_schema_components {
            Err(Error::LimitExceeded(format!(
                "Schema component count {} exceeds maximum {}",
                count, self.max_schema_components
            )))
        } else {
            Ok(())
        }
    }
}
