//! OJS native XML export reader.
//!
//! Reads the handful of fields the metadata needs from a single-article export
//! of Open Journal Systems.
//!
//! # Example
//!
//! ```
//! use ojs_meta::OjsXmlParser;
//!
//! let input = r#"<?xml version="1.0" encoding="utf-8"?>
//! <article xmlns="http://pkp.sfu.ca">
//!   <publication><title locale="en">Example Title</title></publication>
//! </article>"#;
//!
//! let document = OjsXmlParser::new().parse(input).unwrap();
//! assert_eq!(
//!     document.publication.unwrap().title.as_deref(),
//!     Some("Example Title")
//! );
//! ```

mod parse;
pub mod structure;

use crate::Result;
use crate::ojs::parse::parse_ojs_xml;
pub use crate::ojs::structure::{OjsAuthor, OjsDocument, OjsPublication};
use std::path::Path;

/// Parser for OJS article exports.
#[derive(Debug, Default, Clone)]
pub struct OjsXmlParser {}

impl OjsXmlParser {
    /// Creates a new OJS XML parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use ojs_meta::OjsXmlParser;
    /// let parser = OjsXmlParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the XML text of one article export.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::InvalidFormat` if the input is empty or not
    /// well-formed XML. Missing elements are not errors at this stage.
    pub fn parse(&self, input: &str) -> Result<OjsDocument> {
        parse_ojs_xml(input)
    }

    /// Reads and parses an export file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<OjsDocument> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content)
    }
}
