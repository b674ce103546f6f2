//! Convert an OJS (Open Journal Systems) article export into typesetting metadata.
//!
//! `ojs-meta` reads the XML export of a single article and produces the YAML front
//! matter consumed by a pandoc-based typesetting pipeline, including a LaTeX block
//! that lists the authors with footnoted affiliations.
//!
//! # Key Features
//!
//! - **Title handling**: splits an embedded subtitle off the main title on the first
//!   `:` or `?`
//! - **Author records**: names, affiliations (semicolon separated lists are split),
//!   emails and ORCID identifiers, with command-line ORCID overrides
//! - **Name strings**: header, metadata, short and long author lists with
//!   natural-language conjunctions
//! - **Affiliation footnotes**: organizations are deduplicated across authors and
//!   labelled `a`, `b`, ... in order of first appearance
//! - **Stable output**: key order and scalar styles are fixed, so the same input
//!   always renders to the same bytes
//!
//! # Basic Usage
//!
//! ```rust
//! use ojs_meta::MetadataAssembler;
//!
//! let xml = r#"<article xmlns="http://pkp.sfu.ca">
//!   <id type="internal">42</id>
//!   <publication>
//!     <title locale="en">Minds: A Survey</title>
//!     <authors>
//!       <author>
//!         <givenname>Ada</givenname>
//!         <familyname>Lovelace</familyname>
//!         <affiliation>University of London</affiliation>
//!         <email>ada@example.org</email>
//!       </author>
//!     </authors>
//!   </publication>
//! </article>"#;
//!
//! let metadata = MetadataAssembler::new().with_year("2024").assemble(xml).unwrap();
//! let yaml = metadata.to_yaml();
//! assert!(yaml.contains("title: 'Minds'"));
//! assert!(yaml.contains("subtitle: 'A Survey'"));
//! ```
//!
//! # Error Handling
//!
//! Missing mandatory data (the publication node, an author's names or email node)
//! is reported through [`MetadataError`]; missing optional fields are replaced by
//! sentinel values and logged as warnings through `tracing`.

use quick_xml::events::attributes::AttrError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod assemble;
pub mod author;
pub mod footnote;
pub mod ojs;
pub mod output;
mod regex;
pub mod title;
pub mod utils;

// Reexports
pub use assemble::{AssemblerConfig, Metadata, MetadataAssembler};
pub use author::{AuthorPosition, NameStrings};
pub use footnote::{FootnoteAssignment, render_author_block};
pub use ojs::OjsXmlParser;
pub use output::{Mapping, Value};
pub use title::{Separator, TitleParts, split_title};
pub use utils::{AbbreviationStyle, format_given_name, sanitize_html};

/// A specialized Result type for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Represents the fatal errors of a conversion run.
///
/// Everything that can be defaulted is defaulted and logged instead, so each of
/// these aborts the run without writing any output.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("NO_PUBLICATION_DATA_FOUND")]
    MissingPublication,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Author #{index} is missing required field: {field}")]
    MissingAuthorField { index: usize, field: &'static str },
}

impl From<quick_xml::Error> for MetadataError {
    fn from(err: quick_xml::Error) -> Self {
        MetadataError::InvalidFormat(err.to_string())
    }
}

impl From<AttrError> for MetadataError {
    fn from(err: AttrError) -> Self {
        MetadataError::InvalidFormat(err.to_string())
    }
}

/// A single organization an author is affiliated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub organization: String,
}

impl Affiliation {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }
}

/// Represents one author of the article as written to the metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Display name, "Given Family"
    pub name: String,
    /// The author's given name as found in the export
    pub given_name: String,
    /// The author's family name as found in the export
    pub family_name: String,
    /// Affiliations in document order; duplicates are kept
    pub affiliation: Vec<Affiliation>,
    /// Email address, or `NO_EMAIL_FOUND`
    pub email: String,
    /// Bare ORCID identifier without URL prefix
    pub orcid: Option<String>,
}
