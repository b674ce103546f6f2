use serde::{Deserialize, Serialize};

/// Raw data read from an OJS article export, before any cleanup.
///
/// `None` means the element was absent; `Some("")` means it was present but
/// carried no text. Callers rely on the difference to choose between the two
/// kinds of sentinel values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OjsDocument {
    /// Text of the root-level `<id type="internal">`
    pub internal_id: Option<String>,
    /// The first `<publication>` of the export
    pub publication: Option<OjsPublication>,
}

/// Fields of a `<publication>` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OjsPublication {
    /// Text of `<id type="doi">`
    pub doi: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub abstract_text: Option<String>,
    /// First `<volume>` anywhere below the publication
    pub volume: Option<String>,
    /// `<keyword>` texts of the first `<keywords>` node
    pub keywords: Option<Vec<String>>,
    /// `<author>` children of the first `<authors>` node
    pub authors: Option<Vec<OjsAuthor>>,
}

/// Fields of an `<author>` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OjsAuthor {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Texts of every `<affiliation>` node, in document order
    pub affiliations: Vec<String>,
    pub email: Option<String>,
    /// ORCID as exported, usually a full `https://orcid.org/...` URL
    pub orcid: Option<String>,
}
