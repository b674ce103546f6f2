//! Affiliation footnotes for the LaTeX author block.
//!
//! Rendering happens in two phases. [`FootnoteAssignment::from_records`] labels
//! every distinct organization in order of first appearance (authors first,
//! then each author's affiliations). [`render_author_block`] then folds over the
//! authors, defining each footnote inline where its label is first referenced
//! and pointing back to it with `\footref` afterwards.

use crate::AuthorRecord;
use crate::utils::{escape_latex, escape_url};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One labelled organization and the authors affiliated with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteEntry {
    pub organization: String,
    pub label: CompactString,
    /// Author names in document order
    pub authors: Vec<String>,
}

/// Organization to footnote label mapping for one document.
///
/// Organizations are compared as exact, case-sensitive strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteAssignment {
    entries: Vec<FootnoteEntry>,
}

impl FootnoteAssignment {
    /// Labels all organizations of the given authors.
    pub fn from_records(records: &[AuthorRecord]) -> Self {
        let mut entries: Vec<FootnoteEntry> = Vec::new();
        for record in records {
            for affiliation in &record.affiliation {
                let organization = &affiliation.organization;
                match entries.iter_mut().find(|e| &e.organization == organization) {
                    Some(entry) => entry.authors.push(record.name.clone()),
                    None => {
                        let label = footnote_label(entries.len());
                        debug!(%organization, %label, "Assigned footnote label");
                        entries.push(FootnoteEntry {
                            organization: organization.clone(),
                            label,
                            authors: vec![record.name.clone()],
                        });
                    }
                }
            }
        }
        Self { entries }
    }

    /// Label of an organization, if any author is affiliated with it.
    pub fn label_for(&self, organization: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.organization == organization)
            .map(|e| e.label.as_str())
    }

    /// All entries in label order.
    pub fn entries(&self) -> &[FootnoteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The label for the organization at `index`: `a`..`z`, then `aa`, `ab`, ...
pub fn footnote_label(index: usize) -> CompactString {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    letters.into_iter().rev().collect()
}

/// Renders the LaTeX author block as a pandoc raw `latex` code block.
pub fn render_author_block(records: &[AuthorRecord]) -> String {
    let assignment = FootnoteAssignment::from_records(records);

    let (_, body) = records.iter().enumerate().fold(
        (HashSet::new(), String::new()),
        |(mut used, mut body), (index, record)| {
            body.push_str(&render_author(record, index == 0, &assignment, &mut used));
            (used, body)
        },
    );

    format!("```{{=latex}}\n{body}```\n")
}

fn render_author<'a>(
    record: &AuthorRecord,
    is_first: bool,
    assignment: &'a FootnoteAssignment,
    used: &mut HashSet<&'a str>,
) -> String {
    let mut fragment = String::new();
    if is_first {
        fragment.push_str(r"\vspace{\baselineskip}");
    }
    fragment.push_str(&format!(r"\noindent\textbf{{{}}}", escape_latex(&record.name)));

    for (position, affiliation) in record.affiliation.iter().enumerate() {
        let Some(label) = assignment.label_for(&affiliation.organization) else {
            continue;
        };
        if position > 0 {
            fragment.push_str(r"\textsuperscript{,}");
        }
        if used.insert(label) {
            fragment.push_str(&format!(
                r"\footnote{{\label{{affil:{label}}}{}}}",
                escape_latex(&affiliation.organization)
            ));
        } else {
            fragment.push_str(&format!(r"\footref{{affil:{label}}}"));
        }
    }

    if let Some(orcid) = &record.orcid {
        fragment.push_str(&format!(r" \orcidlink{{{}}}", escape_latex(orcid)));
    }
    fragment.push_str(&format!(
        "\\\\\n\\href{{mailto:{}}}{{\\texttt{{{}}}}}\\par\n\n",
        escape_url(&record.email),
        escape_latex(&record.email)
    ));
    fragment
}
