//! Author records and author-list name strings.
//!
//! [`build_author_record`] turns one raw `<author>` node into an
//! [`AuthorRecord`](crate::AuthorRecord). [`NameStrings`] accumulates the
//! comma/conjunction joined author lists printed in headers and citations,
//! driven by each author's [`AuthorPosition`].

use crate::ojs::OjsAuthor;
use crate::utils::{AbbreviationStyle, format_given_name, orcid_from_url};
use crate::{Affiliation, AuthorRecord, MetadataError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Placeholder written when an author's email element is empty.
pub const NO_EMAIL_FOUND: &str = "NO_EMAIL_FOUND";

/// Builds the record for one author.
///
/// # Arguments
///
/// * `author` - The raw `<author>` node
/// * `index` - Position of the author in the document, used in error messages
/// * `orcid_overrides` - `(last name, ORCID)` pairs from the command line
///
/// # Errors
///
/// Returns `MetadataError::MissingAuthorField` if the given name, family name
/// or email element is missing. Those are fatal for the whole run.
pub fn build_author_record(
    author: &OjsAuthor,
    index: usize,
    orcid_overrides: &[(String, String)],
) -> Result<AuthorRecord> {
    let given_name = required(author.given_name.as_deref(), index, "givenname")?;
    let family_name = required(author.family_name.as_deref(), index, "familyname")?;

    let orcid = match orcid_override_for(&family_name, orcid_overrides) {
        Some(orcid) => {
            debug!(%family_name, orcid, "Using ORCID from command line");
            Some(orcid.to_string())
        }
        None => author.orcid.as_deref().and_then(orcid_from_url),
    };

    let email = match author.email.as_deref().map(str::trim) {
        None => {
            return Err(MetadataError::MissingAuthorField {
                index,
                field: "email",
            });
        }
        Some("") => {
            warn!(%family_name, "Author has no email address, using {NO_EMAIL_FOUND}");
            NO_EMAIL_FOUND.to_string()
        }
        Some(email) => email.to_string(),
    };

    let affiliation = author
        .affiliations
        .iter()
        .flat_map(|text| text.split(';'))
        .map(str::trim)
        .filter(|organization| !organization.is_empty())
        .map(Affiliation::new)
        .collect();

    Ok(AuthorRecord {
        name: format!("{given_name} {family_name}"),
        given_name,
        family_name,
        affiliation,
        email,
        orcid,
    })
}

fn required(value: Option<&str>, index: usize, field: &'static str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(MetadataError::MissingAuthorField { index, field })
}

/// Whether a command-line ORCID key refers to the given family name.
///
/// The key only has to appear somewhere in the family name, ignoring case, so
/// `jurczyk` matches `Jurczyk` and `Smith` matches `Smith-Jones`.
pub fn matches_family_name(key: &str, family_name: &str) -> bool {
    family_name.to_lowercase().contains(&key.to_lowercase())
}

/// Finds the ORCID override for a family name; the last matching key wins.
pub fn orcid_override_for<'a>(
    family_name: &str,
    orcid_overrides: &'a [(String, String)],
) -> Option<&'a str> {
    orcid_overrides
        .iter()
        .filter(|(key, _)| matches_family_name(key, family_name))
        .map(|(_, orcid)| orcid.as_str())
        .next_back()
}

/// Where an author sits in the author list, which decides how their name is
/// joined onto the names before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorPosition {
    /// The first (or only) author
    First,
    /// Neither first nor last
    Middle,
    /// The last of three or more authors
    LastOfMany,
    /// The second of exactly two authors
    SecondOfTwo,
}

impl AuthorPosition {
    /// Classifies the author at `index` in a list of `count` authors.
    pub fn of(index: usize, count: usize) -> Self {
        let last = count.saturating_sub(1);
        if index > 0 && index < last {
            AuthorPosition::Middle
        } else if index > 0 && index == last && index != 1 {
            AuthorPosition::LastOfMany
        } else if index == 1 && index == last {
            AuthorPosition::SecondOfTwo
        } else {
            AuthorPosition::First
        }
    }

    /// Text placed before this author's name in the header, metadata, short and
    /// long lists, in that order.
    fn joiners(self) -> [&'static str; 4] {
        match self {
            AuthorPosition::First => ["", "", "", ""],
            AuthorPosition::Middle => [", ", ", ", ", ", ", "],
            AuthorPosition::LastOfMany => [", and ", ", ", ", & ", ", and "],
            AuthorPosition::SecondOfTwo => [" and ", ", ", ", & ", ", and "],
        }
    }
}

/// The pre-formatted author lists of an article.
///
/// For "Adam Susan Smith" and "Jane Doe":
///
/// | field | value |
/// |---|---|
/// | `header` | `Adam S. Smith and Jane Doe` |
/// | `meta` | `Adam S. Smith, Jane Doe` |
/// | `short` | `Smith, A. S., & Doe, J.` |
/// | `long` | `Smith, Adam Susan, and Jane Doe` |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameStrings {
    /// Running-header list (`name-hdr`)
    pub header: String,
    /// Document metadata list (`author-meta`)
    pub meta: String,
    /// Citation list with initials (`name-short`)
    pub short: String,
    /// Citation list with full given names (`name-long`)
    pub long: String,
}

impl NameStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one author to every list.
    pub fn push(&mut self, position: AuthorPosition, given_name: &str, family_name: &str) {
        let light = format_given_name(given_name, AbbreviationStyle::Light);
        let full = format_given_name(given_name, AbbreviationStyle::Full);
        let [header, meta, short, long] = position.joiners();

        self.header.push_str(&format!("{header}{light} {family_name}"));
        self.meta.push_str(&format!("{meta}{light} {family_name}"));
        self.short.push_str(&format!("{short}{family_name}, {full}"));
        if position == AuthorPosition::First {
            self.long.push_str(&format!("{family_name}, {given_name}"));
        } else {
            self.long.push_str(&format!("{long}{given_name} {family_name}"));
        }
    }

    /// Builds all lists for the given authors in order.
    pub fn from_records(records: &[AuthorRecord]) -> Self {
        let mut names = Self::new();
        for (index, record) in records.iter().enumerate() {
            names.push(
                AuthorPosition::of(index, records.len()),
                &record.given_name,
                &record.family_name,
            );
        }
        names
    }
}

/// Family-name list for short citations: `"Smith"`, `"Smith and Doe"` or
/// `"Smith et al."`. `None` when there are no authors.
pub fn short_author_list(records: &[AuthorRecord]) -> Option<String> {
    match records {
        [] => None,
        [only] => Some(only.family_name.clone()),
        [first, second] => Some(format!("{} and {}", first.family_name, second.family_name)),
        [first, ..] => Some(format!("{} et al.", first.family_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ojs_author(given: &str, family: &str) -> OjsAuthor {
        OjsAuthor {
            given_name: Some(given.to_string()),
            family_name: Some(family.to_string()),
            affiliations: Vec::new(),
            email: Some(format!("{}@example.org", family.to_lowercase())),
            orcid: None,
        }
    }

    #[test]
    fn test_build_author_record() {
        let author = OjsAuthor {
            affiliations: vec![
                "Ruhr University Bochum; University of Tübingen;".to_string(),
                " ;Max Planck Institute ".to_string(),
            ],
            email: Some(" jurczyk@example.org ".to_string()),
            orcid: Some("https://orcid.org/0000-0001-1111-1111".to_string()),
            ..ojs_author(" Thomas ", " Jurczyk ")
        };

        let record = build_author_record(&author, 0, &[]).unwrap();
        assert_eq!(record.name, "Thomas Jurczyk");
        assert_eq!(
            record.affiliation,
            vec![
                Affiliation::new("Ruhr University Bochum"),
                Affiliation::new("University of Tübingen"),
                Affiliation::new("Max Planck Institute"),
            ]
        );
        assert_eq!(record.email, "jurczyk@example.org");
        assert_eq!(record.orcid.as_deref(), Some("0000-0001-1111-1111"));
    }

    #[test]
    fn test_command_line_orcid_wins() {
        let author = OjsAuthor {
            orcid: Some("https://orcid.org/0000-0001-1111-1111".to_string()),
            ..ojs_author("Thomas", "Jurczyk")
        };
        let overrides = vec![("Jurczyk".to_string(), "0000-0002-5943-2305".to_string())];

        let record = build_author_record(&author, 0, &overrides).unwrap();
        assert_eq!(record.orcid.as_deref(), Some("0000-0002-5943-2305"));
    }

    #[test]
    fn test_orcid_override_matching() {
        let overrides = vec![
            ("smith".to_string(), "0000-0000-0000-0001".to_string()),
            ("Jones".to_string(), "0000-0000-0000-0002".to_string()),
        ];
        assert_eq!(orcid_override_for("Smith", &overrides), Some("0000-0000-0000-0001"));
        assert_eq!(
            orcid_override_for("Smith-Jones", &overrides),
            Some("0000-0000-0000-0002")
        );
        assert_eq!(orcid_override_for("Doe", &overrides), None);
    }

    #[test]
    fn test_empty_email_uses_sentinel() {
        let author = OjsAuthor {
            email: Some("  ".to_string()),
            ..ojs_author("Jane", "Doe")
        };
        let record = build_author_record(&author, 0, &[]).unwrap();
        assert_eq!(record.email, NO_EMAIL_FOUND);
        assert_eq!(record.orcid, None);
    }

    #[rstest]
    #[case(OjsAuthor { given_name: None, ..ojs_author("Jane", "Doe") }, "givenname")]
    #[case(OjsAuthor { family_name: Some(String::new()), ..ojs_author("Jane", "Doe") }, "familyname")]
    #[case(OjsAuthor { email: None, ..ojs_author("Jane", "Doe") }, "email")]
    fn test_missing_required_fields(#[case] author: OjsAuthor, #[case] missing: &str) {
        match build_author_record(&author, 3, &[]) {
            Err(MetadataError::MissingAuthorField { index, field }) => {
                assert_eq!(index, 3);
                assert_eq!(field, missing);
            }
            other => panic!("expected missing {missing}, got {other:?}"),
        }
    }

    #[rstest]
    #[case(0, 1, AuthorPosition::First)]
    #[case(0, 2, AuthorPosition::First)]
    #[case(1, 2, AuthorPosition::SecondOfTwo)]
    #[case(0, 3, AuthorPosition::First)]
    #[case(1, 3, AuthorPosition::Middle)]
    #[case(2, 3, AuthorPosition::LastOfMany)]
    #[case(2, 5, AuthorPosition::Middle)]
    #[case(4, 5, AuthorPosition::LastOfMany)]
    fn test_author_position(
        #[case] index: usize,
        #[case] count: usize,
        #[case] expected: AuthorPosition,
    ) {
        assert_eq!(AuthorPosition::of(index, count), expected);
    }

    #[test]
    fn test_name_strings_single_author() {
        let mut names = NameStrings::new();
        names.push(AuthorPosition::First, "Adam Susan", "Smith");
        assert_eq!(names.header, "Adam S. Smith");
        assert_eq!(names.meta, "Adam S. Smith");
        assert_eq!(names.short, "Smith, A. S.");
        assert_eq!(names.long, "Smith, Adam Susan");
    }

    #[test]
    fn test_name_strings_two_authors() {
        let mut names = NameStrings::new();
        names.push(AuthorPosition::First, "Adam Susan", "Smith");
        names.push(AuthorPosition::SecondOfTwo, "Jane", "Doe");
        assert_eq!(names.header, "Adam S. Smith and Jane Doe");
        assert_eq!(names.meta, "Adam S. Smith, Jane Doe");
        assert_eq!(names.short, "Smith, A. S., & Doe, J.");
        assert_eq!(names.long, "Smith, Adam Susan, and Jane Doe");
    }

    #[test]
    fn test_name_strings_three_authors() {
        let authors = ["Adam Susan Smith", "Jane Doe", "Max Mustermann"]
            .iter()
            .map(|name| {
                let (given, family) = name.rsplit_once(' ').unwrap();
                build_author_record(&ojs_author(given, family), 0, &[]).unwrap()
            })
            .collect::<Vec<_>>();

        let names = NameStrings::from_records(&authors);
        assert_eq!(names.header, "Adam S. Smith, Jane Doe, and Max Mustermann");
        assert_eq!(names.meta, "Adam S. Smith, Jane Doe, Max Mustermann");
        assert_eq!(names.short, "Smith, A. S., Doe, J., & Mustermann, M.");
        assert_eq!(names.long, "Smith, Adam Susan, Jane Doe, and Max Mustermann");
        assert_eq!(short_author_list(&authors).as_deref(), Some("Smith et al."));
        assert_eq!(
            short_author_list(&authors[..2]).as_deref(),
            Some("Smith and Doe")
        );
        assert_eq!(short_author_list(&authors[..1]).as_deref(), Some("Smith"));
        assert_eq!(short_author_list(&[]), None);
    }
}
