//! Metadata assembly.
//!
//! [`MetadataAssembler`] walks one parsed export, runs every field through the
//! sanitizer, title splitter and author builder, and fills the output mapping in
//! its fixed key order. Optional fields that are missing get a named sentinel and
//! a warning; missing mandatory data aborts with a [`MetadataError`].

use crate::author::{
    NameStrings, build_author_record, matches_family_name, short_author_list,
};
use crate::footnote::render_author_block;
use crate::ojs::{OjsDocument, OjsPublication, OjsXmlParser};
use crate::output::{Mapping, Value};
use crate::regex::Regex;
use crate::title::split_title;
use crate::utils::{capitalize, decode_entities, parse_orcid_pairs, sanitize_html};
use crate::{AuthorRecord, MetadataError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const NO_TITLE_FOUND: &str = "NO_TITLE_FOUND";
pub const NO_TITLE_FIELD_FOUND_IN_XML: &str = "NO_TITLE_FIELD_FOUND_IN_XML";
pub const NO_ABSTRACT_FOUND: &str = "NO_ABSTRACT_FOUND";
pub const NO_ABSTRACT_FIELD_FOUND_IN_XML: &str = "NO_ABSTRACT_FIELD_FOUND_IN_XML";
pub const NO_ART_ID: &str = "NO_ART_ID";
/// Article id written when the export has no internal id at all.
pub const MISSING_ART_ID: &str = "-999999999";
pub const NO_VOL_NUMBER: &str = "NO_VOL_NUMBER";
pub const NO_VOL_NUMBER_FOUND: &str = "NO_VOL_NUMBER_FOUND";
pub const NO_DOI_FOUND: &str = "NO_DOI_FOUND";
pub const NO_KEYWORDS_FOUND: &str = "NO_KEYWORDS_FOUND";
/// Affiliation symbol style expected by the author templates.
pub const AFFILIATION_SYMBOL: &str = "2";

static YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

/// Years outside this range are accepted but flagged.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<u32> = 2018..=2100;

/// Values supplied by the user rather than read from the export.
///
/// Each of them takes precedence over whatever the export contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Publication year, four digits
    pub year: Option<String>,
    pub volume: Option<String>,
    /// `LASTNAME=ORCID` pairs
    pub orcids: Vec<String>,
    pub doi: Option<String>,
    /// Free text printed at the start of special-issue articles
    pub special_issue: Option<String>,
}

/// The assembled metadata of one article.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    mapping: Mapping,
    authors: Vec<AuthorRecord>,
}

impl Metadata {
    /// The output mapping in its final key order.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// The author records, in document order.
    pub fn authors(&self) -> &[AuthorRecord] {
        &self.authors
    }

    /// Renders the metadata as a YAML document.
    pub fn to_yaml(&self) -> String {
        self.mapping.to_yaml()
    }

    /// Writes the YAML document to `path`, creating missing parent directories.
    ///
    /// The document is rendered completely before the file is created.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = self.to_yaml();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)?;
        info!(path = %path.display(), "Metadata written");
        Ok(())
    }
}

/// Builds [`Metadata`] from OJS article exports.
///
/// # Examples
///
/// ```
/// use ojs_meta::MetadataAssembler;
///
/// let assembler = MetadataAssembler::new()
///     .with_year("2024")
///     .with_volume("5")
///     .with_orcids(["Lovelace=0000-0002-1825-0097"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataAssembler {
    config: AssemblerConfig,
    parser: OjsXmlParser,
}

impl MetadataAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_year(mut self, year: &str) -> Self {
        self.config.year = Some(year.to_string());
        self
    }

    pub fn with_volume(mut self, volume: &str) -> Self {
        self.config.volume = Some(volume.to_string());
        self
    }

    pub fn with_orcids<I, S>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.orcids = pairs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_doi(mut self, doi: &str) -> Self {
        self.config.doi = Some(doi.to_string());
        self
    }

    pub fn with_special_issue(mut self, text: &str) -> Self {
        self.config.special_issue = Some(text.to_string());
        self
    }

    /// Assembles the metadata of an export given as XML text.
    ///
    /// # Errors
    ///
    /// Fails if the XML is malformed, has no `<publication>` or `<authors>`
    /// node, or an author lacks a name or email element.
    pub fn assemble(&self, input: &str) -> Result<Metadata> {
        let document = self.parser.parse(input)?;
        self.assemble_document(&document)
    }

    /// Reads and assembles an export file.
    pub fn assemble_file<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        let document = self.parser.parse_file(path)?;
        self.assemble_document(&document)
    }

    /// Assembles the metadata of an already parsed export.
    pub fn assemble_document(&self, document: &OjsDocument) -> Result<Metadata> {
        let publication = document
            .publication
            .as_ref()
            .ok_or(MetadataError::MissingPublication)?;

        let mut mapping = Mapping::new();
        for (key, value) in [
            ("title", Value::Null),
            ("subtitle", Value::single_quoted("")),
            ("author", Value::Seq(Vec::new())),
            ("keywords", Value::Flow(Vec::new())),
            ("abstract", Value::Null),
            ("author-short", Value::Null),
            ("date", Value::Null),
            ("volume", Value::Null),
            ("doi", Value::Null),
        ] {
            mapping.insert(key, value);
        }

        insert_title(&mut mapping, publication);
        mapping.insert("abstract", Value::Literal(abstract_text(publication)));
        mapping.insert("artid", Value::Int(article_id(document)));
        mapping.insert("volume", Value::Plain(self.volume(publication)));
        insert_keywords(&mut mapping, publication);
        if let Some(year) = self.year() {
            mapping.insert("date", Value::single_quoted(year));
        }
        mapping.insert("doi", Value::SingleQuoted(self.doi(publication)));

        let authors = self.author_records(publication)?;
        mapping.insert("author", Value::Seq(authors.iter().map(author_value).collect()));
        if let Some(short) = short_author_list(&authors) {
            mapping.insert("author-short", Value::SingleQuoted(short));
        }
        if !authors.is_empty() {
            let names = NameStrings::from_records(&authors);
            mapping.insert("name-hdr", Value::SingleQuoted(names.header));
            mapping.insert("author-meta", Value::SingleQuoted(names.meta));
            mapping.insert("name-short", Value::SingleQuoted(names.short));
            mapping.insert("name-long", Value::SingleQuoted(names.long));
        }
        mapping.insert("authorstex", Value::Literal(render_author_block(&authors)));

        if let Some(text) = &self.config.special_issue {
            mapping.insert("specialissue", Value::literal(text));
        }

        debug!(keys = mapping.len(), authors = authors.len(), "Metadata assembled");
        Ok(Metadata { mapping, authors })
    }

    /// The validated year, if one was supplied.
    fn year(&self) -> Option<&str> {
        let year = self.config.year.as_deref()?;
        if !YEAR_REGEX.is_match(year) {
            warn!(
                year,
                "No year was added. The year argument cannot be parsed. Is it really a year with four digits?"
            );
            return None;
        }
        if year.parse::<u32>().is_ok_and(|y| !PLAUSIBLE_YEARS.contains(&y)) {
            warn!(
                year,
                "The year is valid but unusual as a date of publication. Please verify it"
            );
        }
        Some(year)
    }

    fn volume(&self, publication: &OjsPublication) -> String {
        match (self.config.volume.as_deref(), publication.volume.as_deref()) {
            (Some(volume), _) => format!("*{}*", decode_entities(volume)),
            (None, Some("")) => format!("*{NO_VOL_NUMBER}*"),
            (None, Some(volume)) => format!("*{}*", decode_entities(volume)),
            (None, None) => {
                warn!("No volume found in XML or arguments. Replacing with {NO_VOL_NUMBER_FOUND}");
                NO_VOL_NUMBER_FOUND.to_string()
            }
        }
    }

    fn doi(&self, publication: &OjsPublication) -> String {
        if let Some(doi) = &self.config.doi {
            return doi.clone();
        }
        match publication.doi.as_deref().filter(|doi| !doi.is_empty()) {
            Some(doi) => decode_entities(doi),
            None => {
                warn!("No DOI found in XML or arguments. Replacing with {NO_DOI_FOUND}");
                NO_DOI_FOUND.to_string()
            }
        }
    }

    fn author_records(&self, publication: &OjsPublication) -> Result<Vec<AuthorRecord>> {
        let authors = publication
            .authors
            .as_ref()
            .ok_or_else(|| MetadataError::MissingField("authors".to_string()))?;

        // Overrides have to be known before the first record is built.
        let overrides = parse_orcid_pairs(&self.config.orcids);
        let records = authors
            .iter()
            .enumerate()
            .map(|(index, author)| build_author_record(author, index, &overrides))
            .collect::<Result<Vec<_>>>()?;

        for (key, _) in &overrides {
            if !records
                .iter()
                .any(|record| matches_family_name(key, &record.family_name))
            {
                warn!(%key, "ORCID argument does not match any author, ignoring it");
            }
        }
        Ok(records)
    }
}

fn insert_title(mapping: &mut Mapping, publication: &OjsPublication) {
    let Some(raw) = publication.title.as_deref() else {
        warn!("No title field found in XML. Replacing with {NO_TITLE_FIELD_FOUND_IN_XML}");
        mapping.insert("title", Value::single_quoted(NO_TITLE_FIELD_FOUND_IN_XML));
        mapping.insert("title-hdr", Value::single_quoted(NO_TITLE_FIELD_FOUND_IN_XML));
        mapping.insert(
            "title-meta",
            Value::SingleQuoted(format!("{NO_TITLE_FIELD_FOUND_IN_XML}.")),
        );
        return;
    };

    let title = sanitize_html(if raw.is_empty() { NO_TITLE_FOUND } else { raw });
    let element_subtitle = publication
        .subtitle
        .as_deref()
        .filter(|subtitle| !subtitle.is_empty())
        .map(sanitize_html);
    if let Some(subtitle) = &element_subtitle {
        mapping.insert("subtitle", Value::plain(subtitle));
    }

    let parts = split_title(&title);
    if let Some(subtitle) = &parts.subtitle {
        mapping.insert("subtitle", Value::single_quoted(subtitle));
    }
    let subtitle = parts.subtitle.as_deref().or(element_subtitle.as_deref());
    mapping.insert("title", Value::single_quoted(&parts.main));
    mapping.insert("title-hdr", Value::single_quoted(&parts.main));
    mapping.insert("title-meta", Value::SingleQuoted(parts.full_title(subtitle)));
}

fn abstract_text(publication: &OjsPublication) -> String {
    match publication.abstract_text.as_deref() {
        None => {
            warn!("No abstract field found in XML. Replacing with {NO_ABSTRACT_FIELD_FOUND_IN_XML}");
            NO_ABSTRACT_FIELD_FOUND_IN_XML.to_string()
        }
        Some("") => NO_ABSTRACT_FOUND.to_string(),
        Some(text) => sanitize_html(text),
    }
}

fn article_id(document: &OjsDocument) -> String {
    match document.internal_id.as_deref() {
        None => {
            warn!("No article ID found in XML. Replacing with {MISSING_ART_ID}");
            MISSING_ART_ID.to_string()
        }
        Some("") => NO_ART_ID.to_string(),
        Some(id) => decode_entities(id),
    }
}

fn insert_keywords(mapping: &mut Mapping, publication: &OjsPublication) {
    let Some(keywords) = &publication.keywords else {
        warn!("No keywords found in XML. Replacing with {NO_KEYWORDS_FOUND}");
        mapping.insert("keywords", Value::Flow(vec![NO_KEYWORDS_FOUND.to_string()]));
        return;
    };

    let keywords = keywords.iter().map(|k| sanitize_html(k)).collect_vec();
    let tags = keywords
        .iter()
        .map(|keyword| capitalize(keyword.trim()))
        .sorted()
        .map(Value::Plain)
        .collect();
    mapping.insert("keywords", Value::Flow(keywords));
    mapping.insert("tags", Value::Seq(tags));
}

fn author_value(record: &AuthorRecord) -> Value {
    let affiliation = record
        .affiliation
        .iter()
        .map(|a| Value::Map([("organization", Value::plain(&a.organization))].into_iter().collect()))
        .collect();
    let orcid = record.orcid.as_deref().map_or(Value::Null, Value::plain);

    Value::Map(
        [
            ("name", Value::plain(&record.name)),
            ("affiliation", Value::Seq(affiliation)),
            ("affsymb", Value::int(AFFILIATION_SYMBOL)),
            ("email", Value::plain(&record.email)),
            ("orcid", orcid),
        ]
        .into_iter()
        .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    const ARTICLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<article xmlns="http://pkp.sfu.ca" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" locale="en" stage="production">
  <id type="internal" advice="ignore">10432</id>
  <submission_file id="1" stage="proof">
    <name locale="en">galley.pdf</name>
  </submission_file>
  <publication locale="en" version="1" status="3">
    <id type="doi" advice="update">10.33735/phimisci.2024.10432</id>
    <title locale="en">Do Bees Feel? Evidence from &lt;em&gt;Apis mellifera&lt;/em&gt;</title>
    <abstract locale="en">&lt;p&gt;We review the evidence.&lt;/p&gt;</abstract>
    <keywords locale="en">
      <keyword>sentience</keyword>
      <keyword>Animal minds</keyword>
      <keyword>bees</keyword>
    </keywords>
    <authors>
      <author include_in_browse="true" user_group_ref="Author" seq="0" id="1">
        <givenname locale="en">Adam Susan</givenname>
        <familyname locale="en">Smith</familyname>
        <affiliation locale="en">Ruhr University Bochum; University of Tübingen</affiliation>
        <country>DE</country>
        <email>smith@example.org</email>
        <orcid>https://orcid.org/0000-0001-1111-1111</orcid>
      </author>
      <author include_in_browse="true" user_group_ref="Author" seq="1" id="2">
        <givenname locale="en">Jane</givenname>
        <familyname locale="en">Doe</familyname>
        <affiliation locale="en">University of Tübingen</affiliation>
        <email>doe@example.org</email>
      </author>
      <author include_in_browse="true" user_group_ref="Author" seq="2" id="3">
        <givenname locale="en">Thomas</givenname>
        <familyname locale="en">Jurczyk</familyname>
        <affiliation locale="en">Ruhr University Bochum</affiliation>
        <email></email>
        <orcid>https://orcid.org/0000-0009-9999-9999</orcid>
      </author>
    </authors>
    <issue_identification>
      <volume>5</volume>
      <year>2024</year>
    </issue_identification>
  </publication>
</article>"#;

    fn assembler() -> MetadataAssembler {
        MetadataAssembler::new()
            .with_year("2024")
            .with_orcids(["Jurczyk=0000-0002-5943-2305"])
    }

    #[test]
    fn test_assemble_full_article() {
        let metadata = assembler().assemble(ARTICLE).unwrap();

        let expected = concat!(
            "---\n",
            "title: 'Do Bees Feel?'\n",
            "subtitle: 'Evidence from *Apis mellifera*'\n",
            "author:\n",
            "- name: Adam Susan Smith\n",
            "  affiliation:\n",
            "  - organization: Ruhr University Bochum\n",
            "  - organization: University of Tübingen\n",
            "  affsymb: 2\n",
            "  email: smith@example.org\n",
            "  orcid: 0000-0001-1111-1111\n",
            "- name: Jane Doe\n",
            "  affiliation:\n",
            "  - organization: University of Tübingen\n",
            "  affsymb: 2\n",
            "  email: doe@example.org\n",
            "  orcid: null\n",
            "- name: Thomas Jurczyk\n",
            "  affiliation:\n",
            "  - organization: Ruhr University Bochum\n",
            "  affsymb: 2\n",
            "  email: NO_EMAIL_FOUND\n",
            "  orcid: 0000-0002-5943-2305\n",
            "keywords: [sentience, Animal minds, bees]\n",
            "abstract: |-\n",
            "  We review the evidence.\n",
            "author-short: 'Smith et al.'\n",
            "date: '2024'\n",
            "volume: '*5*'\n",
            "doi: '10.33735/phimisci.2024.10432'\n",
            "title-hdr: 'Do Bees Feel?'\n",
            "title-meta: 'Do Bees Feel? Evidence from *Apis mellifera*.'\n",
            "artid: 10432\n",
            "tags:\n",
            "- Animal minds\n",
            "- Bees\n",
            "- Sentience\n",
            "name-hdr: 'Adam S. Smith, Jane Doe, and Thomas Jurczyk'\n",
            "author-meta: 'Adam S. Smith, Jane Doe, Thomas Jurczyk'\n",
            "name-short: 'Smith, A. S., Doe, J., & Jurczyk, T.'\n",
            "name-long: 'Smith, Adam Susan, Jane Doe, and Thomas Jurczyk'\n",
            "authorstex: |\n",
            "  ```{=latex}\n",
            "  \\vspace{\\baselineskip}\\noindent\\textbf{Adam Susan Smith}\\footnote{\\label{affil:a}Ruhr University Bochum}\\textsuperscript{,}\\footnote{\\label{affil:b}University of Tübingen} \\orcidlink{0000-0001-1111-1111}\\\\\n",
            "  \\href{mailto:smith@example.org}{\\texttt{smith@example.org}}\\par\n",
            "\n",
            "  \\noindent\\textbf{Jane Doe}\\footref{affil:b}\\\\\n",
            "  \\href{mailto:doe@example.org}{\\texttt{doe@example.org}}\\par\n",
            "\n",
            "  \\noindent\\textbf{Thomas Jurczyk}\\footref{affil:a} \\orcidlink{0000-0002-5943-2305}\\\\\n",
            "  \\href{mailto:NO_EMAIL_FOUND}{\\texttt{NO\\_EMAIL\\_FOUND}}\\par\n",
            "\n",
            "  ```\n",
            "...\n",
        );
        assert_eq!(metadata.to_yaml(), expected);
        assert_eq!(metadata.authors().len(), 3);
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let first = assembler().assemble(ARTICLE).unwrap().to_yaml();
        let second = assembler().assemble(ARTICLE).unwrap().to_yaml();
        assert_eq!(first, second);
    }

    #[test]
    fn test_assemble_minimal_article() {
        let xml = r#"<article xmlns="http://pkp.sfu.ca">
  <publication>
    <title locale="en"></title>
    <abstract locale="en"/>
    <authors>
      <author>
        <givenname>Jane</givenname>
        <familyname>Doe</familyname>
        <email>doe@example.org</email>
      </author>
    </authors>
  </publication>
</article>"#;

        let metadata = MetadataAssembler::new().assemble(xml).unwrap();
        let mapping = metadata.mapping();
        assert_eq!(
            mapping.get("title"),
            Some(&Value::single_quoted(NO_TITLE_FOUND))
        );
        assert_eq!(
            mapping.get("title-meta"),
            Some(&Value::single_quoted("NO_TITLE_FOUND."))
        );
        assert_eq!(mapping.get("subtitle"), Some(&Value::single_quoted("")));
        assert_eq!(
            mapping.get("abstract"),
            Some(&Value::literal(NO_ABSTRACT_FOUND))
        );
        assert_eq!(mapping.get("artid"), Some(&Value::int(MISSING_ART_ID)));
        assert_eq!(
            mapping.get("volume"),
            Some(&Value::plain(NO_VOL_NUMBER_FOUND))
        );
        assert_eq!(
            mapping.get("keywords"),
            Some(&Value::Flow(vec![NO_KEYWORDS_FOUND.to_string()]))
        );
        assert_eq!(mapping.get("doi"), Some(&Value::single_quoted(NO_DOI_FOUND)));
        assert_eq!(mapping.get("date"), Some(&Value::Null));
        assert_eq!(mapping.get("author-short"), Some(&Value::single_quoted("Doe")));
        assert!(!mapping.contains_key("tags"));
        assert!(!mapping.contains_key("specialissue"));
        assert_eq!(
            mapping.keys().collect::<Vec<_>>(),
            vec![
                "title",
                "subtitle",
                "author",
                "keywords",
                "abstract",
                "author-short",
                "date",
                "volume",
                "doi",
                "title-hdr",
                "title-meta",
                "artid",
                "name-hdr",
                "author-meta",
                "name-short",
                "name-long",
                "authorstex",
            ]
        );

        let yaml = metadata.to_yaml();
        assert!(yaml.contains("artid: -999999999\n"));
        assert!(yaml.contains("keywords: [NO_KEYWORDS_FOUND]\n"));
    }

    #[test]
    fn test_missing_title_and_abstract_nodes() {
        let xml = r#"<article xmlns="http://pkp.sfu.ca">
  <id type="internal"></id>
  <publication>
    <authors/>
    <issue_identification><volume/></issue_identification>
  </publication>
</article>"#;

        let metadata = MetadataAssembler::new().assemble(xml).unwrap();
        let mapping = metadata.mapping();
        assert_eq!(
            mapping.get("title"),
            Some(&Value::single_quoted(NO_TITLE_FIELD_FOUND_IN_XML))
        );
        assert_eq!(
            mapping.get("title-meta"),
            Some(&Value::single_quoted("NO_TITLE_FIELD_FOUND_IN_XML."))
        );
        assert_eq!(
            mapping.get("abstract"),
            Some(&Value::literal(NO_ABSTRACT_FIELD_FOUND_IN_XML))
        );
        assert_eq!(mapping.get("artid"), Some(&Value::int(NO_ART_ID)));
        assert_eq!(mapping.get("volume"), Some(&Value::plain("*NO_VOL_NUMBER*")));
        assert!(!mapping.contains_key("name-hdr"));

        let yaml = metadata.to_yaml();
        assert!(yaml.contains("author: []\n"));
        assert!(yaml.contains("artid: !!int 'NO_ART_ID'\n"));
        assert!(yaml.contains("author-short: null\n"));
    }

    #[test]
    fn test_subtitle_element() {
        let xml = r#"<article xmlns="http://pkp.sfu.ca">
  <publication>
    <title>A Plain Title</title>
    <subtitle>With &lt;b&gt;Subtitle&lt;/b&gt;</subtitle>
    <authors/>
  </publication>
</article>"#;

        let metadata = MetadataAssembler::new().assemble(xml).unwrap();
        let mapping = metadata.mapping();
        assert_eq!(mapping.get("title"), Some(&Value::single_quoted("A Plain Title")));
        assert_eq!(mapping.get("subtitle"), Some(&Value::plain("With **Subtitle**")));
        assert_eq!(
            mapping.get("title-meta"),
            Some(&Value::single_quoted("A Plain Title: With **Subtitle**."))
        );
    }

    #[test]
    fn test_overrides_win() {
        let metadata = MetadataAssembler::new()
            .with_volume("7")
            .with_doi("10.1000/override")
            .with_special_issue("Special issue on minds.\nEdited by someone.")
            .assemble(ARTICLE)
            .unwrap();
        let mapping = metadata.mapping();
        assert_eq!(mapping.get("volume"), Some(&Value::plain("*7*")));
        assert_eq!(mapping.get("doi"), Some(&Value::single_quoted("10.1000/override")));
        assert_eq!(mapping.keys().last(), Some("specialissue"));
        assert!(metadata.to_yaml().ends_with(concat!(
            "specialissue: |-\n",
            "  Special issue on minds.\n",
            "  Edited by someone.\n",
            "...\n",
        )));
    }

    #[test]
    fn test_year_validation() {
        let mapping = |year: &str| {
            MetadataAssembler::new()
                .with_year(year)
                .assemble(ARTICLE)
                .unwrap()
                .mapping()
                .get("date")
                .cloned()
        };
        assert_eq!(mapping("2024"), Some(Value::single_quoted("2024")));
        assert_eq!(mapping("1999"), Some(Value::single_quoted("1999")));
        assert_eq!(mapping("24"), Some(Value::Null));
        assert_eq!(mapping("2024a"), Some(Value::Null));
    }

    #[test]
    #[traced_test]
    fn test_implausible_year_is_kept_with_warning() {
        let metadata = MetadataAssembler::new()
            .with_year("1999")
            .assemble(ARTICLE)
            .unwrap();
        assert_eq!(
            metadata.mapping().get("date"),
            Some(&Value::single_quoted("1999"))
        );
        assert!(logs_contain("unusual as a date of publication"));
        assert!(logs_contain("year=\"1999\""));
    }

    #[test]
    #[traced_test]
    fn test_unmatched_orcid_override_warns() {
        let metadata = MetadataAssembler::new()
            .with_orcids(["Jurczyk=0000-0002-5943-2305", "Nobody=0000-0003-0000-0000"])
            .assemble(ARTICLE)
            .unwrap();
        assert_eq!(metadata.authors()[2].orcid.as_deref(), Some("0000-0002-5943-2305"));
        assert!(logs_contain("ORCID argument does not match any author"));
        assert!(logs_contain("key=Nobody"));
        assert!(!logs_contain("key=Jurczyk"));
    }

    #[test]
    fn test_fatal_errors() {
        let no_publication = r#"<article xmlns="http://pkp.sfu.ca"><id type="internal">1</id></article>"#;
        assert!(matches!(
            MetadataAssembler::new().assemble(no_publication),
            Err(MetadataError::MissingPublication)
        ));

        let no_authors = r#"<article xmlns="http://pkp.sfu.ca"><publication><title>T</title></publication></article>"#;
        assert!(matches!(
            MetadataAssembler::new().assemble(no_authors),
            Err(MetadataError::MissingField(field)) if field == "authors"
        ));

        let no_email = r#"<article xmlns="http://pkp.sfu.ca"><publication><authors>
            <author><givenname>Jane</givenname><familyname>Doe</familyname></author>
        </authors></publication></article>"#;
        assert!(matches!(
            MetadataAssembler::new().assemble(no_email),
            Err(MetadataError::MissingAuthorField { index: 0, field: "email" })
        ));
    }

    #[test]
    fn test_write_to_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yaml_output").join("metadata.yaml");

        let metadata = assembler().assemble(ARTICLE).unwrap();
        metadata.write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, metadata.to_yaml());
    }
}
