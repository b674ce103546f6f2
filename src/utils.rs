use crate::regex::Regex;
use itertools::Itertools;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use scraper::Html;
use std::sync::LazyLock;
use tracing::warn;

/// Unicode whitespace spelled out, so `regex` and `regex-lite` collapse the same runs.
static WHITESPACE_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\t\n\x0B\x0C\r\x1C-\x1F \x{85}\x{A0}\x{1680}\x{2000}-\x{200A}",
        r"\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}]{2,}",
    ))
    .unwrap()
});

static EMPHASIS_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<em>|</em>").unwrap());

static BOLD_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<b>|</b>").unwrap());

/// Longest entity reference (including `&` and `;`) worth trying to resolve.
const MAX_ENTITY_LEN: usize = 40;

/// Cleans text coming from OJS (titles, abstracts, keywords) of HTML.
///
/// Entities are decoded, line breaks and tabs removed, whitespace runs collapsed,
/// `<em>` and `<b>` rewritten to `*…*` and `**…**`, and any other tag dropped
/// while keeping its text. Never fails; the result may be empty.
///
/// # Arguments
///
/// * `input` - The raw text from the export
pub fn sanitize_html(input: &str) -> String {
    let text = decode_entities(input);
    let text = text.replace(['\n', '\t'], "");
    let text = WHITESPACE_RUN_REGEX.replace_all(&text, " ");
    let text = EMPHASIS_TAG_REGEX.replace_all(&text, "*");
    let text = BOLD_TAG_REGEX.replace_all(&text, "**");

    if !text.contains('<') && !text.contains('&') {
        return text.into_owned();
    }
    Html::parse_fragment(&text)
        .root_element()
        .text()
        .collect::<String>()
}

/// Decodes HTML entity references, leaving anything unrecognised untouched.
pub(crate) fn decode_entities(input: &str) -> String {
    let mut decoded = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let resolved = tail
            .find(';')
            .filter(|&end| end < MAX_ENTITY_LEN)
            .and_then(|end| {
                unescape_with(&tail[..=end], resolve_html5_entity)
                    .ok()
                    .map(|text| (text.into_owned(), end))
            });
        match resolved {
            Some((text, end)) => {
                decoded.push_str(&text);
                rest = &tail[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// How much of a given name to abbreviate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbreviationStyle {
    /// Keep the first part, abbreviate the rest: "Adam Susan" → "Adam S."
    Light,
    /// Abbreviate every part: "Adam Susan" → "A. S."
    Full,
}

/// Abbreviates a (possibly multi-part) given name to initials.
///
/// An empty given name is logged and yields an empty string.
pub fn format_given_name(given_name: &str, style: AbbreviationStyle) -> String {
    let parts = given_name.split_whitespace().collect_vec();
    match (parts.as_slice(), style) {
        ([], _) => {
            warn!("Given name field seems to be empty");
            String::new()
        }
        ([single], AbbreviationStyle::Light) => single.to_string(),
        ([first, rest @ ..], AbbreviationStyle::Light) => {
            std::iter::once(first.to_string())
                .chain(rest.iter().map(|part| initial(part)))
                .join(" ")
        }
        (all, AbbreviationStyle::Full) => all.iter().map(|part| initial(part)).join(" "),
    }
}

fn initial(part: &str) -> String {
    part.chars()
        .next()
        .map(|c| format!("{c}."))
        .unwrap_or_default()
}

/// Parses `LASTNAME=ORCID` pairs given on the command line.
///
/// Malformed pairs are logged and skipped. Order of first appearance is kept;
/// repeating a last name replaces its ORCID.
pub fn parse_orcid_pairs<S: AsRef<str>>(pairs: &[S]) -> Vec<(String, String)> {
    let mut parsed: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let pair = pair.as_ref();
        match pair.split('=').collect_vec().as_slice() {
            [name, orcid] => {
                let (name, orcid) = (name.trim().to_string(), orcid.trim().to_string());
                match parsed.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(entry) => entry.1 = orcid,
                    None => parsed.push((name, orcid)),
                }
            }
            _ => warn!(pair, "Something went wrong when splitting ORCID pair, ignoring it"),
        }
    }
    parsed
}

/// Extracts the bare identifier from an ORCID URL such as
/// `https://orcid.org/0000-0002-5943-2305`.
pub fn orcid_from_url(url: &str) -> Option<String> {
    url.trim()
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Escapes `%` and `#` in a URL argument of `\href`.
pub fn escape_url(url: &str) -> String {
    url.replace('%', r"\%").replace('#', r"\#")
}

/// Escapes the characters LaTeX treats specially in running text.
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}
