//! Title splitting.
//!
//! Titles exported from OJS frequently carry their subtitle inline, as in
//! `"Minds and Machines: A Survey"` or `"Do Bees Feel? Evidence from Behaviour"`.
//! [`split_title`] separates the two on the first `:` or `?`; only the first
//! separator matters, later ones stay in the subtitle.
//!
//! # Example
//!
//! ```
//! use ojs_meta::{split_title, Separator};
//!
//! let parts = split_title("Do Bees Feel? Evidence from Behaviour");
//! assert_eq!(parts.main, "Do Bees Feel?");
//! assert_eq!(parts.subtitle.as_deref(), Some("Evidence from Behaviour"));
//! assert_eq!(parts.separator, Some(Separator::Question));
//! ```

use crate::regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[:?]").unwrap());

/// The character a subtitle was split off at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Separator {
    /// `:`, dropped from the main title
    Colon,
    /// `?`, kept at the end of the main title
    Question,
}

/// A title split into its main part and optional subtitle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleParts {
    pub main: String,
    pub subtitle: Option<String>,
    /// Separator that was detected, if any
    pub separator: Option<Separator>,
}

impl TitleParts {
    fn whole(title: &str) -> Self {
        Self {
            main: title.to_string(),
            subtitle: None,
            separator: None,
        }
    }

    /// Builds the complete title sentence used in document metadata, e.g.
    /// `"Main: Subtitle."` or `"Question? Subtitle."`.
    ///
    /// `subtitle` is the subtitle to append; callers pass the split subtitle or,
    /// failing that, one supplied separately by the export.
    pub fn full_title(&self, subtitle: Option<&str>) -> String {
        let subtitle = subtitle.filter(|s| !s.is_empty());
        match (self.separator, subtitle) {
            (Some(Separator::Question), Some(subtitle)) => format!("{} {subtitle}.", self.main),
            (Some(Separator::Question), None) => self.main.clone(),
            (_, Some(subtitle)) => format!("{}: {subtitle}.", self.main),
            (_, None) => format!("{}.", self.main),
        }
    }
}

/// Splits a sanitized title into main title and subtitle.
///
/// The title is cut at its first `:` or `?` into (up to) three tokens: the text
/// before, the separator itself and the remainder. Empty tokens are dropped and
/// the rest trimmed.
///
/// - `main`, `?`, `rest`: main keeps the `?`, `rest` is the subtitle
/// - `main`, `:`, `rest`: the `:` is dropped, `rest` is the subtitle
/// - `main`, `?` or `main`, `:`: no subtitle
/// - anything else: the whole title is the main title
///
/// An empty title cannot be split and is logged for manual review, but still
/// yields an (empty) main title.
pub fn split_title(title: &str) -> TitleParts {
    let title = title.trim();
    let tokens = tokenize(title);

    match tokens.as_slice() {
        [main, "?", rest] => TitleParts {
            main: format!("{main}?"),
            subtitle: Some(rest.to_string()),
            separator: Some(Separator::Question),
        },
        [main, ":", rest] => TitleParts {
            main: main.to_string(),
            subtitle: Some(rest.to_string()),
            separator: Some(Separator::Colon),
        },
        [main, "?"] => TitleParts {
            main: format!("{main}?"),
            subtitle: None,
            separator: Some(Separator::Question),
        },
        [main, ":"] => TitleParts {
            main: main.to_string(),
            subtitle: None,
            separator: Some(Separator::Colon),
        },
        _ => {
            if tokens.is_empty() || tokens.len() > 3 {
                warn!(
                    title,
                    tokens = tokens.len(),
                    "There seems to be an issue with the title parsing. Please check manually"
                );
            }
            TitleParts::whole(title)
        }
    }
}

fn tokenize(title: &str) -> Vec<&str> {
    let tokens = match SEPARATOR_REGEX.find(title) {
        Some(m) => vec![&title[..m.start()], m.as_str(), &title[m.end()..]],
        None => vec![title],
    };
    tokens
        .into_iter()
        .filter(|token| !token.is_empty())
        .map(str::trim)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A Plain Title", "A Plain Title", None, None)]
    #[case("Minds: A Survey", "Minds", Some("A Survey"), Some(Separator::Colon))]
    #[case("Minds:A Survey", "Minds", Some("A Survey"), Some(Separator::Colon))]
    #[case("Do Bees Feel? Evidence", "Do Bees Feel?", Some("Evidence"), Some(Separator::Question))]
    #[case("Why Consciousness?", "Why Consciousness?", None, Some(Separator::Question))]
    #[case("Trailing Colon:", "Trailing Colon", None, Some(Separator::Colon))]
    #[case("  Padded: Title  ", "Padded", Some("Title"), Some(Separator::Colon))]
    #[case("First: second: third", "First", Some("second: third"), Some(Separator::Colon))]
    #[case("Is it? Yes: really", "Is it?", Some("Yes: really"), Some(Separator::Question))]
    #[case("Title: Is it? Maybe", "Title", Some("Is it? Maybe"), Some(Separator::Colon))]
    #[case(": Leading separator", ": Leading separator", None, None)]
    #[case("?", "?", None, None)]
    #[case("", "", None, None)]
    fn test_split_title(
        #[case] title: &str,
        #[case] main: &str,
        #[case] subtitle: Option<&str>,
        #[case] separator: Option<Separator>,
    ) {
        let parts = split_title(title);
        assert_eq!(parts.main, main);
        assert_eq!(parts.subtitle.as_deref(), subtitle);
        assert_eq!(parts.separator, separator);
    }

    #[test]
    fn test_main_never_keeps_colon() {
        for title in ["A: B", "A : B", "A:", "A::B"] {
            let parts = split_title(title);
            assert!(!parts.main.ends_with(':'), "{title} -> {}", parts.main);
        }
    }

    #[rstest]
    #[case("Minds: A Survey", None, "Minds: A Survey.")]
    #[case("Do Bees Feel? Evidence", None, "Do Bees Feel? Evidence.")]
    #[case("Why Consciousness?", None, "Why Consciousness?")]
    #[case("Why Consciousness?", Some("A Reply"), "Why Consciousness? A Reply.")]
    #[case("A Plain Title", None, "A Plain Title.")]
    #[case("A Plain Title", Some("With Subtitle"), "A Plain Title: With Subtitle.")]
    #[case("A Plain Title", Some(""), "A Plain Title.")]
    fn test_full_title(
        #[case] title: &str,
        #[case] extra_subtitle: Option<&str>,
        #[case] expected: &str,
    ) {
        let parts = split_title(title);
        let subtitle = parts.subtitle.as_deref().or(extra_subtitle);
        assert_eq!(parts.full_title(subtitle), expected);
    }
}
