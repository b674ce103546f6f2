//! OJS XML parsing implementation.
//!
//! Elements are matched on their local name, so the default `http://pkp.sfu.ca`
//! namespace of OJS exports (or any prefix bound to it) does not matter.

use crate::ojs::structure::{OjsAuthor, OjsDocument, OjsPublication};
use crate::{MetadataError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::BufRead;
use tracing::debug;

/// Parse an OJS article export into its raw [OjsDocument].
///
/// Only the first `<publication>` is read; `<submission_file>` nodes and
/// anything else at the top level except `<id>` are skipped.
pub(crate) fn parse_ojs_xml(content: &str) -> Result<OjsDocument> {
    if content.trim().is_empty() {
        return Err(MetadataError::InvalidFormat("Empty input".into()));
    }

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut document = OjsDocument::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if depth == 1 => match e.local_name().as_ref() {
                b"id" => {
                    let kind = attribute_value(e, b"type")?;
                    let text = extract_text(&mut reader, &mut buf, b"id")?;
                    if kind.as_deref() == Some("internal") && document.internal_id.is_none() {
                        document.internal_id = Some(text);
                    }
                }
                b"publication" if document.publication.is_none() => {
                    document.publication = Some(parse_publication(&mut reader, &mut buf)?);
                }
                _ => {
                    let end = e.to_end().into_owned();
                    debug!(
                        element = %String::from_utf8_lossy(end.local_name().as_ref()),
                        "Skipping top-level element"
                    );
                    reader.read_to_end_into(end.name(), &mut buf)?;
                }
            },
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::Empty(ref e)) if depth == 1 && e.local_name().as_ref() == b"id" => {
                if attribute_value(e, b"type")?.as_deref() == Some("internal")
                    && document.internal_id.is_none()
                {
                    document.internal_id = Some(String::new());
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => return Err(MetadataError::from(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(document)
}

/// Parse the children of a `<publication>` until its closing tag.
fn parse_publication<B: BufRead>(
    reader: &mut Reader<B>,
    buf: &mut Vec<u8>,
) -> Result<OjsPublication> {
    let mut publication = OjsPublication::default();
    // depth 0 means a direct child of <publication>
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Start(ref e)) => match (e.local_name().as_ref(), depth) {
                (b"id", 0) => {
                    let kind = attribute_value(e, b"type")?;
                    let text = extract_text(reader, buf, b"id")?;
                    if kind.as_deref() == Some("doi") && publication.doi.is_none() {
                        publication.doi = Some(text);
                    }
                }
                (b"title", 0) => {
                    let text = extract_text(reader, buf, b"title")?;
                    publication.title.get_or_insert(text);
                }
                (b"subtitle", 0) => {
                    let text = extract_text(reader, buf, b"subtitle")?;
                    publication.subtitle.get_or_insert(text);
                }
                (b"abstract", 0) => {
                    let text = extract_text(reader, buf, b"abstract")?;
                    publication.abstract_text.get_or_insert(text);
                }
                (b"volume", _) => {
                    let text = extract_text(reader, buf, b"volume")?;
                    publication.volume.get_or_insert(text);
                }
                (b"keywords", _) if publication.keywords.is_none() => {
                    publication.keywords = Some(parse_keywords(reader, buf)?);
                }
                (b"authors", _) if publication.authors.is_none() => {
                    publication.authors = Some(parse_authors(reader, buf)?);
                }
                _ => depth += 1,
            },
            Ok(Event::Empty(ref e)) => match (e.local_name().as_ref(), depth) {
                (b"title", 0) => {
                    publication.title.get_or_insert_with(String::new);
                }
                (b"subtitle", 0) => {
                    publication.subtitle.get_or_insert_with(String::new);
                }
                (b"abstract", 0) => {
                    publication.abstract_text.get_or_insert_with(String::new);
                }
                (b"volume", _) => {
                    publication.volume.get_or_insert_with(String::new);
                }
                (b"keywords", _) => {
                    publication.keywords.get_or_insert_with(Vec::new);
                }
                (b"authors", _) => {
                    publication.authors.get_or_insert_with(Vec::new);
                }
                _ => (),
            },
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => {
                return Err(MetadataError::InvalidFormat(
                    "Unexpected EOF inside 'publication'".into(),
                ));
            }
            Err(e) => return Err(MetadataError::from(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(publication)
}

/// Collect the `<keyword>` texts of a `<keywords>` node.
fn parse_keywords<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>) -> Result<Vec<String>> {
    let mut keywords = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"keyword" => {
                keywords.push(extract_text(reader, buf, b"keyword")?);
            }
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"keyword" => {
                keywords.push(String::new());
            }
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => {
                return Err(MetadataError::InvalidFormat(
                    "Unexpected EOF inside 'keywords'".into(),
                ));
            }
            Err(e) => return Err(MetadataError::from(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(keywords)
}

/// Collect the `<author>` children of an `<authors>` node.
fn parse_authors<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>) -> Result<Vec<OjsAuthor>> {
    let mut authors = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Start(ref e)) if depth == 0 && e.local_name().as_ref() == b"author" => {
                authors.push(parse_author(reader, buf)?);
            }
            Ok(Event::Empty(ref e)) if depth == 0 && e.local_name().as_ref() == b"author" => {
                authors.push(OjsAuthor::default());
            }
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => {
                return Err(MetadataError::InvalidFormat(
                    "Unexpected EOF inside 'authors'".into(),
                ));
            }
            Err(e) => return Err(MetadataError::from(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(authors)
}

/// Parse a single `<author>` element.
fn parse_author<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>) -> Result<OjsAuthor> {
    let mut author = OjsAuthor::default();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"givenname" => {
                    let text = extract_text(reader, buf, b"givenname")?;
                    author.given_name.get_or_insert(text);
                }
                b"familyname" => {
                    let text = extract_text(reader, buf, b"familyname")?;
                    author.family_name.get_or_insert(text);
                }
                b"affiliation" => {
                    let text = extract_text(reader, buf, b"affiliation")?;
                    author.affiliations.push(text);
                }
                b"email" => {
                    let text = extract_text(reader, buf, b"email")?;
                    author.email.get_or_insert(text);
                }
                b"orcid" => {
                    let text = extract_text(reader, buf, b"orcid")?;
                    author.orcid.get_or_insert(text);
                }
                _ => depth += 1,
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"givenname" => {
                    author.given_name.get_or_insert_with(String::new);
                }
                b"familyname" => {
                    author.family_name.get_or_insert_with(String::new);
                }
                b"email" => {
                    author.email.get_or_insert_with(String::new);
                }
                _ => (),
            },
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => {
                return Err(MetadataError::InvalidFormat(
                    "Unexpected EOF inside 'author'".into(),
                ));
            }
            Err(e) => return Err(MetadataError::from(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(author)
}

/// Extracts text content from XML events until the closing tag is found.
///
/// Text of nested elements is included; CDATA sections are taken verbatim.
fn extract_text<B: BufRead>(
    reader: &mut Reader<B>,
    buf: &mut Vec<u8>,
    closing_tag: &[u8],
) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Text(e)) => {
                text.push_str(&e.unescape().map_err(|e| {
                    MetadataError::InvalidFormat(format!("Invalid XML text content: {e}"))
                })?);
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => {
                return Err(MetadataError::InvalidFormat(format!(
                    "Unexpected EOF while looking for closing tag '{}'",
                    String::from_utf8_lossy(closing_tag)
                )));
            }
            Err(e) => return Err(MetadataError::from(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}

/// Looks up an attribute by local name.
fn attribute_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
