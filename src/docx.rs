//! Extraction of PDF hyperlinks from `.docx` packages.
//!
//! A `.docx` file is a zip package. Only two entries matter here:
//! `word/_rels/document.xml.rels`, which maps relationship ids to targets,
//! and `word/document.xml`, which carries the paragraph runs and hyperlink
//! elements. Both are streamed with `quick-xml` rather than materialized as
//! a DOM.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use percent_encoding::percent_decode_str;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::domain::Hyperlink;

/// Error extracting hyperlinks from a document.
///
/// Any of these is fatal to the run: a document that cannot be opened or
/// parsed produces no output at all.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The document file could not be read.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a readable zip package, or a required entry is
    /// absent.
    #[error("not a readable .docx package: {0}")]
    Package(#[from] zip::result::ZipError),
    /// An XML part of the package is malformed.
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Extracts the ordered sequence of PDF hyperlinks from a `.docx` document.
///
/// Document order is preserved and duplicates are kept. Targets are
/// percent-decoded and separator-normalized before the case-insensitive
/// `.pdf` suffix test. A document containing no matching hyperlinks yields
/// an empty vector; that is not an error.
///
/// # Errors
///
/// Returns [`ExtractError`] when the file cannot be opened, is not a zip
/// package, lacks the expected entries, or contains malformed XML.
pub fn extract_links(document: &Path) -> Result<Vec<Hyperlink>, ExtractError> {
    let file = File::open(document)?;
    let mut package = zip::ZipArchive::new(BufReader::new(file))?;

    let relationships = parse_relationships(&read_entry(
        &mut package,
        "word/_rels/document.xml.rels",
    )?)?;
    let body = read_entry(&mut package, "word/document.xml")?;
    parse_hyperlinks(&body, &relationships)
}

fn read_entry(
    package: &mut zip::ZipArchive<BufReader<File>>,
    name: &str,
) -> Result<String, ExtractError> {
    let mut entry = package.by_name(name)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Collects the relationship id → target mapping from the rels part.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attribute in element.attributes().flatten() {
                    match attribute.key.as_ref() {
                        b"Id" => id = Some(attribute.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attribute.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

/// A hyperlink element currently being read: its relationship id and the
/// run text collected so far.
struct PendingLink {
    id: Option<String>,
    text: String,
}

fn parse_hyperlinks(
    xml: &str,
    relationships: &HashMap<String, String>,
) -> Result<Vec<Hyperlink>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut links = Vec::new();
    let mut pending: Option<PendingLink> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"w:hyperlink" => {
                    pending = Some(PendingLink {
                        id: relationship_id(&element),
                        text: String::new(),
                    });
                }
                b"w:t" if pending.is_some() => in_text = true,
                _ => {}
            },
            Event::Empty(element) if element.name().as_ref() == b"w:hyperlink" => {
                push_if_pdf(
                    PendingLink {
                        id: relationship_id(&element),
                        text: String::new(),
                    },
                    relationships,
                    &mut links,
                );
            }
            Event::Text(text) if in_text => {
                if let Some(link) = pending.as_mut() {
                    let decoded = text.decode().map_err(quick_xml::Error::from)?;
                    let unescaped =
                        quick_xml::escape::unescape(&decoded).map_err(quick_xml::Error::from)?;
                    link.text.push_str(&unescaped);
                }
            }
            Event::End(element) => match element.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:hyperlink" => {
                    if let Some(link) = pending.take() {
                        push_if_pdf(link, relationships, &mut links);
                    }
                    in_text = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(links)
}

fn relationship_id(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attribute| attribute.key.as_ref() == b"r:id")
        .map(|attribute| String::from_utf8_lossy(&attribute.value).into_owned())
}

fn push_if_pdf(
    pending: PendingLink,
    relationships: &HashMap<String, String>,
    links: &mut Vec<Hyperlink>,
) {
    let Some(target) = pending.id.as_deref().and_then(|id| relationships.get(id)) else {
        return;
    };
    let link = Hyperlink::new(pending.text, normalize_target(target));
    if link.is_pdf() {
        links.push(link);
    }
}

/// Percent-decodes a relationship target and normalizes separators to `/`.
fn normalize_target(raw: &str) -> String {
    percent_decode_str(raw.trim())
        .decode_utf8_lossy()
        .replace('\\', "/")
}
