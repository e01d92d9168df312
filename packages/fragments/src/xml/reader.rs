//! Streaming event source built on `quick-xml`'s namespace-aware reader.
//!
//! The reader only tokenizes and resolves names; everything downstream sees
//! plain `ContentHandler` callbacks in document order.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName as XmlQName, ResolveResult};
use quick_xml::reader::NsReader;

use super::handler::ContentHandler;
use crate::error::{FragmentError, Result};
use crate::types::{Attribute, QName, StartElement};

/// Parse an in-memory document.
pub fn parse_str<H>(xml: &str, handler: &mut H) -> Result<()>
where
    H: ContentHandler + ?Sized,
{
    drive(NsReader::from_str(xml), handler)
}

/// Parse a document from any buffered reader.
pub fn parse_reader<R, H>(input: R, handler: &mut H) -> Result<()>
where
    R: BufRead,
    H: ContentHandler + ?Sized,
{
    drive(NsReader::from_reader(input), handler)
}

/// Parse a document from a file.
///
/// The file is opened and closed within this call, whether the parse
/// succeeds or not.
pub fn parse_file<H>(path: impl AsRef<Path>, handler: &mut H) -> Result<()>
where
    H: ContentHandler + ?Sized,
{
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Parsing XML file");
    let file = File::open(path)?;
    parse_reader(BufReader::new(file), handler)
}

fn drive<R, H>(mut reader: NsReader<R>, handler: &mut H) -> Result<()>
where
    R: BufRead,
    H: ContentHandler + ?Sized,
{
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut seen_root = false;
    let mut elements: usize = 0;
    let mut pending_text: Option<String> = None;

    handler.start_document()?;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| xml_error(&reader, source))?;

        match event {
            Event::Start(e) => {
                flush_text(&mut pending_text, depth, handler)?;
                if depth == 0 && seen_root {
                    return Err(FragmentError::MultipleRoots(raw_name(e.name())));
                }
                let element = resolve_start(&reader, &e)?;
                depth += 1;
                seen_root = true;
                elements += 1;
                handler.start_element(&element)?;
            }
            Event::End(e) => {
                flush_text(&mut pending_text, depth, handler)?;
                let name = resolve_name(&reader, e.name(), false)?;
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| FragmentError::PathUnderflow(name.to_string()))?;
                handler.end_element(&name)?;
            }
            Event::Text(e) => {
                let raw = utf8(&e)?;
                let text = unescape(raw).map_err(|err| xml_error(&reader, err.into()))?;
                push_text(&mut pending_text, &text);
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                push_text(&mut pending_text, utf8(&bytes)?);
            }
            Event::GeneralRef(e) => {
                let name = utf8(&e)?;
                push_text(&mut pending_text, &resolve_reference(name)?);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DOCTYPE
            // carry no element content.
            _ => {}
        }
        buf.clear();
    }

    flush_text(&mut pending_text, depth, handler)?;

    if depth > 0 {
        return Err(FragmentError::UnexpectedEof { depth });
    }
    if !seen_root {
        return Err(FragmentError::EmptyDocument);
    }

    tracing::debug!(elements, "Finished parsing document");
    handler.end_document()
}

fn xml_error<R>(reader: &NsReader<R>, source: quick_xml::Error) -> FragmentError {
    let position: u64 = reader.buffer_position().try_into().unwrap_or(u64::MAX);
    FragmentError::Xml { position, source }
}

/// Append text to the pending run, normalizing line endings.
fn push_text(pending: &mut Option<String>, text: &str) {
    let text = normalize_line_endings(text);
    match pending {
        Some(existing) => existing.push_str(&text),
        None => *pending = Some(text.into_owned()),
    }
}

/// Deliver the pending text run, if any.
///
/// Text outside the root element must be whitespace and is dropped.
fn flush_text<H>(pending: &mut Option<String>, depth: usize, handler: &mut H) -> Result<()>
where
    H: ContentHandler + ?Sized,
{
    let Some(text) = pending.take() else {
        return Ok(());
    };
    if depth == 0 {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(FragmentError::TextOutsideRoot(text.trim().to_string()));
    }
    if text.is_empty() {
        return Ok(());
    }
    handler.characters(&text)
}

fn resolve_start<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<StartElement> {
    let name = resolve_name(reader, e.name(), false)?;
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, quick_xml::Error::InvalidAttr(err)))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let attr_name = resolve_name(reader, attr.key, true)?;
        let raw = utf8(attr.value.as_ref())?;
        let value = unescape(raw).map_err(|err| xml_error(reader, err.into()))?;
        attributes.push(Attribute::new(attr_name, value.into_owned()));
    }

    Ok(StartElement { name, attributes })
}

fn resolve_name<R>(reader: &NsReader<R>, name: XmlQName<'_>, attribute: bool) -> Result<QName> {
    let (ns, local) = if attribute {
        reader.resolver().resolve_attribute(name)
    } else {
        reader.resolver().resolve_element(name)
    };
    let namespace = match ns {
        ResolveResult::Bound(ns) => utf8(ns.as_ref())?.to_string(),
        ResolveResult::Unbound => String::new(),
        ResolveResult::Unknown(_) => return Err(FragmentError::UnknownPrefix(raw_name(name))),
    };
    Ok(QName::new(namespace, utf8(local.as_ref())?))
}

fn raw_name(name: XmlQName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(reference) = name.strip_prefix('#') {
        let code_point = match reference.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => reference.parse::<u32>().ok(),
        };
        return code_point
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| FragmentError::UnknownEntity(name.to_string()));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| FragmentError::UnknownEntity(name.to_string()))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| FragmentError::Encoding(e.to_string()))
}

/// XML 1.0 section 2.11: `\r\n` and lone `\r` become `\n`.
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
