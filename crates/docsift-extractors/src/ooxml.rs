//! Shared helpers for Office Open XML packages (XLSX, PPTX).

use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Cursor, Read};

use docsift_core::{DocError, DocResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

pub(crate) fn open(content: &[u8]) -> DocResult<Package<'_>> {
    ZipArchive::new(Cursor::new(content))
        .map_err(|e| DocError::parse(format!("Not an Office Open XML package: {}", e)))
}

/// Read a part as UTF-8 text; `Ok(None)` when the part does not exist.
pub(crate) fn read_part(package: &mut Package<'_>, name: &str) -> DocResult<Option<String>> {
    let mut file = match package.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(DocError::parse(format!("Failed to open {}: {}", name, e))),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| DocError::parse(format!("Failed to read {}: {}", name, e)))?;
    Ok(Some(xml))
}

/// Read a part that must exist.
pub(crate) fn require_part(package: &mut Package<'_>, name: &str) -> DocResult<String> {
    read_part(package, name)?.ok_or_else(|| DocError::parse(format!("Missing part {}", name)))
}

pub(crate) fn xml_error(err: impl Display) -> DocError {
    DocError::parse(format!("Malformed XML: {}", err))
}

/// Value of an attribute matched by its local name (prefix ignored).
pub(crate) fn attr(element: &BytesStart<'_>, local: &[u8]) -> DocResult<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        if attribute.key.local_name().as_ref() == local {
            return Ok(Some(attribute.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

/// The prefixed `r:id` attribute that points into a `.rels` part.
///
/// Matched by prefix rather than local name alone, since elements such as
/// `<p:sldId id="256" r:id="rId2"/>` also carry an unprefixed `id`.
pub(crate) fn relationship_id(element: &BytesStart<'_>) -> DocResult<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        if attribute.key.prefix().is_some() && attribute.key.local_name().as_ref() == b"id" {
            return Ok(Some(attribute.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

/// Relationship id -> package path, for the `.rels` part of `base_dir`.
///
/// Relative targets are resolved against `base_dir` (e.g. `xl/`).
pub(crate) fn relationships(xml: &str, base_dir: &str) -> DocResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut map = HashMap::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id")?, attr(&e, b"Target")?) {
                    map.insert(id, resolve_target(base_dir, &target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(map)
}

fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}
