//! PPTX text extraction: slide -> shape -> paragraph -> run.

use docsift_core::DocResult;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::ooxml::{self, relationship_id, xml_error};

/// Extract the text of every slide, one paragraph per line.
///
/// Slides follow the presentation's slide list; when that cannot be read,
/// `ppt/slides/slideN.xml` parts are taken in numeric order.
pub fn read_pptx(content: &[u8]) -> DocResult<String> {
    let mut package = ooxml::open(content)?;

    let mut slides = slide_order(&mut package)?;
    if slides.is_empty() {
        slides = numbered_slides(&package);
    }

    let mut paragraphs = Vec::new();
    for part in slides {
        if let Some(xml) = ooxml::read_part(&mut package, &part)? {
            paragraphs.extend(slide_paragraphs(&xml)?);
        }
    }

    Ok(paragraphs.join("\n"))
}

fn slide_order(package: &mut ooxml::Package<'_>) -> DocResult<Vec<String>> {
    let Some(presentation) = ooxml::read_part(package, "ppt/presentation.xml")? else {
        return Ok(Vec::new());
    };
    let Some(rels) = ooxml::read_part(package, "ppt/_rels/presentation.xml.rels")? else {
        return Ok(Vec::new());
    };
    let rels = ooxml::relationships(&rels, "ppt/")?;

    let mut reader = Reader::from_str(&presentation);
    let mut order = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                if let Some(part) = relationship_id(&e)?.and_then(|id| rels.get(&id).cloned()) {
                    order.push(part);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(order)
}

fn numbered_slides(package: &ooxml::Package<'_>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = package
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort();
    slides.into_iter().map(|(_, name)| name).collect()
}

/// Non-empty `<a:p>` paragraphs of one slide, runs concatenated.
fn slide_paragraphs(xml: &str) -> DocResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"br" => current.push('\n'),
            Event::Text(t) if in_text => current.push_str(&t.unescape().map_err(xml_error)?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
