//! PPTX reader used to inspect produced decks.

use deckgen_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Summary of a PPTX file: its slides in presentation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectedDeck {
    pub slides: Vec<InspectedSlide>,
}

impl InspectedDeck {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// First text shape of every slide, top-most first.
    pub fn titles(&self) -> Vec<&str> {
        self.slides.iter().map(InspectedSlide::title).collect()
    }

    pub fn picture_count(&self) -> usize {
        self.slides.iter().map(|s| s.pictures).sum()
    }
}

/// Text shapes and picture count of one slide.
#[derive(Debug, Clone, Serialize)]
pub struct InspectedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Text of each non-empty shape, ordered top-to-bottom then left-to-right.
    pub texts: Vec<String>,

    pub pictures: usize,
}

impl InspectedSlide {
    pub fn title(&self) -> &str {
        self.texts.first().map(String::as_str).unwrap_or_default()
    }
}

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<InspectedDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut deck = InspectedDeck::default();
        for (idx, slide_path) in self.get_slide_order(&mut archive)?.iter().enumerate() {
            deck.slides.push(self.parse_slide(&mut archive, slide_path, idx + 1)?);
        }

        log::debug!("Inspected {} slides", deck.slide_count());
        Ok(deck)
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attr_value(e, b"Type").unwrap_or_default();
                    let target = attr_value(e, b"Target").unwrap_or_default();
                    let id = attr_value(e, b"Id").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        let order = extract_slide_number(&id).or_else(|| extract_slide_number(&target));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<InspectedSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let (mut shapes, pictures) = extract_shapes(&content);

        shapes.sort_by(|a, b| {
            a.y.cmp(&b.y).then(a.x.cmp(&b.x))
        });

        Ok(InspectedSlide {
            number,
            texts: shapes.into_iter().map(|s| s.text).collect(),
            pictures,
        })
    }

    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::PptxParse(format!("Part not found '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::PptxParse(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    x: i64,
    y: i64,
}

/// Collect text shapes with their offsets, and count pictures.
fn extract_shapes(xml_content: &str) -> (Vec<ShapeInfo>, usize) {
    let mut shapes = Vec::new();
    let mut pictures = 0;
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut current: Option<ShapeInfo> = None;
    let mut in_paragraph = false;
    let mut paragraphs: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current = Some(ShapeInfo::default());
                    paragraphs.clear();
                }
                b"pic" => pictures += 1,
                b"off" => read_offset(e, current.as_mut()),
                b"p" if current.is_some() => {
                    in_paragraph = true;
                    paragraphs.push(String::new());
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"off" => read_offset(e, current.as_mut()),
                b"pic" => pictures += 1,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_paragraph => {
                if let (Ok(text), Some(last)) = (e.unescape(), paragraphs.last_mut()) {
                    last.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(mut shape) = current.take() {
                        shape.text = paragraphs.join("\n").trim().to_string();
                        if !shape.text.is_empty() {
                            shapes.push(shape);
                        }
                    }
                    in_paragraph = false;
                }
                b"p" => in_paragraph = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                break;
            }
            _ => {}
        }
    }

    (shapes, pictures)
}

fn read_offset(e: &BytesStart<'_>, shape: Option<&mut ShapeInfo>) {
    let Some(shape) = shape else {
        return;
    };
    if let Some(x) = attr_value(e, b"x").and_then(|v| v.parse().ok()) {
        shape.x = x;
    }
    if let Some(y) = attr_value(e, b"y").and_then(|v| v.parse().ok()) {
        shape.y = y;
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_extract_shapes_orders_by_position() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:spPr><a:xfrm><a:off x="0" y="500"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Body</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:spPr><a:xfrm><a:off x="0" y="100"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Head</a:t></a:r><a:r><a:t>line</a:t></a:r></a:p></p:txBody></p:sp>
            <p:pic><p:spPr><a:xfrm><a:off x="0" y="900"/></a:xfrm></p:spPr></p:pic>
            </p:spTree></p:cSld></p:sld>"#;

        let (mut shapes, pictures) = extract_shapes(xml);
        shapes.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));

        assert_eq!(pictures, 1);
        let texts: Vec<&str> = shapes.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Headline", "Body"]);
    }
}
