//! PPTX package writer.

use crate::layout::{self, Frame};
use crate::package::{self, Relationship, SlideXml};
use deckgen_core::{Error, ImageData, Result};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default body text size in points.
pub const DEFAULT_BODY_FONT_PT: u32 = 18;

/// A picture to place on a slide, with its pixel size when known.
#[derive(Debug, Clone)]
pub struct Picture {
    pub data: ImageData,
    pub pixels: Option<(u32, u32)>,
}

/// Everything needed to render one slide.
#[derive(Debug, Clone)]
pub struct SlideContent {
    pub title: String,
    pub body: String,
    pub picture: Option<Picture>,
}

impl SlideContent {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            picture: None,
        }
    }

    pub fn with_picture(mut self, picture: Picture) -> Self {
        self.picture = Some(picture);
        self
    }
}

/// Builds a presentation from scratch. Starts with no slides.
pub struct PptxWriter {
    slides: Vec<SlideContent>,
    body_font_pt: u32,
    title: String,
}

impl PptxWriter {
    /// Create a writer with no slides.
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            body_font_pt: DEFAULT_BODY_FONT_PT,
            title: String::new(),
        }
    }

    pub fn with_body_font_size(mut self, points: u32) -> Self {
        self.body_font_pt = points;
        self
    }

    /// Document title stored in the package properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a slide.
    pub fn add_slide(&mut self, slide: SlideContent) {
        self.slides.push(slide);
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Write the package to a file, replacing any existing one.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        self.write(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Write the package to any seekable sink.
    pub fn write<W: Write + Seek>(&self, sink: W) -> Result<()> {
        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let slide_count = self.slides.len();

        let add = |zip: &mut ZipWriter<W>, name: &str, bytes: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::Zip(format!("Failed to start '{}': {}", name, e)))?;
            zip.write_all(bytes)?;
            Ok(())
        };

        add(&mut zip, "[Content_Types].xml", package::content_types_xml(slide_count).as_bytes())?;
        add(
            &mut zip,
            "_rels/.rels",
            package::relationships_xml(&[
                Relationship::new("rId1", package::REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
                Relationship::new("rId2", package::REL_CORE_PROPS, "docProps/core.xml"),
                Relationship::new("rId3", package::REL_EXTENDED_PROPS, "docProps/app.xml"),
            ])
            .as_bytes(),
        )?;
        add(&mut zip, "docProps/core.xml", package::core_props_xml(&self.title).as_bytes())?;
        add(&mut zip, "docProps/app.xml", package::app_props_xml(slide_count).as_bytes())?;

        // Slides take rId1..rIdN so relationship ids sort in display order.
        let slide_rel_ids: Vec<String> = (1..=slide_count).map(|n| format!("rId{n}")).collect();
        let master_rel_id = format!("rId{}", slide_count + 1);
        let theme_rel_id = format!("rId{}", slide_count + 2);

        let mut presentation_rels: Vec<Relationship> = slide_rel_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                Relationship::new(id.clone(), package::rel_type("slide"), format!("slides/slide{}.xml", i + 1))
            })
            .collect();
        presentation_rels.push(Relationship::new(
            master_rel_id.clone(),
            package::rel_type("slideMaster"),
            "slideMasters/slideMaster1.xml",
        ));
        presentation_rels.push(Relationship::new(theme_rel_id, package::rel_type("theme"), "theme/theme1.xml"));

        add(
            &mut zip,
            "ppt/presentation.xml",
            package::presentation_xml(&master_rel_id, &slide_rel_ids).as_bytes(),
        )?;
        add(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            package::relationships_xml(&presentation_rels).as_bytes(),
        )?;

        add(&mut zip, "ppt/slideMasters/slideMaster1.xml", package::slide_master_xml().as_bytes())?;
        add(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            package::relationships_xml(&[
                Relationship::new("rId1", package::rel_type("slideLayout"), "../slideLayouts/slideLayout1.xml"),
                Relationship::new("rId2", package::rel_type("theme"), "../theme/theme1.xml"),
            ])
            .as_bytes(),
        )?;
        add(&mut zip, "ppt/slideLayouts/slideLayout1.xml", package::slide_layout_xml().as_bytes())?;
        add(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            package::relationships_xml(&[Relationship::new(
                "rId1",
                package::rel_type("slideMaster"),
                "../slideMasters/slideMaster1.xml",
            )])
            .as_bytes(),
        )?;
        add(&mut zip, "ppt/theme/theme1.xml", package::theme_xml().as_bytes())?;

        let mut media_count = 0;
        for (idx, slide) in self.slides.iter().enumerate() {
            let number = idx + 1;
            let mut rels = vec![Relationship::new(
                "rId1",
                package::rel_type("slideLayout"),
                "../slideLayouts/slideLayout1.xml",
            )];

            let picture = match &slide.picture {
                Some(picture) => {
                    media_count += 1;
                    let media_name = format!("image{}.{}", media_count, picture.data.format.extension());
                    add(&mut zip, &format!("ppt/media/{media_name}"), &picture.data.bytes)?;
                    rels.push(Relationship::new(
                        "rId2",
                        package::rel_type("image"),
                        format!("../media/{media_name}"),
                    ));
                    Some(("rId2", layout::fit_picture(picture.pixels)))
                }
                None => None,
            };

            let xml = SlideXml {
                title: &slide.title,
                body: &slide.body,
                body_frame: body_frame(picture.is_some()),
                font_size_hundredths: self.body_font_pt * 100,
                picture,
            }
            .render();

            add(&mut zip, &format!("ppt/slides/slide{number}.xml"), xml.as_bytes())?;
            add(
                &mut zip,
                &format!("ppt/slides/_rels/slide{number}.xml.rels"),
                package::relationships_xml(&rels).as_bytes(),
            )?;
        }

        zip.finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;

        log::debug!("Wrote package with {} slides and {} images", slide_count, media_count);
        Ok(())
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn body_frame(has_picture: bool) -> Frame {
    if has_picture {
        layout::BODY_FRAME_WITH_PICTURE
    } else {
        layout::BODY_FRAME
    }
}
