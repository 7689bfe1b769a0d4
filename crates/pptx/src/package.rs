//! Fixed and generated parts of a PresentationML package.

use crate::layout::{Frame, SLIDE_HEIGHT, SLIDE_WIDTH};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

/// A relationship type under the officeDocument namespace, e.g. `slide`.
pub fn rel_type(kind: &str) -> String {
    format!("{REL_BASE}/{kind}")
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, rel_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            target: target.into(),
        }
    }
}

pub fn relationships_xml(rels: &[Relationship]) -> String {
    let mut xml = format!("{XML_DECL}\n<Relationships xmlns=\"{NS_PKG_RELS}\">");
    for rel in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            escape(&rel.id),
            escape(&rel.rel_type),
            escape(&rel.target)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// `[Content_Types].xml` for a package with `slide_count` slides.
pub fn content_types_xml(slide_count: usize) -> String {
    let mut xml = format!(
        "{XML_DECL}\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"jpeg\" ContentType=\"image/jpeg\"/>\
         <Default Extension=\"png\" ContentType=\"image/png\"/>\
         <Default Extension=\"gif\" ContentType=\"image/gif\"/>\
         <Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
         <Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
         <Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>"
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// `ppt/presentation.xml` referencing the master and the given slide rel ids.
pub fn presentation_xml(master_rel_id: &str, slide_rel_ids: &[String]) -> String {
    let mut xml = format!(
        "{XML_DECL}\n<p:presentation xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\" saveSubsetFonts=\"1\">\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"{master_rel_id}\"/></p:sldMasterIdLst>"
    );
    if !slide_rel_ids.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (i, rel_id) in slide_rel_ids.iter().enumerate() {
            xml.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rel_id));
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(&format!(
        "<p:sldSz cx=\"{SLIDE_WIDTH}\" cy=\"{SLIDE_HEIGHT}\" type=\"screen4x3\"/>\
         <p:notesSz cx=\"{SLIDE_HEIGHT}\" cy=\"{SLIDE_WIDTH}\"/>\
         </p:presentation>"
    ));
    xml
}

pub fn core_props_xml(title: &str) -> String {
    format!(
        "{XML_DECL}\n<cp:coreProperties \
         xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
         xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
         <dc:title>{}</dc:title><dc:creator>deckgen</dc:creator>\
         </cp:coreProperties>",
        escape(title)
    )
}

pub fn app_props_xml(slide_count: usize) -> String {
    format!(
        "{XML_DECL}\n<Properties \
         xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\
         <Application>deckgen</Application><Slides>{slide_count}</Slides>\
         </Properties>"
    )
}

/// Text runs and picture for one slide part.
pub struct SlideXml<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub body_frame: Frame,
    pub font_size_hundredths: u32,
    pub picture: Option<(&'a str, Frame)>,
}

impl SlideXml<'_> {
    pub fn render(&self) -> String {
        let mut xml = format!(
            "{XML_DECL}\n<p:sld xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
             <p:cSld><p:spTree>{}",
            GROUP_PROPS
        );

        xml.push_str(&placeholder_shape(
            2,
            "Title 1",
            r#"<p:ph type="title"/>"#,
            crate::layout::TITLE_FRAME,
            &paragraphs(self.title, None),
        ));
        xml.push_str(&placeholder_shape(
            3,
            "Content Placeholder 2",
            r#"<p:ph idx="1"/>"#,
            self.body_frame,
            &paragraphs(self.body, Some(self.font_size_hundredths)),
        ));

        if let Some((rel_id, frame)) = self.picture {
            xml.push_str(&format!(
                "<p:pic><p:nvPicPr><p:cNvPr id=\"4\" name=\"Picture 3\"/>\
                 <p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
                 <p:blipFill><a:blip r:embed=\"{}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
                 <p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
                escape(rel_id),
                xfrm(frame)
            ));
        }

        xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        xml
    }
}

const GROUP_PROPS: &str = "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>";

fn xfrm(frame: Frame) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn placeholder_shape(id: u32, name: &str, ph: &str, frame: Frame, paragraphs: &str) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>\
         <p:spPr>{}</p:spPr>\
         <p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>",
        xfrm(frame)
    )
}

/// One `<a:p>` per line; `size` is in hundredths of a point. A vertical
/// tab also starts a new line.
fn paragraphs(text: &str, size: Option<u32>) -> String {
    let size_attr = size.map(|s| format!(r#" sz="{s}""#)).unwrap_or_default();
    let text = text.replace('\u{b}', "\n");
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return format!(r#"<a:p><a:endParaRPr lang="en-US"{size_attr}/></a:p>"#);
    }

    lines
        .iter()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!(r#"<a:p><a:endParaRPr lang="en-US"{size_attr}/></a:p>"#)
            } else {
                format!(
                    r#"<a:p><a:r><a:rPr lang="en-US"{size_attr} dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                    escape(line)
                )
            }
        })
        .collect()
}

/// Escape markup characters and encode the control characters XML 1.0
/// forbids as `_xHHHH_`.
fn escape(text: &str) -> String {
    let escaped = quick_xml::escape::escape(text);
    if !escaped.chars().any(is_forbidden_control) {
        return escaped.into_owned();
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        if is_forbidden_control(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn is_forbidden_control(c: char) -> bool {
    c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')
}

pub fn slide_master_xml() -> String {
    format!(
        "{XML_DECL}\n<p:sldMaster xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
         <p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>\
         <p:spTree>{GROUP_PROPS}{}{}</p:spTree></p:cSld>\
         <p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" \
         accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" \
         hlink=\"hlink\" folHlink=\"folHlink\"/>\
         <p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
         <p:txStyles>\
         <p:titleStyle><a:lvl1pPr algn=\"l\"><a:defRPr sz=\"4000\" kern=\"1200\">\
         <a:solidFill><a:schemeClr val=\"tx1\"/></a:solidFill><a:latin typeface=\"+mj-lt\"/>\
         </a:defRPr></a:lvl1pPr></p:titleStyle>\
         <p:bodyStyle><a:lvl1pPr marL=\"0\" indent=\"0\"><a:buNone/><a:defRPr sz=\"1800\" kern=\"1200\">\
         <a:solidFill><a:schemeClr val=\"tx1\"/></a:solidFill><a:latin typeface=\"+mn-lt\"/>\
         </a:defRPr></a:lvl1pPr></p:bodyStyle>\
         <p:otherStyle><a:lvl1pPr><a:defRPr sz=\"1800\"/></a:lvl1pPr></p:otherStyle>\
         </p:txStyles></p:sldMaster>",
        layout_placeholder(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, crate::layout::TITLE_FRAME),
        layout_placeholder(3, "Text Placeholder 2", r#"<p:ph type="body" idx="1"/>"#, crate::layout::BODY_FRAME),
    )
}

pub fn slide_layout_xml() -> String {
    format!(
        "{XML_DECL}\n<p:sldLayout xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\" type=\"obj\" preserve=\"1\">\
         <p:cSld name=\"Title and Content\"><p:spTree>{GROUP_PROPS}{}{}</p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        layout_placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, crate::layout::TITLE_FRAME),
        layout_placeholder(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, crate::layout::BODY_FRAME),
    )
}

fn layout_placeholder(id: u32, name: &str, ph: &str, frame: Frame) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>\
         <p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p>\
         </p:txBody></p:sp>",
        xfrm(frame)
    )
}

pub fn theme_xml() -> String {
    let solid = |c: &str| format!("<a:solidFill><a:schemeClr val=\"{c}\"/></a:solidFill>");
    let line = |w: u32| {
        format!(
            "<a:ln w=\"{w}\" cap=\"flat\" cmpd=\"sng\" algn=\"ctr\">{}<a:prstDash val=\"solid\"/></a:ln>",
            solid("phClr")
        )
    };
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let font = |latin: &str| format!("<a:latin typeface=\"{latin}\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/>");

    format!(
        "{XML_DECL}\n<a:theme xmlns:a=\"{NS_A}\" name=\"Office Theme\"><a:themeElements>\
         <a:clrScheme name=\"Office\">\
         <a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
         <a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
         <a:dk2><a:srgbClr val=\"1F497D\"/></a:dk2><a:lt2><a:srgbClr val=\"EEECE1\"/></a:lt2>\
         <a:accent1><a:srgbClr val=\"4F81BD\"/></a:accent1><a:accent2><a:srgbClr val=\"C0504D\"/></a:accent2>\
         <a:accent3><a:srgbClr val=\"9BBB59\"/></a:accent3><a:accent4><a:srgbClr val=\"8064A2\"/></a:accent4>\
         <a:accent5><a:srgbClr val=\"4BACC6\"/></a:accent5><a:accent6><a:srgbClr val=\"F79646\"/></a:accent6>\
         <a:hlink><a:srgbClr val=\"0000FF\"/></a:hlink><a:folHlink><a:srgbClr val=\"800080\"/></a:folHlink>\
         </a:clrScheme>\
         <a:fontScheme name=\"Office\"><a:majorFont>{}</a:majorFont><a:minorFont>{}</a:minorFont></a:fontScheme>\
         <a:fmtScheme name=\"Office\">\
         <a:fillStyleLst>{s}{s}{s}</a:fillStyleLst>\
         <a:lnStyleLst>{}{}{}</a:lnStyleLst>\
         <a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>\
         <a:bgFillStyleLst>{s}{s}{s}</a:bgFillStyleLst>\
         </a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>",
        font("Calibri"),
        font("Calibri"),
        line(9525),
        line(25400),
        line(38100),
        s = solid("phClr"),
    )
}
