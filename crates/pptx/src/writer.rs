//! PPTX package writer.
//!
//! Serializes laid-out pages into an Office Open XML presentation: a ZIP
//! archive holding the presentation part, one slide part per page, and the
//! fixed theme, master and blank layout from [`crate::template`].

use crate::layout::{BoxKind, LayoutConfig, PageLayout, TextBox};
use crate::renderer::SlideRenderer;
use crate::template::{self, content_types, parts, rel_types};
use crate::xml::XmlPart;
use slidev_core::{Error, Result, Slide};
use std::borrow::Cow;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// First slide id; ids below 256 are reserved.
const FIRST_SLIDE_ID: usize = 256;

/// Relationship ids `rId1`..`rId5` of the presentation part are taken by
/// the master, theme and property parts.
const FIRST_SLIDE_REL_ID: usize = 6;

/// Writer for PPTX (Office Open XML) presentations.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    renderer: SlideRenderer,
}

impl PptxWriter {
    /// Create a writer with the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with a custom layout.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            renderer: SlideRenderer::with_config(config),
        }
    }

    /// Lay out `slides` and save them to `path`, returning the page count.
    ///
    /// The package is assembled in memory first, so nothing is written when
    /// any step fails.
    pub fn save(&self, slides: &[Slide], path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let bytes = self.write_slides(slides, Cursor::new(Vec::new()))?.into_inner();
        std::fs::write(path, &bytes)?;
        log::info!(
            "Wrote {} ({} slides, {} bytes)",
            path.display(),
            slides.len(),
            bytes.len()
        );
        Ok(slides.len())
    }

    /// Lay out `slides` and write the package to `writer`.
    pub fn write_slides<W: Write + Seek>(&self, slides: &[Slide], writer: W) -> Result<W> {
        let pages = self.renderer.layout_all(slides);
        self.write_pages(&pages, writer)
    }

    /// Write already laid-out pages as a package.
    pub fn write_pages<W: Write + Seek>(&self, pages: &[PageLayout], writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let count = pages.len();

        add_part(&mut zip, options, parts::CONTENT_TYPES, &content_types_xml(count)?)?;
        add_part(&mut zip, options, parts::ROOT_RELS, &root_rels_xml()?)?;
        add_part(&mut zip, options, parts::PRESENTATION, &self.presentation_xml(count)?)?;
        add_part(&mut zip, options, parts::PRESENTATION_RELS, &presentation_rels_xml(count)?)?;

        for (name, content) in template::STATIC_PARTS {
            add_part(&mut zip, options, name, content)?;
        }

        for (idx, page) in pages.iter().enumerate() {
            let number = idx + 1;
            log::debug!("Writing slide {} with {} box(es)", number, page.boxes.len());
            add_part(&mut zip, options, &parts::slide(number), &slide_xml(page)?)?;
            add_part(&mut zip, options, &parts::slide_rels(number), template::SLIDE_RELS_XML)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Generate `ppt/presentation.xml`.
    fn presentation_xml(&self, slide_count: usize) -> Result<String> {
        let config = self.renderer.config();
        let mut xml = XmlPart::new()?;
        xml.start(
            "p:presentation",
            &[
                ("xmlns:a", template::NS_A),
                ("xmlns:r", template::NS_R),
                ("xmlns:p", template::NS_P),
                ("saveSubsetFonts", "1"),
            ],
        )?;

        xml.start("p:sldMasterIdLst", &[])?;
        xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
        xml.end("p:sldMasterIdLst")?;

        if slide_count > 0 {
            xml.start("p:sldIdLst", &[])?;
            for idx in 0..slide_count {
                let id = (FIRST_SLIDE_ID + idx).to_string();
                let rel_id = slide_rel_id(idx);
                xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
            }
            xml.end("p:sldIdLst")?;
        }

        let cx = config.slide_width_emu().to_string();
        let cy = config.slide_height_emu().to_string();
        xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
        xml.end("p:presentation")?;
        xml.finish()
    }
}

/// Relationship id of the slide at `idx` (0-based) in the presentation rels.
fn slide_rel_id(idx: usize) -> String {
    format!("rId{}", FIRST_SLIDE_REL_ID + idx)
}

fn add_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: FileOptions,
    name: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
    zip.write_all(content.as_bytes())
        .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
    Ok(())
}

/// Generate `[Content_Types].xml`.
fn content_types_xml(slide_count: usize) -> Result<String> {
    let mut xml = XmlPart::new()?;
    xml.start("Types", &[("xmlns", template::NS_CONTENT_TYPES)])?;
    xml.empty(
        "Default",
        &[("Extension", "rels"), ("ContentType", content_types::RELATIONSHIPS)],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", content_types::XML)])?;

    let fixed = [
        (parts::PRESENTATION, content_types::PRESENTATION),
        (parts::PRES_PROPS, content_types::PRES_PROPS),
        (parts::VIEW_PROPS, content_types::VIEW_PROPS),
        (parts::TABLE_STYLES, content_types::TABLE_STYLES),
        (parts::THEME, content_types::THEME),
        (parts::SLIDE_MASTER, content_types::SLIDE_MASTER),
        (parts::SLIDE_LAYOUT, content_types::SLIDE_LAYOUT),
    ];
    for (part, content_type) in fixed {
        let part_name = format!("/{}", part);
        xml.empty(
            "Override",
            &[("PartName", part_name.as_str()), ("ContentType", content_type)],
        )?;
    }

    for number in 1..=slide_count {
        let part_name = format!("/{}", parts::slide(number));
        xml.empty(
            "Override",
            &[("PartName", part_name.as_str()), ("ContentType", content_types::SLIDE)],
        )?;
    }

    xml.end("Types")?;
    xml.finish()
}

/// Generate `_rels/.rels`.
fn root_rels_xml() -> Result<String> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", template::NS_PACKAGE_RELS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", rel_types::OFFICE_DOCUMENT),
            ("Target", parts::PRESENTATION),
        ],
    )?;
    xml.end("Relationships")?;
    xml.finish()
}

/// Generate `ppt/_rels/presentation.xml.rels`.
fn presentation_rels_xml(slide_count: usize) -> Result<String> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", template::NS_PACKAGE_RELS)])?;

    let fixed = [
        ("rId1", rel_types::SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        ("rId2", rel_types::THEME, "theme/theme1.xml"),
        ("rId3", rel_types::PRES_PROPS, "presProps.xml"),
        ("rId4", rel_types::VIEW_PROPS, "viewProps.xml"),
        ("rId5", rel_types::TABLE_STYLES, "tableStyles.xml"),
    ];
    for (id, rel_type, target) in fixed {
        xml.empty("Relationship", &[("Id", id), ("Type", rel_type), ("Target", target)])?;
    }

    for idx in 0..slide_count {
        let id = slide_rel_id(idx);
        let target = format!("slides/slide{}.xml", idx + 1);
        xml.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", rel_types::SLIDE), ("Target", target.as_str())],
        )?;
    }

    xml.end("Relationships")?;
    xml.finish()
}

/// Generate a slide part holding the page's text boxes.
fn slide_xml(page: &PageLayout) -> Result<String> {
    let mut xml = XmlPart::new()?;
    xml.start(
        "p:sld",
        &[
            ("xmlns:a", template::NS_A),
            ("xmlns:r", template::NS_R),
            ("xmlns:p", template::NS_P),
        ],
    )?;
    xml.start("p:cSld", &[])?;
    xml.start("p:spTree", &[])?;

    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;

    xml.start("p:grpSpPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.end("a:xfrm")?;
    xml.end("p:grpSpPr")?;

    // Shape id 1 is the group itself.
    for (idx, text_box) in page.boxes.iter().enumerate() {
        write_text_box(&mut xml, text_box, idx + 2)?;
    }

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sld")?;
    xml.finish()
}

fn write_text_box(xml: &mut XmlPart, text_box: &TextBox, shape_id: usize) -> Result<()> {
    let id = shape_id.to_string();
    let label = match text_box.kind {
        BoxKind::Title => "Title",
        BoxKind::Body => "TextBox",
        BoxKind::Code => "Code",
    };
    let name = format!("{} {}", label, shape_id - 1);

    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
    xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    let (x, y) = (text_box.x.to_string(), text_box.y.to_string());
    let (cx, cy) = (text_box.width.to_string(), text_box.height.to_string());
    xml.start("p:spPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end("a:xfrm")?;
    xml.start("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")?;
    xml.empty("a:noFill", &[])?;
    xml.end("p:spPr")?;

    xml.start("p:txBody", &[])?;
    xml.start("a:bodyPr", &[("wrap", "square"), ("rtlCol", "0")])?;
    xml.empty("a:spAutoFit", &[])?;
    xml.end("a:bodyPr")?;
    xml.empty("a:lstStyle", &[])?;
    for paragraph in &text_box.paragraphs {
        write_paragraph(xml, paragraph, text_box)?;
    }
    xml.end("p:txBody")?;
    xml.end("p:sp")
}

fn write_paragraph(xml: &mut XmlPart, text: &str, text_box: &TextBox) -> Result<()> {
    let style = &text_box.style;
    let size = ((style.font_size * 100.0).round() as u32).to_string();

    xml.start("a:p", &[])?;
    if text.is_empty() {
        xml.empty("a:endParaRPr", &[("lang", "en-US"), ("sz", size.as_str()), ("dirty", "0")])?;
        return xml.end("a:p");
    }

    xml.start("a:r", &[])?;
    let mut attrs = vec![("lang", "en-US"), ("sz", size.as_str())];
    if style.bold {
        attrs.push(("b", "1"));
    }
    attrs.push(("dirty", "0"));
    xml.start("a:rPr", &attrs)?;
    xml.start("a:solidFill", &[])?;
    xml.empty("a:srgbClr", &[("val", style.color.as_str())])?;
    xml.end("a:solidFill")?;
    if let Some(typeface) = &style.typeface {
        xml.empty("a:latin", &[("typeface", typeface.as_str())])?;
        xml.empty("a:cs", &[("typeface", typeface.as_str())])?;
    }
    xml.end("a:rPr")?;
    xml.text_element("a:t", &escape_control_chars(text))?;
    xml.end("a:r")?;
    xml.end("a:p")
}

/// Replace control characters that XML 1.0 forbids with `_xHHHH_` text.
fn escape_control_chars(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_illegal_control) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_illegal_control(c) {
            escaped.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}

fn is_illegal_control(c: char) -> bool {
    c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use slidev_core::DeckParser;
    use std::io::Read;
    use zip::ZipArchive;

    /// Extract the local name from a potentially namespaced XML element name.
    fn local_name(name: &[u8]) -> &[u8] {
        if let Some(pos) = name.iter().position(|&b| b == b':') {
            &name[pos + 1..]
        } else {
            name
        }
    }

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    /// Slide part paths in the order the presentation references them.
    fn slide_order(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
        let rels = read_part(archive, parts::PRESENTATION_RELS);
        let mut reader = Reader::from_str(&rels);
        reader.trim_text(true);

        let mut targets = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) if e.name().as_ref() == b"Relationship" => {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    if rel_type == rel_types::SLIDE {
                        targets.push(format!("ppt/{}", target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => panic!("bad rels: {}", e),
                _ => {}
            }
        }
        targets
    }

    /// Text of each shape on a slide, paragraphs joined with newlines.
    fn shape_texts(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut shapes = Vec::new();
        let mut paragraphs: Vec<String> = Vec::new();
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => paragraphs.clear(),
                    b"p" => paragraphs.push(String::new()),
                    b"t" => in_text = true,
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_text => {
                    if let Some(last) = paragraphs.last_mut() {
                        last.push_str(&e.unescape().unwrap());
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"t" => in_text = false,
                    b"sp" => shapes.push(paragraphs.join("\n")),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => panic!("bad slide xml: {}", e),
                _ => {}
            }
        }
        shapes
    }

    fn write_deck(markdown: &str) -> ZipArchive<Cursor<Vec<u8>>> {
        let slides = DeckParser::new().parse(markdown);
        let cursor = PptxWriter::new()
            .write_slides(&slides, Cursor::new(Vec::new()))
            .unwrap();
        ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap()
    }

    #[test]
    fn test_package_has_required_parts() {
        let mut archive = write_deck("# One\n---\n# Two");

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        for required in [
            parts::CONTENT_TYPES,
            parts::ROOT_RELS,
            parts::PRESENTATION,
            parts::PRESENTATION_RELS,
            parts::THEME,
            parts::SLIDE_MASTER,
            parts::SLIDE_LAYOUT,
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(names.iter().any(|n| n == required), "missing {}", required);
        }

        let types = read_part(&mut archive, parts::CONTENT_TYPES);
        assert!(types.contains(r#"PartName="/ppt/slides/slide2.xml""#));
        assert!(!types.contains("slide3.xml"));
    }

    #[test]
    fn test_one_slide_part_per_slide_in_order() {
        let mut archive = write_deck("# First\n\nA\n---\n# Second\n\nB\n---\n# Third\n\nC");

        let order = slide_order(&mut archive);
        assert_eq!(
            order,
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide3.xml"]
        );

        let titles: Vec<String> = order
            .iter()
            .map(|path| shape_texts(&read_part(&mut archive, path))[0].clone())
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_slide_size() {
        let mut archive = write_deck("# Only");
        let presentation = read_part(&mut archive, parts::PRESENTATION);
        assert!(presentation.contains(r#"<p:sldSz cx="12191695" cy="6858000"/>"#));
        assert!(presentation.contains(r#"<p:sldId id="256" r:id="rId6"/>"#));
    }

    #[test]
    fn test_text_and_code_boxes() {
        let markdown = "# Demo\n\n- **Fast** & safe\n\n```rust\nfn main() {\n    println!(\"<hi>\");\n}\n```";
        let mut archive = write_deck(markdown);
        let xml = read_part(&mut archive, "ppt/slides/slide1.xml");

        let shapes = shape_texts(&xml);
        assert_eq!(
            shapes,
            vec![
                "Demo".to_string(),
                "• Fast & safe".to_string(),
                "[rust]\nfn main() {\n    println!(\"<hi>\");\n}".to_string(),
            ]
        );
        assert!(xml.contains(r#"sz="3200" b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="1A1A2E"/>"#));
        assert!(xml.contains(r#"<a:latin typeface="Courier New"/>"#));
        assert!(xml.contains(r#"sz="1000""#));
        assert!(xml.contains(r#"txBox="1""#));
    }

    #[test]
    fn test_blank_lines_become_empty_paragraphs() {
        let mut archive = write_deck("# T\n\nFirst\n\nSecond");
        let xml = read_part(&mut archive, "ppt/slides/slide1.xml");

        assert_eq!(shape_texts(&xml)[1], "First\n\nSecond");
        assert!(xml.contains(r#"<a:endParaRPr lang="en-US" sz="1400" dirty="0"/>"#));
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let mut archive = write_deck("# Log\n\n```sh\nterm \u{1b}[31mred\u{c}\tok\n```");
        let xml = read_part(&mut archive, "ppt/slides/slide1.xml");

        assert!(!xml.contains('\u{1b}'));
        assert_eq!(shape_texts(&xml)[1], "[sh]\nterm _x001B_[31mred_x000C_\tok");
    }

    #[test]
    fn test_escape_control_chars() {
        assert!(matches!(escape_control_chars("plain\ttext"), Cow::Borrowed(_)));
        assert_eq!(escape_control_chars("a\u{0}b\u{1f}"), "a_x0000_b_x001F_");
    }

    #[test]
    fn test_empty_deck() {
        let mut archive = write_deck("");
        assert!(slide_order(&mut archive).is_empty());
        let presentation = read_part(&mut archive, parts::PRESENTATION);
        assert!(!presentation.contains("sldIdLst"));
    }

    #[test]
    fn test_save_writes_file() {
        let path = std::env::temp_dir().join(format!("slidev-pptx-test-{}.pptx", std::process::id()));
        let slides = DeckParser::new().parse("---\ntheme: x\nhighlighter: y\ntitle: Demo\n---");

        let count = PptxWriter::new().save(&slides, &path).unwrap();
        assert_eq!(count, 1);

        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let order = slide_order(&mut archive);
        assert_eq!(order.len(), 1);
        assert_eq!(shape_texts(&read_part(&mut archive, &order[0])), vec!["Demo"]);
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let result = PptxWriter::new().save(&[], "/definitely/not/here/out.pptx");
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
