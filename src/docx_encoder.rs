//! Word (`.docx`) output.
//!
//! A DOCX file is a zip package of XML parts. Unlike the text formats we can't stream the
//! package as segments arrive (the zip central directory comes last and the document body is a
//! single part), so the encoder accumulates paragraph XML and writes the whole package on
//! `close`.

use std::io::{Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TranscriptSegment;
use crate::timestamp::{TimestampStyle, format_timestamp};

/// Heading and document title.
pub const DOCUMENT_TITLE: &str = "Transcript";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:sz w:val="22"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter with one-inch margins, in twentieths of a point.
const DOCUMENT_TAIL: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

/// A `SegmentEncoder` that produces a single-section Word document.
///
/// Layout:
/// - a level-1 `Transcript` heading (also the package's `dc:title`)
/// - one paragraph per segment
/// - with timestamps, a bold `[HH:MM:SS]` run precedes the normal-weight text run
pub struct DocxEncoder<W: Write + Seek> {
    w: W,
    style: Option<TimestampStyle>,

    /// Accumulated `<w:p>` elements for the document body.
    body: String,

    closed: bool,
}

impl<W: Write + Seek> DocxEncoder<W> {
    pub fn new(w: W, include_timestamps: bool, style: TimestampStyle) -> Self {
        let mut body = String::new();
        push_heading(&mut body, DOCUMENT_TITLE);

        Self {
            w,
            style: include_timestamps.then_some(style),
            body,
            closed: false,
        }
    }

    fn write_package(&mut self) -> Result<()> {
        // A fixed timestamp keeps the package byte-for-byte reproducible.
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let mut zip = ZipWriter::new(&mut self.w);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(core_properties_xml(DOCUMENT_TITLE).as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(DOCUMENT_RELS_XML.as_bytes())?;

        zip.start_file("word/styles.xml", options)?;
        zip.write_all(STYLES_XML.as_bytes())?;

        zip.start_file("word/document.xml", options)?;
        zip.write_all(DOCUMENT_HEAD.as_bytes())?;
        zip.write_all(self.body.as_bytes())?;
        zip.write_all(DOCUMENT_TAIL.as_bytes())?;

        zip.finish()?;
        Ok(())
    }
}

impl<W: Write + Seek> SegmentEncoder for DocxEncoder<W> {
    fn write_segment(&mut self, seg: &TranscriptSegment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.body.push_str("<w:p>");
        if let Some(style) = self.style {
            let ts = format_timestamp(seg.start_seconds, style);
            push_run(&mut self.body, &format!("[{ts}] "), true);
        }
        push_run(&mut self.body, &seg.single_line_text(), false);
        self.body.push_str("</w:p>");

        Ok(())
    }

    /// Write the zip package and flush. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.write_package()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

fn push_heading(out: &mut String, text: &str) {
    out.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#);
    push_run(out, text, false);
    out.push_str("</w:p>");
}

fn push_run(out: &mut String, text: &str, bold: bool) {
    out.push_str("<w:r>");
    if bold {
        out.push_str("<w:rPr><w:b/></w:rPr>");
    }
    out.push_str(r#"<w:t xml:space="preserve">"#);
    push_escaped(out, text);
    out.push_str("</w:t></w:r>");
}

fn core_properties_xml(title: &str) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>"#,
    );
    push_escaped(&mut xml, title);
    xml.push_str(concat!(
        "</dc:title><dc:creator>",
        env!("CARGO_PKG_NAME"),
        "</dc:creator></cp:coreProperties>"
    ));
    xml
}

/// Append `text` with XML metacharacters escaped.
///
/// Control characters that XML 1.0 forbids are dropped; caption feeds occasionally carry them.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' => {}
            c => out.push(c),
        }
    }
}
