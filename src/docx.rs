//! Minimal WordprocessingML package handling.
//!
//! Only `word/document.xml` is interpreted: it is cut into paragraphs and each
//! paragraph into runs of text. Every other package part, and every paragraph
//! that was not edited, is written back byte-for-byte. Paragraphs carrying
//! text boxes or drawings are locked and never edited.

use std::io::{Cursor, Read, Write};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::{Document, DocumentError, Paragraph, Run, RunStyle};

pub const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>|</w:p>").unwrap());
// Run content a re-rendered paragraph cannot reproduce.
static EMBEDDED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:(?:drawing|pict|object)[\s/>]").unwrap());
static PPR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A\s*(?:<w:pPr\s*/>|<w:pPr(?:\s[^>]*)?>.*?</w:pPr>)").unwrap());
static RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<w:r(?:\s[^>]*)?>(.*?)</w:r>").unwrap());
static RPR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:rPr\s*/>|<w:rPr(?:\s[^>]*)?>.*?</w:rPr>").unwrap());
static TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>").unwrap()
});
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").unwrap());

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

#[derive(Debug, Clone)]
struct ParagraphXml {
    open_tag: String,
    properties: String,
    original: String,
}

#[derive(Debug, Clone)]
enum Piece {
    Verbatim(String),
    Paragraph(ParagraphXml),
}

/// The parts of a `.docx` needed to write it back after editing paragraphs.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<Entry>,
    body: Vec<Piece>,
}

fn malformed(e: impl std::fmt::Display) -> DocumentError {
    DocumentError::Malformed(e.to_string())
}

pub fn read_docx(bytes: &[u8]) -> Result<Document, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(malformed)?;
        let name = file.name().to_string();
        let is_dir = file.is_dir();
        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(malformed)?;
        entries.push(Entry { name, data, is_dir });
    }

    let part = entries
        .iter()
        .find(|e| e.name == DOCUMENT_PART)
        .ok_or_else(|| DocumentError::Malformed(format!("missing {}", DOCUMENT_PART)))?;
    let xml = std::str::from_utf8(&part.data).map_err(malformed)?;
    let (body, paragraphs) = split_body(xml);

    Ok(Document::from_docx(DocxPackage { entries, body }, paragraphs))
}

/// Byte ranges of the outermost `<w:p>` elements in `xml`. Paragraphs nested
/// inside them (text boxes) belong to the enclosing range.
fn paragraph_spans(xml: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for m in PARAGRAPH_TAG_RE.find_iter(xml) {
        let tag = m.as_str();
        if tag == "</w:p>" {
            match depth {
                0 => {}
                1 => {
                    spans.push((start, m.end()));
                    depth = 0;
                }
                _ => depth -= 1,
            }
        } else if tag.ends_with("/>") {
            if depth == 0 {
                spans.push((m.start(), m.end()));
            }
        } else {
            if depth == 0 {
                start = m.start();
            }
            depth += 1;
        }
    }
    spans
}

fn split_body(xml: &str) -> (Vec<Piece>, Vec<Paragraph>) {
    let mut pieces = Vec::new();
    let mut paragraphs = Vec::new();
    let mut last = 0usize;
    for (start, end) in paragraph_spans(xml) {
        if start > last {
            pieces.push(Piece::Verbatim(xml[last..start].to_string()));
        }
        let (para_xml, paragraph) = parse_paragraph(&xml[start..end]);
        pieces.push(Piece::Paragraph(para_xml));
        paragraphs.push(paragraph);
        last = end;
    }
    if last < xml.len() {
        pieces.push(Piece::Verbatim(xml[last..].to_string()));
    }
    (pieces, paragraphs)
}

fn parse_paragraph(raw: &str) -> (ParagraphXml, Paragraph) {
    let open_end = raw.find('>').map(|i| i + 1).unwrap_or(raw.len());
    let open_tag = raw[..open_end].to_string();
    let mut properties = String::new();
    let mut runs = Vec::new();
    let mut locked = false;

    if !open_tag.ends_with("/>") {
        let inner = &raw[open_end..raw.len().saturating_sub("</w:p>".len()).max(open_end)];
        let mut content_start = 0;
        if let Some(ppr) = PPR_RE.find(inner) {
            properties = ppr.as_str().trim_start().to_string();
            content_start = ppr.end();
        }
        let content = &inner[content_start..];
        let nested = paragraph_spans(content);
        locked = !nested.is_empty() || EMBEDDED_RE.is_match(content);
        let own = without_spans(content, &nested);
        for cap in RUN_RE.captures_iter(&own) {
            let body = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let run_props = RPR_RE.find(body).map(|m| m.as_str().to_string());
            let text = run_text(body);
            if text.is_empty() {
                continue;
            }
            runs.push(Run { text, style: RunStyle::default(), properties: run_props });
        }
    }

    let xml = ParagraphXml { open_tag, properties, original: raw.to_string() };
    (xml, Paragraph { runs, edited: false, locked })
}

fn without_spans(s: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last = 0usize;
    for &(start, end) in spans {
        out.push_str(&s[last..start]);
        last = end;
    }
    out.push_str(&s[last..]);
    out
}

fn run_text(body: &str) -> String {
    let mut text = String::new();
    for cap in TEXT_RE.captures_iter(body) {
        if let Some(t) = cap.get(1) {
            text.push_str(&unescape_xml(t.as_str()));
            continue;
        }
        let tag = cap.get(0).map(|m| m.as_str()).unwrap_or("");
        if tag.starts_with("<w:tab") {
            text.push('\t');
        } else if tag.starts_with("<w:br") || tag.starts_with("<w:cr") {
            text.push('\n');
        }
    }
    text
}

pub fn write_docx(package: &DocxPackage, paragraphs: &[Paragraph]) -> Result<Vec<u8>, DocumentError> {
    let body = render_body(package, paragraphs);
    let write_err = |e: zip::result::ZipError| DocumentError::Write(e.to_string());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for entry in &package.entries {
        if entry.is_dir {
            writer.add_directory(entry.name.as_str(), options).map_err(write_err)?;
            continue;
        }
        writer.start_file(entry.name.as_str(), options).map_err(write_err)?;
        let data: &[u8] = if entry.name == DOCUMENT_PART { body.as_bytes() } else { &entry.data };
        writer.write_all(data).map_err(|e| DocumentError::Write(e.to_string()))?;
    }
    let cursor = writer.finish().map_err(write_err)?;
    Ok(cursor.into_inner())
}

fn render_body(package: &DocxPackage, paragraphs: &[Paragraph]) -> String {
    let mut out = String::new();
    let mut index = 0usize;
    for piece in &package.body {
        match piece {
            Piece::Verbatim(s) => out.push_str(s),
            Piece::Paragraph(p) => {
                match paragraphs.get(index) {
                    Some(para) if para.edited && !para.locked => out.push_str(&render_paragraph(p, para)),
                    _ => out.push_str(&p.original),
                }
                index += 1;
            }
        }
    }
    out
}

fn render_paragraph(xml: &ParagraphXml, para: &Paragraph) -> String {
    let mut out = String::new();
    if xml.open_tag.ends_with("/>") {
        out.push_str(xml.open_tag.trim_end_matches("/>"));
        out.push('>');
    } else {
        out.push_str(&xml.open_tag);
    }
    out.push_str(&xml.properties);
    for run in &para.runs {
        out.push_str(&render_run(run));
    }
    out.push_str("</w:p>");
    out
}

fn render_run(run: &Run) -> String {
    let mut out = String::from("<w:r>");
    if run.style != RunStyle::default() {
        out.push_str("<w:rPr>");
        if run.style.italic {
            out.push_str("<w:i/>");
        }
        if let Some(color) = run.style.color {
            out.push_str(&format!("<w:color w:val=\"{}\"/>", color.hex()));
        }
        out.push_str("</w:rPr>");
    } else if let Some(props) = &run.properties {
        out.push_str(props);
    }

    let mut pending = String::new();
    for ch in run.text.chars() {
        match ch {
            '\t' => {
                flush_text(&mut out, &mut pending);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush_text(&mut out, &mut pending);
                out.push_str("<w:br/>");
            }
            _ => pending.push(ch),
        }
    }
    flush_text(&mut out, &mut pending);
    out.push_str("</w:r>");
    out
}

fn flush_text(out: &mut String, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    out.push_str("<w:t xml:space=\"preserve\">");
    out.push_str(&escape_xml(pending));
    out.push_str("</w:t>");
    pending.clear();
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape_xml(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |cap: &Captures| {
            let name = &cap[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if name.starts_with("#x") => u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32),
                _ if name.starts_with('#') => name[1..].parse::<u32>().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map(String::from).unwrap_or_else(|| cap[0].to_string())
        })
        .into_owned()
}
