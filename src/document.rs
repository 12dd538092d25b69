use std::path::Path;

use thiserror::Error;

use crate::docx::DocxPackage;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("UnsupportedFormat: {0}")]
    UnsupportedFormat(String),
    #[error("MalformedDocument: {0}")]
    Malformed(String),
    #[error("ReadFailed: {0}")]
    Read(String),
    #[error("WriteFailed: {0}")]
    Write(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const ALERT: Rgb = Rgb(0xFF, 0x00, 0x00);
    pub const NOTE: Rgb = Rgb(0x00, 0x00, 0xFF);

    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub color: Option<Rgb>,
    pub italic: bool,
}

/// A span of paragraph text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
    /// Source-format run properties carried through untouched (e.g. a DOCX `<w:rPr>`).
    pub properties: Option<String>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Run {
        Run { text: text.into(), style: RunStyle::default(), properties: None }
    }

    pub fn styled(text: impl Into<String>, style: RunStyle) -> Run {
        Run { text: text.into(), style, properties: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    /// Set once the runs were replaced; untouched paragraphs are written back verbatim.
    pub edited: bool,
    /// Holds content (text boxes, drawings) that rewriting the runs would drop.
    /// Annotation leaves such paragraphs alone.
    pub locked: bool,
}

impl Paragraph {
    pub fn from_text(text: impl Into<String>) -> Paragraph {
        let text = text.into();
        let runs = if text.is_empty() { Vec::new() } else { vec![Run::plain(text)] };
        Paragraph { runs, edited: false, locked: false }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn text_len(&self) -> usize {
        self.runs.iter().map(|r| r.text.len()).sum()
    }

    pub fn replace_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs.into_iter().filter(|r| !r.text.is_empty()).collect();
        self.edited = true;
    }
}

/// Split runs at byte offset `at` of their concatenated text.
/// `at` must fall on a char boundary.
pub fn split_runs(runs: Vec<Run>, at: usize) -> (Vec<Run>, Vec<Run>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut pos = 0usize;
    for run in runs {
        let len = run.text.len();
        if pos + len <= at {
            head.push(run);
        } else if pos >= at {
            tail.push(run);
        } else {
            let cut = at - pos;
            let mut right = run.clone();
            right.text = run.text[cut..].to_string();
            let mut left = run;
            left.text.truncate(cut);
            head.push(left);
            tail.push(right);
        }
        pos += len;
    }
    (head, tail)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Result<DocumentFormat, DocumentError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "txt" | "text" | "md" => Ok(DocumentFormat::PlainText),
            _ => Err(DocumentError::UnsupportedFormat(filename.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum Source {
    PlainText,
    Docx(DocxPackage),
}

/// An uploaded document as an ordered list of paragraphs.
#[derive(Debug, Clone)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    source: Source,
}

impl Document {
    /// A plain-text document with one paragraph per line.
    pub fn from_text(text: &str) -> Document {
        let normalized = text.replace("\r\n", "\n");
        let paragraphs = normalized.split('\n').map(Paragraph::from_text).collect();
        Document { paragraphs, source: Source::PlainText }
    }

    pub fn from_docx(package: DocxPackage, paragraphs: Vec<Paragraph>) -> Document {
        Document { paragraphs, source: Source::Docx(package) }
    }

    pub fn load(filename: &str, bytes: &[u8]) -> Result<Document, DocumentError> {
        match DocumentFormat::from_filename(filename)? {
            DocumentFormat::Docx => crate::docx::read_docx(bytes),
            DocumentFormat::PlainText => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| DocumentError::Malformed(format!("{}: {}", filename, e)))?;
                Ok(Document::from_text(text))
            }
        }
    }

    pub fn format(&self) -> DocumentFormat {
        match self.source {
            Source::PlainText => DocumentFormat::PlainText,
            Source::Docx(_) => DocumentFormat::Docx,
        }
    }

    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(|p| p.text()).collect()
    }

    /// Paragraph texts joined by a single newline; the text scan offsets refer to.
    pub fn full_text(&self) -> String {
        self.paragraph_texts().join("\n")
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        match &self.source {
            Source::PlainText => Ok(self.full_text().into_bytes()),
            Source::Docx(package) => crate::docx::write_docx(package, &self.paragraphs),
        }
    }
}
