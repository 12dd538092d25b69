use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::{annotate, AnnotationStats};
use crate::catalog::Catalog;
use crate::classify::{build_index, classify, ClassifierIndex};
use crate::document::{Document, DocumentError};
use crate::scan::{scan, Issue};
use crate::sha256_hex;

pub const UNKNOWN_DOCUMENT: &str = "Unknown Document";
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Raw bytes of one uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Upload {
        Upload { filename: filename.into(), bytes }
    }

    pub fn from_path(path: &Path) -> Result<Upload, DocumentError> {
        let bytes = std::fs::read(path).map_err(|e| DocumentError::Read(format!("{}: {}", path.display(), e)))?;
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Upload { filename, bytes })
    }
}

#[derive(Debug, Clone)]
pub struct ReviewedDocument {
    pub name: String,
    pub document_type: String,
    pub category: String,
    pub full_text: String,
    pub issues_count: usize,
    pub sha256: String,
    pub annotation: AnnotationStats,
    /// Annotated document in the upload's own format.
    pub output: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub documents: Vec<ReviewedDocument>,
    pub issues: Vec<Issue>,
    /// Inferred type of every reviewed document, in upload order.
    pub recognized: Vec<String>,
    pub failures: Vec<DocumentFailure>,
}

/// Classify, scan and annotate one upload.
pub fn review_document(
    upload: &Upload,
    catalog: &Catalog,
    index: &ClassifierIndex,
) -> Result<(ReviewedDocument, Vec<Issue>), DocumentError> {
    let mut doc = Document::load(&upload.filename, &upload.bytes)?;
    let full_text = doc.full_text();

    let (document_type, category) = match classify(&full_text, index) {
        Some(entry) => (entry.document_type.clone(), entry.category.clone()),
        None => (UNKNOWN_DOCUMENT.to_string(), UNKNOWN_CATEGORY.to_string()),
    };

    let issues = scan(&full_text, &document_type, &catalog.rules);
    let annotation = annotate(&mut doc, &issues);
    let output = doc.to_bytes()?;

    let reviewed = ReviewedDocument {
        name: upload.filename.clone(),
        document_type,
        category,
        full_text,
        issues_count: issues.len(),
        sha256: sha256_hex(&upload.bytes),
        annotation,
        output,
    };
    Ok((reviewed, issues))
}

/// Review every upload. A document that cannot be read is recorded in
/// `failures` and the rest of the batch carries on.
pub fn process_batch(uploads: &[Upload], catalog: &Catalog) -> BatchOutcome {
    let index = build_index(&catalog.categories);
    let mut outcome = BatchOutcome::default();
    for upload in uploads {
        match review_document(upload, catalog, &index) {
            Ok((reviewed, issues)) => {
                outcome.recognized.push(reviewed.document_type.clone());
                outcome.issues.extend(issues);
                outcome.documents.push(reviewed);
            }
            Err(e) => outcome.failures.push(DocumentFailure {
                filename: upload.filename.clone(),
                message: e.to_string(),
            }),
        }
    }
    outcome
}

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("NoFilesFound")]
    NoFilesFound { guidance: String },
}

/// Enumerate input documents using a glob pattern (e.g., "./input/**/*.docx").
/// Returns a sorted list of paths.
pub fn enumerate_documents(glob_pattern: &str) -> Result<Vec<PathBuf>, EnumerateError> {
    let root = if Path::new(glob_pattern).is_absolute() { "/" } else { "." };
    let pat = glob_pattern.strip_prefix("./").unwrap_or(glob_pattern);
    let mut paths: Vec<PathBuf> = GlobWalkerBuilder::from_patterns(root, &[pat])
        .case_insensitive(false)
        .follow_links(false)
        .build()
        .map_err(|_| EnumerateError::NoFilesFound { guidance: folder_guidance(glob_pattern) })?
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .collect();

    paths.sort();
    paths.retain(|p| p.is_file());

    if paths.is_empty() {
        return Err(EnumerateError::NoFilesFound { guidance: folder_guidance(glob_pattern) });
    }

    Ok(paths)
}

fn folder_guidance(glob_pattern: &str) -> String {
    format!(
        "No documents match {}\nSuggested layout:\n  ./input/company-formation/...\n  ./input/employment/...\nSupported formats: .docx, .txt, .md",
        glob_pattern
    )
}
