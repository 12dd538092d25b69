//! Rule-based review of ADGM corporate documents: guess each document's type,
//! flag regulatory red flags, mark them inline and summarise the batch.

pub mod aggregate;
pub mod annotate;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod document;
pub mod docx;
pub mod pipeline;
pub mod report;
pub mod resources;
pub mod scan;

pub use aggregate::{infer_process, score_categories, CategoryMatch, ProcessInference, ProcessMatch, UNKNOWN_PROCESS};
pub use annotate::{annotate, AnnotationStats};
pub use catalog::{load_catalog, Catalog, CatalogError, Category, Resource, Rule, RuleCatalog, Severity, GENERAL, PROCESS_MATCH_THRESHOLD};
pub use classify::{build_index, classify, extract_keywords, ClassifierIndex, IndexEntry};
pub use config::{validate_config, ConfigError, ReviewConfig};
pub use document::{Document, DocumentError, DocumentFormat, Paragraph, Run, RunStyle};
pub use pipeline::{enumerate_documents, process_batch, review_document, BatchOutcome, DocumentFailure, EnumerateError, ReviewedDocument, Upload, UNKNOWN_CATEGORY, UNKNOWN_DOCUMENT};
pub use report::{build_report, emit_outputs, render_summary, report_fingerprint, ComplianceReport, EmitError, IssueRecord};
pub use resources::{find_related_resources, group_resources_by_category};
pub use scan::{scan, Issue};

// Utility to compute sha256 hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}
