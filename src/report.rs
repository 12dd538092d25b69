use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::ProcessInference;
use crate::catalog::Severity;
use crate::pipeline::{BatchOutcome, DocumentFailure, ReviewedDocument};
use crate::scan::Issue;
use crate::sha256_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub document: String,
    pub section: String,
    pub issue: String,
    pub severity: Severity,
    pub suggestion: String,
}

impl From<&Issue> for IssueRecord {
    fn from(issue: &Issue) -> Self {
        IssueRecord {
            document: issue.document.clone(),
            section: issue.section.clone(),
            issue: issue.issue.clone(),
            severity: issue.severity,
            suggestion: issue.suggestion.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn tally(issues: &[Issue]) -> SeverityCounts {
        let mut counts = SeverityCounts { total: issues.len(), ..Default::default() };
        for issue in issues {
            match issue.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub name: String,
    pub document_type: String,
    pub category: String,
    pub issues_count: usize,
    pub sha256: String,
}

impl From<&ReviewedDocument> for DocumentRecord {
    fn from(doc: &ReviewedDocument) -> Self {
        DocumentRecord {
            name: doc.name.clone(),
            document_type: doc.document_type.clone(),
            category: doc.category.clone(),
            issues_count: doc.issues_count,
            sha256: doc.sha256.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub process: String,
    pub documents_uploaded: usize,
    pub required_documents: usize,
    pub missing_documents: Vec<String>,
    pub issues_found: Vec<IssueRecord>,
    pub severity_counts: SeverityCounts,
    pub documents: Vec<DocumentRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DocumentFailure>,
}

pub fn build_report(outcome: &BatchOutcome, inference: &ProcessInference) -> ComplianceReport {
    ComplianceReport {
        process: inference.process.clone(),
        documents_uploaded: inference.matched.docs_found.len(),
        required_documents: inference.matched.required_docs.len(),
        missing_documents: inference.matched.missing_docs.clone(),
        issues_found: outcome.issues.iter().map(IssueRecord::from).collect(),
        severity_counts: SeverityCounts::tally(&outcome.issues),
        documents: outcome.documents.iter().map(DocumentRecord::from).collect(),
        failures: outcome.failures.clone(),
    }
}

/// SHA-256 of the compact JSON form of the report.
pub fn report_fingerprint(report: &ComplianceReport) -> Result<String, EmitError> {
    let bytes = serde_json::to_vec(report).map_err(|e| EmitError::SerializeFailed(e.to_string()))?;
    Ok(sha256_hex(&bytes))
}

/// Plain-text summary of a report for the terminal.
pub fn render_summary(report: &ComplianceReport) -> String {
    let mut out = Vec::new();
    if report.process == crate::aggregate::UNKNOWN_PROCESS {
        out.push("Unable to determine the legal process from the uploaded documents.".to_string());
    } else {
        out.push(format!("Identified process: {}", report.process));
        out.push(format!(
            "Documents found: {} of {}",
            report.documents_uploaded, report.required_documents
        ));
        if !report.missing_documents.is_empty() {
            out.push("Missing documents:".to_string());
            for doc in &report.missing_documents {
                out.push(format!("  * {}", doc));
            }
        }
    }
    let c = &report.severity_counts;
    out.push(format!(
        "Issues: {} total ({} high, {} medium, {} low)",
        c.total, c.high, c.medium, c.low
    ));
    for doc in &report.documents {
        out.push(format!("  {} ({}): {} issues", doc.name, doc.document_type, doc.issues_count));
    }
    for f in &report.failures {
        out.push(format!("  {} failed: {}", f.filename, f.message));
    }
    out.join("\n")
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
    #[error("SerializeFailed: {0}")]
    SerializeFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPaths {
    pub report_path: String,
    pub document_paths: Vec<String>,
}

pub fn report_file_name(process: &str) -> String {
    format!("ADGM_Compliance_Report_{}.json", process.replace(' ', "_"))
}

/// Write each annotated document as `Reviewed_<name>` and the report JSON into `outdir`.
pub fn emit_outputs(report: &ComplianceReport, documents: &[ReviewedDocument], outdir: &str) -> Result<EmitPaths, EmitError> {
    std::fs::create_dir_all(outdir).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let dir = Path::new(outdir);

    let mut document_paths = Vec::with_capacity(documents.len());
    for doc in documents {
        let path = dir.join(format!("Reviewed_{}", doc.name));
        write_atomic(&path, &doc.output)?;
        document_paths.push(path.to_string_lossy().to_string());
    }

    let report_path = dir.join(report_file_name(&report.process));
    let bytes = serde_json::to_vec_pretty(report).map_err(|e| EmitError::SerializeFailed(e.to_string()))?;
    write_atomic(&report_path, &bytes)?;

    Ok(EmitPaths { report_path: report_path.to_string_lossy().to_string(), document_paths })
}

// Temp file in the target directory, then rename over the destination.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<PathBuf, EmitError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    tmp.write_all(bytes).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    tmp.persist(path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    Ok(path.to_path_buf())
}
