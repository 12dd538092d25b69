use serde::{Deserialize, Serialize};

use crate::catalog::Category;

/// Process name reported when no category clears the threshold.
pub const UNKNOWN_PROCESS: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessMatch {
    pub match_fraction: f64,
    pub docs_found: Vec<String>,
    pub required_docs: Vec<String>,
    pub missing_docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub category: String,
    #[serde(flatten)]
    pub matched: ProcessMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInference {
    pub process: String,
    #[serde(flatten)]
    pub matched: ProcessMatch,
}

impl ProcessInference {
    pub fn unknown() -> ProcessInference {
        ProcessInference { process: UNKNOWN_PROCESS.to_string(), matched: ProcessMatch::default() }
    }

    pub fn is_known(&self) -> bool {
        self.process != UNKNOWN_PROCESS
    }
}

/// Compare recognised document types against one category's requirement list.
/// Repeated uploads of the same type count once.
pub fn score_category(recognized: &[String], category: &Category) -> ProcessMatch {
    let mut docs_found: Vec<String> = Vec::new();
    for doc in recognized {
        if category.documents.contains(doc) && !docs_found.contains(doc) {
            docs_found.push(doc.clone());
        }
    }
    let match_fraction = if category.documents.is_empty() {
        0.0
    } else {
        docs_found.len() as f64 / category.documents.len() as f64
    };
    let missing_docs = category
        .documents
        .iter()
        .filter(|d| !docs_found.contains(d))
        .cloned()
        .collect();
    ProcessMatch { match_fraction, docs_found, required_docs: category.documents.clone(), missing_docs }
}

pub fn score_categories(recognized: &[String], categories: &[Category]) -> Vec<CategoryMatch> {
    categories
        .iter()
        .map(|c| CategoryMatch { category: c.name.clone(), matched: score_category(recognized, c) })
        .collect()
}

/// Pick the category with the highest match fraction (first one on ties).
/// A fraction at or below `threshold` yields the Unknown process.
pub fn infer_process(recognized: &[String], categories: &[Category], threshold: f64) -> ProcessInference {
    let mut best: Option<CategoryMatch> = None;
    for candidate in score_categories(recognized, categories) {
        let better = match &best {
            Some(b) => candidate.matched.match_fraction > b.matched.match_fraction,
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    match best {
        Some(b) if b.matched.match_fraction > threshold => {
            ProcessInference { process: b.category, matched: b.matched }
        }
        _ => ProcessInference::unknown(),
    }
}
