use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Category;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z]{3,}\b").expect("static regex"));

const STOPWORDS: &[&str] = &["and", "the", "for", "of"];

/// Lower-cased significant words of a document type name, first-seen order, no repeats.
pub fn extract_keywords(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in WORD_RE.find_iter(name) {
        let word = m.as_str().to_lowercase();
        if STOPWORDS.contains(&word.as_str()) || out.contains(&word) {
            continue;
        }
        out.push(word);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub document_type: String,
    pub keywords: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifierIndex {
    entries: Vec<IndexEntry>,
}

impl ClassifierIndex {
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn get(&self, document_type: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.document_type == document_type)
    }

    pub fn category_of(&self, document_type: &str) -> Option<&str> {
        self.get(document_type).map(|e| e.category.as_str())
    }
}

/// Build the keyword index from the category catalog.
/// A document type listed under several categories keeps the position of its
/// first listing and is owned by the last category that lists it.
pub fn build_index(categories: &[Category]) -> ClassifierIndex {
    let mut entries: Vec<IndexEntry> = Vec::new();
    for category in categories {
        for doc in &category.documents {
            if let Some(existing) = entries.iter_mut().find(|e| &e.document_type == doc) {
                existing.category = category.name.clone();
                continue;
            }
            entries.push(IndexEntry {
                document_type: doc.clone(),
                keywords: extract_keywords(doc),
                category: category.name.clone(),
            });
        }
    }
    ClassifierIndex { entries }
}

/// Guess the document type of `text`. Keywords count as present when they occur
/// anywhere in the lower-cased text. Ties go to the earliest entry; `None` when
/// no keyword occurs at all.
pub fn classify<'a>(text: &str, index: &'a ClassifierIndex) -> Option<&'a IndexEntry> {
    let lower = text.to_lowercase();
    let mut best: Option<&IndexEntry> = None;
    let mut highest = 0usize;
    for entry in &index.entries {
        let score = entry.keywords.iter().filter(|k| lower.contains(k.as_str())).count();
        if score > highest {
            highest = score;
            best = Some(entry);
        }
    }
    best
}
