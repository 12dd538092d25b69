use serde::{Deserialize, Serialize};

use crate::catalog::{Rule, RuleCatalog, Severity, GENERAL};

/// A red flag located in a document's full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Document type the issue was found in.
    pub document: String,
    /// "Text near position N", N counted in characters.
    pub section: String,
    pub issue: String,
    pub severity: Severity,
    pub regulation: String,
    pub suggestion: String,
    pub matched_text: String,
    /// Byte offset of the match in the scanned text.
    pub offset: usize,
}

/// Run the rules for `document_type`, then the General rules, over `full_text`.
/// The second pass always runs (unless the type is General itself), so a pattern
/// present in both groups is reported twice, and a document whose type has no
/// rule group gets the General rules twice.
pub fn scan(full_text: &str, document_type: &str, rules: &RuleCatalog) -> Vec<Issue> {
    let mut issues = Vec::new();
    apply(rules.rules_for(document_type), full_text, document_type, &mut issues);
    if document_type != GENERAL {
        apply(rules.general(), full_text, document_type, &mut issues);
    }
    issues
}

fn apply(rules: &[Rule], text: &str, document_type: &str, out: &mut Vec<Issue>) {
    for rule in rules {
        for m in rule.find_iter(text) {
            let chars_before = text[..m.start()].chars().count();
            out.push(Issue {
                document: document_type.to_string(),
                section: format!("Text near position {}", chars_before),
                issue: rule.spec.issue.clone(),
                severity: rule.spec.severity,
                regulation: rule.spec.regulation.clone(),
                suggestion: format!("Align with {}", rule.spec.regulation),
                matched_text: m.as_str().to_string(),
                offset: m.start(),
            });
        }
    }
}
