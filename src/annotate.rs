use serde::{Deserialize, Serialize};

use crate::document::{split_runs, Document, Paragraph, Rgb, Run, RunStyle};
use crate::scan::Issue;

pub const ALERT_STYLE: RunStyle = RunStyle { color: Some(Rgb::ALERT), italic: false };
pub const NOTE_STYLE: RunStyle = RunStyle { color: Some(Rgb::NOTE), italic: true };

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationStats {
    pub applied: usize,
    /// Offsets that fell outside every paragraph, inside a locked paragraph,
    /// or in the middle of a character.
    pub skipped: Vec<usize>,
}

/// Inline advisory text appended after a flagged span.
pub fn issue_note(issue: &Issue) -> String {
    format!(" [ISSUE: {}. {}]", issue.issue, issue.suggestion)
}

/// Mark every issue in place: the matched span turns red and is followed by a
/// blue italic note. Issues are applied from the end of the text backwards so
/// earlier offsets stay valid.
pub fn annotate(doc: &mut Document, issues: &[Issue]) -> AnnotationStats {
    let mut ordered: Vec<&Issue> = issues.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut stats = AnnotationStats::default();
    for issue in ordered {
        let flagged = match locate(&doc.paragraphs, issue.offset) {
            Some((index, relative)) if !doc.paragraphs[index].locked => {
                flag_span(&mut doc.paragraphs[index], relative, issue.matched_text.len(), &issue_note(issue))
            }
            _ => false,
        };
        if flagged {
            stats.applied += 1;
        } else {
            stats.skipped.push(issue.offset);
        }
    }
    stats
}

/// Paragraph index and offset within it, counting one separator per paragraph boundary.
fn locate(paragraphs: &[Paragraph], offset: usize) -> Option<(usize, usize)> {
    let mut start = 0usize;
    for (i, para) in paragraphs.iter().enumerate() {
        let len = para.text_len();
        if start <= offset && offset < start + len {
            return Some((i, offset - start));
        }
        start += len + 1;
    }
    None
}

fn flag_span(para: &mut Paragraph, at: usize, len: usize, note: &str) -> bool {
    let text = para.text();
    if !text.is_char_boundary(at) {
        return false;
    }
    let mut end = (at + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let runs = std::mem::take(&mut para.runs);
    let (mut out, rest) = split_runs(runs, at);
    let (_, suffix) = split_runs(rest, end - at);
    out.push(Run::styled(&text[at..end], ALERT_STYLE));
    out.push(Run::styled(note, NOTE_STYLE));
    out.extend(suffix);
    para.replace_runs(out);
    true
}
