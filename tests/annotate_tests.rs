use adgm_doc_review::annotate::{issue_note, ALERT_STYLE, NOTE_STYLE};
use adgm_doc_review::{annotate, scan, Catalog, Document, Issue, RunStyle, Severity};

fn issue_at(offset: usize, matched: &str) -> Issue {
    Issue {
        document: "General".into(),
        section: format!("Text near position {}", offset),
        issue: "Test".into(),
        severity: Severity::Low,
        regulation: "Reg".into(),
        suggestion: "Align with Reg".into(),
        matched_text: matched.into(),
        offset,
    }
}

#[test]
fn no_issues_leaves_document_untouched() {
    let mut doc = Document::from_text("First line\nSecond line");
    let stats = annotate(&mut doc, &[]);
    assert_eq!(stats.applied, 0);
    assert_eq!(doc.full_text(), "First line\nSecond line");
    assert!(doc.paragraphs.iter().all(|p| !p.edited));
}

#[test]
fn matches_are_split_into_alert_and_note_runs() {
    let catalog = Catalog::builtin().unwrap();
    let mut doc = Document::from_text("The company's share capital is fixed. Disputes go to Dubai Court.");
    let issues = scan(&doc.full_text(), "Articles of Association", &catalog.rules);
    let stats = annotate(&mut doc, &issues);
    assert_eq!(stats.applied, 2);
    assert!(stats.skipped.is_empty());

    let runs = &doc.paragraphs[0].runs;
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts.len(), 7);
    assert_eq!(texts[0], "The company's ");
    assert_eq!(texts[1], "share capital");
    assert_eq!(texts[2], issue_note(&issues[0]));
    assert_eq!(texts[3], " is fixed. Disputes go to ");
    assert_eq!(texts[4], "Dubai Court");
    assert_eq!(texts[5], issue_note(&issues[1]));
    assert_eq!(texts[6], ".");

    assert_eq!(runs[0].style, RunStyle::default());
    assert_eq!(runs[1].style, ALERT_STYLE);
    assert_eq!(runs[2].style, NOTE_STYLE);
    assert_eq!(runs[4].style, ALERT_STYLE);
}

#[test]
fn note_cites_the_regulation() {
    let catalog = Catalog::builtin().unwrap();
    let issues = scan("Pay in AED.", "General", &catalog.rules);
    assert_eq!(
        issue_note(&issues[0]),
        " [ISSUE: Currency should be USD for ADGM companies. Align with ADGM Commercial Licensing Regulations 2015, Art. 12]"
    );
}

#[test]
fn only_the_matching_paragraph_is_edited() {
    let catalog = Catalog::builtin().unwrap();
    let mut doc = Document::from_text("Clean first line\nPay in AED.");
    let issues = scan(&doc.full_text(), "General", &catalog.rules);
    assert_eq!(issues[0].offset, 24);

    annotate(&mut doc, &issues);
    assert!(!doc.paragraphs[0].edited);
    assert!(doc.paragraphs[1].edited);
    assert_eq!(doc.paragraphs[0].text(), "Clean first line");
    assert!(doc.paragraphs[1].text().starts_with("Pay in AED [ISSUE: "));
    assert!(doc.paragraphs[1].text().ends_with("Art. 12]."));
}

#[test]
fn offsets_outside_paragraphs_are_skipped() {
    let mut doc = Document::from_text("Clean first line\nPay in AED.");
    // 16 is the separator between the two paragraphs.
    let stats = annotate(&mut doc, &[issue_at(999, "x"), issue_at(16, "\n")]);
    assert_eq!(stats.applied, 0);
    assert_eq!(stats.skipped, vec![999, 16]);
    assert_eq!(doc.full_text(), "Clean first line\nPay in AED.");
}

#[test]
fn issues_at_the_same_offset_stack_their_notes() {
    let catalog = Catalog::builtin().unwrap();
    let mut doc = Document::from_text("Pay in AED.");
    let issues = scan(&doc.full_text(), "Unknown Document", &catalog.rules);
    assert_eq!(issues.len(), 2);

    let stats = annotate(&mut doc, &issues);
    assert_eq!(stats.applied, 2);
    let note = issue_note(&issues[0]);
    assert_eq!(doc.paragraphs[0].text(), format!("Pay in AED{}{}.", note, note));
    assert_eq!(doc.paragraphs[0].runs.len(), 5);
}

#[test]
fn match_at_paragraph_end_has_no_suffix_run() {
    let mut doc = Document::from_text("Pay in AED");
    annotate(&mut doc, &[issue_at(7, "AED")]);
    let texts: Vec<String> = doc.paragraphs[0].runs.iter().map(|r| r.text.clone()).collect();
    assert_eq!(texts, vec!["Pay in ".to_string(), "AED".to_string(), " [ISSUE: Test. Align with Reg]".to_string()]);
}

#[test]
fn offset_inside_a_character_is_skipped() {
    let mut doc = Document::from_text("Café AED");
    // Byte 4 is the middle of "é".
    let stats = annotate(&mut doc, &[issue_at(4, "x")]);
    assert_eq!(stats.applied, 0);
    assert_eq!(stats.skipped, vec![4]);
    assert!(!doc.paragraphs[0].edited);
    assert_eq!(doc.full_text(), "Café AED");
}
