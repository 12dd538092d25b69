use std::fs;
use std::path::PathBuf;

use adgm_doc_review::{enumerate_documents, EnumerateError};

#[test]
fn enumerate_documents_finds_nested_files() {
    let td = tempfile::tempdir().unwrap();
    let base = td.path();
    let formation = base.join("input/company-formation");
    fs::create_dir_all(&formation).unwrap();
    fs::write(formation.join("b-moa.docx"), b"PK").unwrap();
    fs::write(formation.join("a-aoa.docx"), b"PK").unwrap();
    fs::write(formation.join("notes.txt"), b"ignored").unwrap();

    let pattern = format!("{}/input/**/*.docx", base.display());
    let files = enumerate_documents(&pattern).expect("should find files");
    let files: Vec<PathBuf> = files.into_iter().map(|p| p.strip_prefix(base).unwrap().to_path_buf()).collect();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].to_string_lossy(), "input/company-formation/a-aoa.docx");
    assert_eq!(files[1].to_string_lossy(), "input/company-formation/b-moa.docx");
}

#[test]
fn enumerate_documents_empty_returns_error_with_guidance() {
    let td = tempfile::tempdir().unwrap();
    let pattern = format!("{}/input/**/*.docx", td.path().display());
    let err = enumerate_documents(&pattern).err().expect("should be error");
    assert_eq!(format!("{}", err), "NoFilesFound");
    let EnumerateError::NoFilesFound { guidance } = err;
    assert!(guidance.contains(&pattern));
    assert!(guidance.contains(".docx, .txt, .md"));
}
