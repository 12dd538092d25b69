use std::path::{Path, PathBuf};

use adgm_doc_review::{
    build_report, emit_outputs, enumerate_documents, find_related_resources, group_resources_by_category, infer_process,
    load_catalog, process_batch, render_summary, report_fingerprint, validate_config, Catalog, EnumerateError,
    DocumentFailure, ReviewConfig, Upload,
};
use adgm_doc_review::config::check_threshold;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "adgm-review", about = "Review ADGM corporate documents for regulatory red flags")]
struct Cli {
    /// Run configuration (review.yaml); used when present
    #[arg(long, default_value = "review.yaml")]
    config: PathBuf,

    /// Glob of documents to review (overrides the config)
    #[arg(long)]
    input: Option<String>,

    /// Output directory (overrides the config)
    #[arg(long)]
    output: Option<String>,

    /// YAML rule catalog replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Minimum match fraction for a process to be identified
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the official resource links grouped by category and exit
    #[arg(long)]
    list_resources: bool,

    /// Print the active catalog as YAML and exit
    #[arg(long)]
    dump_catalog: bool,
}

fn event(value: serde_json::Value) {
    eprintln!("{}", value);
}

fn main() {
    let cli = Cli::parse();

    // 1) Config: explicit or present review.yaml, otherwise defaults
    let cfg = if cli.config.exists() {
        match validate_config(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                event(serde_json::json!({
                    "tool": "validate_config",
                    "file": cli.config,
                    "error": e.to_string(),
                    "error_code": 3
                }));
                std::process::exit(3);
            }
        }
    } else {
        ReviewConfig::default()
    };
    let input_glob = cli.input.clone().unwrap_or_else(|| cfg.input_glob());
    let output_dir = cli.output.clone().unwrap_or_else(|| cfg.output_dir());
    let threshold = match check_threshold(cli.threshold.unwrap_or_else(|| cfg.process_threshold())) {
        Ok(t) => t,
        Err(e) => {
            event(serde_json::json!({
                "tool": "validate_config",
                "flag": "--threshold",
                "error": e.to_string(),
                "error_code": 3
            }));
            std::process::exit(3);
        }
    };
    event(serde_json::json!({
        "tool": "validate_config",
        "file": cli.config,
        "status": "ok",
        "input_glob": input_glob,
        "output_dir": output_dir,
        "process_threshold": threshold
    }));

    // 2) Catalog
    let catalog_path = cli.catalog.clone().or_else(|| cfg.catalog_path().map(PathBuf::from));
    let catalog = match &catalog_path {
        Some(p) => load_catalog(p),
        None => Catalog::builtin(),
    };
    let catalog = match catalog {
        Ok(c) => c,
        Err(e) => {
            event(serde_json::json!({
                "tool": "load_catalog",
                "file": catalog_path,
                "error": e.to_string(),
                "error_code": 4
            }));
            std::process::exit(4);
        }
    };
    event(serde_json::json!({
        "tool": "load_catalog",
        "source": catalog_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "builtin".to_string()),
        "categories": catalog.categories.len(),
        "rule_groups": catalog.rules.groups().len(),
        "resources": catalog.resources.len()
    }));

    if cli.dump_catalog {
        match serde_yaml::to_string(&catalog.to_spec()) {
            Ok(s) => print!("{}", s),
            Err(e) => {
                event(serde_json::json!({"tool": "dump_catalog", "error": e.to_string(), "error_code": 4}));
                std::process::exit(4);
            }
        }
        return;
    }

    if cli.list_resources {
        for (category, resources) in group_resources_by_category(&catalog.resources) {
            println!("{} ({} resources)", category, resources.len());
            for r in resources {
                println!("  - {}: {}", r.document_type, r.link);
            }
        }
        return;
    }

    // 3) Enumerate inputs
    let files = match enumerate_documents(&input_glob) {
        Ok(files) => files,
        Err(EnumerateError::NoFilesFound { guidance }) => {
            event(serde_json::json!({
                "tool": "enumerate_documents",
                "error": "NoFilesFound",
                "error_code": 1
            }));
            eprintln!("{}", guidance);
            std::process::exit(1);
        }
    };
    event(serde_json::json!({"tool": "enumerate_documents", "count": files.len()}));

    // 4) Read, review, annotate
    let mut uploads = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for file in &files {
        match Upload::from_path(file) {
            Ok(u) => uploads.push(u),
            Err(e) => unreadable.push(DocumentFailure {
                filename: file.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    let mut outcome = process_batch(&uploads, &catalog);
    outcome.failures.extend(unreadable);
    for doc in &outcome.documents {
        event(serde_json::json!({
            "tool": "review_document",
            "file": doc.name,
            "document_type": doc.document_type,
            "category": doc.category,
            "issues": doc.issues_count,
            "sha256": doc.sha256
        }));
        if !doc.annotation.skipped.is_empty() {
            event(serde_json::json!({
                "tool": "annotate",
                "file": doc.name,
                "warning": "offset_outside_paragraphs",
                "skipped_offsets": doc.annotation.skipped
            }));
        }
        let related: Vec<&str> = find_related_resources(&doc.document_type, &catalog.resources)
            .into_iter()
            .map(|r| r.link.as_str())
            .collect();
        if !related.is_empty() {
            event(serde_json::json!({"tool": "related_resources", "file": doc.name, "links": related}));
        }
    }
    for failure in &outcome.failures {
        event(serde_json::json!({
            "tool": "review_document",
            "file": failure.filename,
            "error": failure.message
        }));
    }

    // 5) Process inference and report
    let inference = infer_process(&outcome.recognized, &catalog.categories, threshold);
    event(serde_json::json!({
        "tool": "infer_process",
        "process": inference.process,
        "match_fraction": inference.matched.match_fraction,
        "missing": inference.matched.missing_docs
    }));

    let report = build_report(&outcome, &inference);
    let emitted = emit_outputs(&report, &outcome.documents, &output_dir)
        .and_then(|paths| report_fingerprint(&report).map(|fingerprint| (paths, fingerprint)));
    match emitted {
        Ok((paths, fingerprint)) => {
            event(serde_json::json!({
                "tool": "emit_outputs",
                "report_path": paths.report_path,
                "documents": paths.document_paths,
                "report_fingerprint": fingerprint
            }));
        }
        Err(e) => {
            event(serde_json::json!({
                "tool": "emit_outputs",
                "dir": Path::new(&output_dir),
                "error": e.to_string(),
                "error_code": 6
            }));
            std::process::exit(6);
        }
    }

    println!("{}", render_summary(&report));
}
