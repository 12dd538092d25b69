use std::fs;

use adgm_doc_review::config::{check_threshold, parse_config, DEFAULT_INPUT_GLOB, DEFAULT_OUTPUT_DIR};
use adgm_doc_review::{validate_config, ConfigError, ReviewConfig, PROCESS_MATCH_THRESHOLD};

const VALID: &str = r#"
id: formation-batch
datasources:
  - name: uploads
    path: ./uploads/**/*.docx
outputs:
  dir: ./reviewed
review:
  catalog: ./catalog.yaml
  process_threshold: 0.5
"#;

#[test]
fn valid_config_is_accepted() {
    let cfg = parse_config(VALID).expect("valid config");
    assert_eq!(cfg.id, "formation-batch");
    assert_eq!(cfg.input_glob(), "./uploads/**/*.docx");
    assert_eq!(cfg.output_dir(), "./reviewed");
    assert_eq!(cfg.catalog_path().as_deref(), Some("./catalog.yaml"));
    assert_eq!(cfg.process_threshold(), 0.5);
}

#[test]
fn review_section_is_optional() {
    let raw = "id: x\ndatasources:\n  - path: ./in/*.txt\noutputs:\n  dir: ./out\n";
    let cfg = parse_config(raw).unwrap();
    assert_eq!(cfg.process_threshold(), PROCESS_MATCH_THRESHOLD);
    assert!(cfg.catalog_path().is_none());
}

#[test]
fn missing_paths_are_invalid() {
    let err = parse_config("id: x\noutputs:\n  dir: ./out\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn blank_id_is_invalid() {
    let err = parse_config("id: '  '\ndatasources:\n  - path: a\noutputs:\n  dir: b\n").unwrap_err();
    assert_eq!(err.to_string(), "Invalid config: missing id");
}

#[test]
fn threshold_out_of_range_is_invalid() {
    let raw = "id: x\ndatasources:\n  - path: a\noutputs:\n  dir: b\nreview:\n  process_threshold: 1.5\n";
    assert!(matches!(parse_config(raw), Err(ConfigError::Invalid(_))));
}

#[test]
fn unparsable_yaml_is_parse_error() {
    assert!(matches!(parse_config("id: [unclosed"), Err(ConfigError::Parse(_))));
}

#[test]
fn validate_config_reads_file() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("review.yaml");
    fs::write(&path, VALID).unwrap();
    assert_eq!(validate_config(&path).unwrap().id, "formation-batch");

    let err = validate_config(&td.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read(_)));
}

#[test]
fn default_config_uses_default_locations() {
    let cfg = ReviewConfig::default();
    assert_eq!(cfg.input_glob(), DEFAULT_INPUT_GLOB);
    assert_eq!(cfg.output_dir(), DEFAULT_OUTPUT_DIR);
    assert_eq!(cfg.process_threshold(), PROCESS_MATCH_THRESHOLD);
}

#[test]
fn threshold_flag_values_are_checked() {
    assert_eq!(check_threshold(0.0).unwrap(), 0.0);
    assert_eq!(check_threshold(1.0).unwrap(), 1.0);
    assert!(matches!(check_threshold(f64::NAN), Err(ConfigError::Invalid(_))));
    assert!(matches!(check_threshold(-0.1), Err(ConfigError::Invalid(_))));
    assert!(matches!(check_threshold(2.0), Err(ConfigError::Invalid(_))));
}
