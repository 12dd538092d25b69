use std::fs;

use adgm_doc_review::catalog::{
    load_catalog, Catalog, CatalogError, Rule, RuleCatalog, RuleGroupSpec, RuleSpec, Severity, GENERAL,
    MAX_PROBATION_MONTHS, UBO_OWNERSHIP_THRESHOLD_PERCENT,
};

fn spec(pattern: &str) -> RuleSpec {
    RuleSpec {
        pattern: pattern.to_string(),
        issue: "Test issue".to_string(),
        severity: Severity::Low,
        regulation: "Test Regulation".to_string(),
        not_followed_by: None,
        not_preceded_by: None,
    }
}

#[test]
fn rules_for_known_type_returns_type_rules() {
    let catalog = Catalog::builtin().expect("builtin catalog compiles");
    let rules = catalog.rules.rules_for("Articles of Association");
    assert_eq!(rules.len(), 3);
    assert!(rules[0].spec.pattern.contains("UAE Federal"));
    assert_eq!(rules[1].spec.issue, "Share capital must be denominated in USD");
}

#[test]
fn rules_for_unknown_type_falls_back_to_general() {
    let catalog = Catalog::builtin().unwrap();
    let general = catalog.rules.general();
    let rules = catalog.rules.rules_for("Unknown Document");
    assert_eq!(rules.len(), general.len());
    assert_eq!(rules[0].spec.issue, general[0].spec.issue);
    assert!(catalog.rules.has_group(GENERAL));
}

#[test]
fn rules_for_without_general_group_is_empty() {
    let rules = RuleCatalog::compile(&[RuleGroupSpec { document_type: "Only".into(), rules: vec![spec("x")] }]).unwrap();
    assert!(rules.rules_for("Other").is_empty());
    assert_eq!(rules.rules_for("Only").len(), 1);
}

#[test]
fn threshold_constants_feed_patterns() {
    let catalog = Catalog::builtin().unwrap();
    let ubo = &catalog.rules.rules_for("UBO Declaration Form")[0];
    assert!(ubo.spec.pattern.ends_with(&format!("{}%", UBO_OWNERSHIP_THRESHOLD_PERCENT)));
    assert_eq!(ubo.find_iter("The beneficial owner holds more than 25% of the shares").count(), 1);
    assert_eq!(ubo.find_iter("The beneficial owner holds more than 10% of the shares").count(), 0);

    let probation = &catalog.rules.rules_for("Employment Contract")[1];
    assert!(probation.spec.pattern.contains(&format!("{} month", MAX_PROBATION_MONTHS)));
}

#[test]
fn preceded_guard_rejects_match() {
    let rule = Rule::compile(RuleSpec { not_preceded_by: Some("Abu Dhabi ".into()), ..spec("Global Market") }).unwrap();
    assert_eq!(rule.find_iter("situated in Abu Dhabi Global Market").count(), 0);
    assert_eq!(rule.find_iter("situated in abu dhabi global market").count(), 0);
    assert_eq!(rule.find_iter("the Global Market authority").count(), 1);
}

#[test]
fn followed_guard_only_looks_at_the_same_line() {
    let rule = Rule::compile(RuleSpec { not_followed_by: Some(".*in USD".into()), ..spec("share capital") }).unwrap();
    assert_eq!(rule.find_iter("The share capital is denominated in USD").count(), 0);
    assert_eq!(rule.find_iter("The share capital is fixed.\nPayable in USD").count(), 1);
}

#[test]
fn invalid_pattern_is_reported() {
    let err = RuleCatalog::compile(&[RuleGroupSpec { document_type: GENERAL.into(), rules: vec![spec("(unclosed")] }])
        .unwrap_err();
    match err {
        CatalogError::InvalidPattern(msg) => assert!(msg.contains("(unclosed")),
        other => panic!("expected InvalidPattern, got {:?}", other),
    }
}

#[test]
fn duplicate_rule_group_is_rejected() {
    let group = RuleGroupSpec { document_type: GENERAL.into(), rules: vec![spec("x")] };
    let err = RuleCatalog::compile(&[group.clone(), group]).unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
}

#[test]
fn yaml_catalog_replaces_builtin_tables() {
    let raw = r#"
categories:
  - name: Test Process
    documents: [Alpha Charter, Beta Ledger]
rules:
  - document_type: General
    rules:
      - pattern: forbidden
        issue: Forbidden word
        severity: Low
        regulation: Test Reg 1
"#;
    let catalog = Catalog::from_yaml_str(raw).unwrap();
    assert_eq!(catalog.categories.len(), 1);
    assert!(catalog.resources.is_empty());
    let rules = catalog.rules.rules_for("Alpha Charter");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].spec.severity, Severity::Low);
}

#[test]
fn catalog_without_categories_is_invalid() {
    let err = Catalog::from_yaml_str("categories: []\nrules: []\n").unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
}

#[test]
fn dumped_builtin_catalog_loads_from_file() {
    let builtin = Catalog::builtin().unwrap();
    let yaml = serde_yaml::to_string(&builtin.to_spec()).unwrap();
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("catalog.yaml");
    fs::write(&path, yaml).unwrap();

    let loaded = load_catalog(&path).expect("dumped catalog loads");
    assert_eq!(loaded.to_spec(), builtin.to_spec());
}

#[test]
fn missing_catalog_file_is_read_error() {
    let err = load_catalog(std::path::Path::new("./does/not/exist.yaml")).unwrap_err();
    assert!(matches!(err, CatalogError::Read(_)));
}
