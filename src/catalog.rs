use std::path::Path;

use regex::{Match, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the rule group applied to every document.
pub const GENERAL: &str = "General";

/// Minimum match fraction (exclusive) for a batch to be attributed to a process.
pub const PROCESS_MATCH_THRESHOLD: f64 = 0.3;

/// Ownership/control percentage that makes someone an ultimate beneficial owner.
pub const UBO_OWNERSHIP_THRESHOLD_PERCENT: u32 = 25;

/// Longest probation period allowed by the Employment Regulations.
pub const MAX_PROBATION_MONTHS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub category: String,
    pub document_type: String,
    pub link: String,
}

/// Serialisable form of a rule, as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub issue: String,
    pub severity: Severity,
    pub regulation: String,
    /// Reject a match when the text right after it matches this pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_followed_by: Option<String>,
    /// Reject a match when the text right before it matches this pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_preceded_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroupSpec {
    pub document_type: String,
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub categories: Vec<Category>,
    pub rules: Vec<RuleGroupSpec>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Read(String),
    #[error("Failed to parse catalog: {0}")]
    Parse(String),
    #[error("InvalidPattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// A compiled rule. Patterns are case-insensitive.
#[derive(Debug, Clone)]
pub struct Rule {
    pub spec: RuleSpec,
    pattern: Regex,
    not_followed_by: Option<Regex>,
    not_preceded_by: Option<Regex>,
}

impl Rule {
    pub fn compile(spec: RuleSpec) -> Result<Rule, CatalogError> {
        let pattern = case_insensitive(&spec.pattern)?;
        let not_followed_by = match &spec.not_followed_by {
            Some(p) => Some(case_insensitive(&format!("^(?:{})", p))?),
            None => None,
        };
        let not_preceded_by = match &spec.not_preceded_by {
            Some(p) => Some(case_insensitive(&format!("(?:{})$", p))?),
            None => None,
        };
        Ok(Rule { spec, pattern, not_followed_by, not_preceded_by })
    }

    /// Non-overlapping matches in `text`, minus those rejected by the guards.
    pub fn find_iter<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Match<'t>> + 't {
        self.pattern.find_iter(text).filter(move |m| {
            let followed = self.not_followed_by.as_ref().map_or(false, |g| g.is_match(&text[m.end()..]));
            let preceded = self.not_preceded_by.as_ref().map_or(false, |g| g.is_match(&text[..m.start()]));
            !followed && !preceded
        })
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CatalogError::InvalidPattern(format!("{}: {}", pattern, e)))
}

#[derive(Debug, Clone)]
pub struct RuleGroup {
    pub document_type: String,
    pub rules: Vec<Rule>,
}

/// Rules grouped by document type name, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    groups: Vec<RuleGroup>,
}

impl RuleCatalog {
    pub fn compile(specs: &[RuleGroupSpec]) -> Result<RuleCatalog, CatalogError> {
        let mut groups: Vec<RuleGroup> = Vec::with_capacity(specs.len());
        for spec in specs {
            if groups.iter().any(|g| g.document_type == spec.document_type) {
                return Err(CatalogError::Invalid(format!("duplicate rule group: {}", spec.document_type)));
            }
            let rules = spec
                .rules
                .iter()
                .cloned()
                .map(Rule::compile)
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(RuleGroup { document_type: spec.document_type.clone(), rules });
        }
        Ok(RuleCatalog { groups })
    }

    fn group(&self, document_type: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.document_type == document_type)
    }

    pub fn has_group(&self, document_type: &str) -> bool {
        self.group(document_type).is_some()
    }

    /// Type-specific rules when `document_type` has a group, otherwise the General rules.
    pub fn rules_for(&self, document_type: &str) -> &[Rule] {
        match self.group(document_type) {
            Some(g) => &g.rules,
            None => self.general(),
        }
    }

    pub fn general(&self) -> &[Rule] {
        self.group(GENERAL).map(|g| g.rules.as_slice()).unwrap_or(&[])
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    pub fn to_spec(&self) -> Vec<RuleGroupSpec> {
        self.groups
            .iter()
            .map(|g| RuleGroupSpec {
                document_type: g.document_type.clone(),
                rules: g.rules.iter().map(|r| r.spec.clone()).collect(),
            })
            .collect()
    }
}

/// Everything the pipeline reads: requirement lists, rules and resource links.
/// Built once and passed by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub rules: RuleCatalog,
    pub resources: Vec<Resource>,
}

impl Catalog {
    pub fn from_spec(spec: CatalogSpec) -> Result<Catalog, CatalogError> {
        if spec.categories.is_empty() {
            return Err(CatalogError::Invalid("no categories".into()));
        }
        for c in &spec.categories {
            if c.name.trim().is_empty() {
                return Err(CatalogError::Invalid("category without name".into()));
            }
        }
        let rules = RuleCatalog::compile(&spec.rules)?;
        Ok(Catalog { categories: spec.categories, rules, resources: spec.resources })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Catalog, CatalogError> {
        let spec: CatalogSpec = serde_yaml::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Catalog::from_spec(spec)
    }

    /// The ADGM tables shipped with the tool.
    pub fn builtin() -> Result<Catalog, CatalogError> {
        Catalog::from_spec(builtin_spec())
    }

    pub fn to_spec(&self) -> CatalogSpec {
        CatalogSpec {
            categories: self.categories.clone(),
            rules: self.rules.to_spec(),
            resources: self.resources.clone(),
        }
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Load a catalog override from a YAML file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Read(e.to_string()))?;
    Catalog::from_yaml_str(&raw)
}

const DOCUMENT_REQUIREMENTS: &[(&str, &[&str])] = &[
    (
        "Company Formation",
        &[
            "Articles of Association",
            "Memorandum of Association",
            "Board Resolution",
            "Shareholder Resolution",
            "Incorporation Application Form",
            "UBO Declaration Form",
            "Register of Members and Directors",
            "Change of Registered Address Notice",
        ],
    ),
    (
        "Licensing Regulatory Filings",
        &[
            "Application for Commercial License",
            "Regulatory Business Plan",
            "Business Activity Details",
            "Data Protection Notification Form",
            "Fitness and Propriety Form",
        ],
    ),
    (
        "Employment HR Contracts",
        &[
            "Employment Contract",
            "Employee Handbook",
            "Confidentiality Agreement",
            "Non-Disclosure Agreement",
            "Termination Letter Template",
        ],
    ),
    (
        "Commercial Agreements",
        &[
            "Service Level Agreement",
            "Non-Disclosure Agreement",
            "Joint Venture Agreement",
            "Supplier Agreement",
            "Client Contract Template",
        ],
    ),
    (
        "Compliance Risk Policies",
        &[
            "Anti-Money Laundering Policy",
            "Risk Management Framework",
            "Compliance Manual",
            "Data Protection Policy",
            "Business Continuity Plan",
        ],
    ),
];

// (pattern, issue, severity, regulation)
type RuleRow = (&'static str, &'static str, Severity, &'static str);

const ARTICLES_RULES: &[RuleRow] = &[
    (r"UAE Federal (Court|law)", "Incorrect jurisdiction (should reference ADGM Courts)", Severity::High, "ADGM Companies Regulations 2020, Art. 4"),
    (r"director.{1,20}(not less than|minimum|at least) (\d+)", "ADGM requires at least one director who is a natural person", Severity::High, "ADGM Companies Regulations 2020, Art. 143"),
];

const MEMORANDUM_RULES: &[RuleRow] = &[
    (r"Dubai|Sharjah|Ajman|Umm Al Quwain|Fujairah|Ras Al Khaimah", "Incorrect reference to other UAE Emirates", Severity::Medium, "ADGM Companies Regulations 2020"),
    (r"UAE Ministry", "References to UAE Ministry may be incorrect as ADGM has its own regulatory framework", Severity::Medium, "ADGM Founding Law (Abu Dhabi Law No. 4 of 2013)"),
];

const EMPLOYMENT_RULES: &[RuleRow] = &[
    (r"UAE Labour Law", "ADGM has its own Employment Regulations", Severity::High, "ADGM Employment Regulations 2019"),
];

const BOARD_RESOLUTION_RULES: &[RuleRow] = &[
    (r"approve.{1,50}dividend.{1,50}", "Dividend declaration must include solvency statement", Severity::High, "ADGM Companies Regulations 2020, Art. 107"),
    (r"electronic signature", "Validate electronic signature compliance with ADGM Electronic Transactions Regulations", Severity::Medium, "ADGM Electronic Transactions Regulations 2021"),
];

const GENERAL_RULES: &[RuleRow] = &[
    (r"(Dubai|Ajman|Sharjah|UAE).{1,20}court", "Incorrect jurisdiction (should be ADGM Courts)", Severity::High, "ADGM Courts Regulations 2015"),
    (r"UAE dirham|AED|Dirham", "Currency should be USD for ADGM companies", Severity::Medium, "ADGM Commercial Licensing Regulations 2015, Art. 12"),
];

const RESOURCES: &[(&str, &str, &str)] = &[
    ("Company Formation & Governance", "General Incorporation, AoA, MoA, Registers, UBO, Board Resolutions", "https://www.adgm.com/registration-authority/registration-and-incorporation"),
    ("Company Formation", "Resolution for Incorporation (LTD - Multiple Shareholders)", "https://assets.adgm.com/download/assets/adgm-ra-resolution-multiple-incorporate-shareholders-LTD-incorporation-v2.docx/186a12846c3911efa4e6c6223862cd87"),
    ("Company Formation & Compliance", "Incorporation, SPV, LLC, Other Forms & Templates", "https://www.adgm.com/setting-up"),
    ("Policy & Guidance", "Guidance, Templates, Policy Statements", "https://www.adgm.com/legal-framework/guidance-and-policy-statements"),
    ("ADGM Company Set-up", "Checklist – Company Set-up (Various Entities)", "https://www.adgm.com/documents/registration-authority/registration-and-incorporation/checklist/branch-non-financial-services-20231228.pdf"),
    ("ADGM Company Set-up", "Checklist – Private Company Limited", "https://www.adgm.com/documents/registration-authority/registration-and-incorporation/checklist/private-company-limited-by-guarantee-non-financial-services-20231228.pdf"),
    ("Employment & HR", "Standard Employment Contract Template (2024 update)", "https://assets.adgm.com/download/assets/ADGM+Standard+Employment+Contract+Template+-+ER+2024+(Feb+2025).docx/ee14b252edbe11efa63b12b3a30e5e3a"),
    ("Employment & HR", "Standard Employment Contract Template (2019 short version)", "https://assets.adgm.com/download/assets/ADGM+Standard+Employment+Contract+-+ER+2019+-+Short+Version+(May+2024).docx/33b57a92ecfe11ef97a536cc36767ef8"),
    ("Data Protection", "Appropriate Policy Document Template", "https://www.adgm.com/documents/office-of-data-protection/templates/adgm-dpr-2021-appropriate-policy-document.pdf"),
    ("Compliance & Filings", "Annual Accounts & Filings", "https://www.adgm.com/operating-in-adgm/obligations-of-adgm-registered-entities/annual-filings/annual-accounts"),
    ("Letters/Permits", "Application for Official Letters & Permits", "https://www.adgm.com/operating-in-adgm/post-registration-services/letters-and-permits"),
    ("Regulatory Guidance", "Incorporation Package, Filings, Templates", "https://en.adgm.thomsonreuters.com/rulebook/7-company-incorporation-package"),
    ("Regulatory Template", "Shareholder Resolution – Amendment of Articles", "https://assets.adgm.com/download/assets/Templates_SHReso_AmendmentArticles-v1-20220107.docx/97120d7c5af911efae4b1e183375c0b2?forcedownload=1"),
];

fn rule(row: &RuleRow) -> RuleSpec {
    let (pattern, issue, severity, regulation) = *row;
    RuleSpec {
        pattern: pattern.to_string(),
        issue: issue.to_string(),
        severity,
        regulation: regulation.to_string(),
        not_followed_by: None,
        not_preceded_by: None,
    }
}

fn group(document_type: &str, rules: Vec<RuleSpec>) -> RuleGroupSpec {
    RuleGroupSpec { document_type: document_type.to_string(), rules }
}

fn builtin_rules() -> Vec<RuleGroupSpec> {
    let mut articles: Vec<RuleSpec> = ARTICLES_RULES.iter().map(rule).collect();
    articles.insert(
        1,
        RuleSpec {
            not_followed_by: Some(r".*denominated.*in (USD|US dollars|United States dollars)".to_string()),
            ..rule(&("share capital", "Share capital must be denominated in USD", Severity::High, "ADGM Companies Regulations 2020, Art. 8(2)"))
        },
    );

    let ubo = vec![
        RuleSpec {
            pattern: format!(r"beneficial owner.{{1,50}}{}%", UBO_OWNERSHIP_THRESHOLD_PERCENT),
            issue: format!("ADGM threshold for UBO is {}% ownership or control", UBO_OWNERSHIP_THRESHOLD_PERCENT),
            severity: Severity::High,
            regulation: "ADGM UBO Regulations 2019".to_string(),
            not_followed_by: None,
            not_preceded_by: None,
        },
        rule(&(r"shareholder.{1,30}legal.{1,30}beneficial", "Clear distinction between legal and beneficial ownership needed", Severity::Medium, "ADGM UBO Regulations 2019, Art. 6")),
    ];

    let mut employment: Vec<RuleSpec> = EMPLOYMENT_RULES.iter().map(rule).collect();
    employment.push(RuleSpec {
        pattern: format!(r"probation.{{1,20}}(more than|exceeding|over|above).{{1,5}}{} month", MAX_PROBATION_MONTHS),
        issue: format!("Probation period cannot exceed {} months under ADGM Employment Regulations", MAX_PROBATION_MONTHS),
        severity: Severity::High,
        regulation: "ADGM Employment Regulations 2019, Art. 8".to_string(),
        not_followed_by: None,
        not_preceded_by: None,
    });

    let mut general: Vec<RuleSpec> = GENERAL_RULES.iter().map(rule).collect();
    general.push(RuleSpec {
        not_preceded_by: Some("Abu Dhabi ".to_string()),
        ..rule(&("Global Market", "Incorrect reference to ADGM", Severity::Low, "ADGM Founding Law (Abu Dhabi Law No. 4 of 2013)"))
    });

    vec![
        group("Articles of Association", articles),
        group("Memorandum of Association", MEMORANDUM_RULES.iter().map(rule).collect()),
        group("UBO Declaration Form", ubo),
        group("Employment Contract", employment),
        group("Board Resolution", BOARD_RESOLUTION_RULES.iter().map(rule).collect()),
        group(GENERAL, general),
    ]
}

fn builtin_spec() -> CatalogSpec {
    let categories = DOCUMENT_REQUIREMENTS
        .iter()
        .map(|(name, docs)| Category {
            name: name.to_string(),
            documents: docs.iter().map(|d| d.to_string()).collect(),
        })
        .collect();
    let resources = RESOURCES
        .iter()
        .map(|(category, document_type, link)| Resource {
            category: category.to_string(),
            document_type: document_type.to_string(),
            link: link.to_string(),
        })
        .collect();
    CatalogSpec { categories, rules: builtin_rules(), resources }
}
