use crate::catalog::Resource;
use crate::classify::extract_keywords;

/// Resources whose category or label contains any keyword of `document_type`.
pub fn find_related_resources<'a>(document_type: &str, resources: &'a [Resource]) -> Vec<&'a Resource> {
    let keywords = extract_keywords(document_type);
    resources
        .iter()
        .filter(|r| {
            let category = r.category.to_lowercase();
            let label = r.document_type.to_lowercase();
            keywords.iter().any(|k| category.contains(k.as_str()) || label.contains(k.as_str()))
        })
        .collect()
}

/// Resources grouped by category, categories in first-seen order.
pub fn group_resources_by_category(resources: &[Resource]) -> Vec<(String, Vec<&Resource>)> {
    let mut groups: Vec<(String, Vec<&Resource>)> = Vec::new();
    for r in resources {
        match groups.iter_mut().find(|(name, _)| name == &r.category) {
            Some((_, items)) => items.push(r),
            None => groups.push((r.category.clone(), vec![r])),
        }
    }
    groups
}
