use configuration::{CategoryRule, CategorySettings};
use core_types::split_multi_value;

/// Assigns free-text product/service labels to a canonical parent category.
///
/// Rules are checked in table order and the first match wins, so the order of
/// the table is part of its meaning: narrower categories must precede broader
/// ones sharing the same tokens.
#[derive(Debug, Clone)]
pub struct CategoryInference {
    rules: Vec<CompiledRule>,
    fallback: String,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    parent: String,
    keywords: Vec<String>,
}

impl CategoryInference {
    pub fn new(settings: &CategorySettings) -> Self {
        Self::from_rules(&settings.rules, &settings.fallback)
    }

    pub fn from_rules(rules: &[CategoryRule], fallback: &str) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                parent: rule.parent.clone(),
                // An empty keyword would match every label.
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| normalize_label(k))
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            rules,
            fallback: fallback.to_string(),
        }
    }

    /// The parent category of a single label.
    pub fn infer(&self, label: &str) -> &str {
        let normalized = normalize_label(label);
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| normalized.contains(k.as_str())))
            .map(|rule| rule.parent.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Splits a raw multi-value field and infers a parent for every label.
    pub fn infer_all<'a>(&'a self, raw: &'a str) -> Vec<(&'a str, &'a str)> {
        split_multi_value(raw)
            .into_iter()
            .map(|label| (label, self.infer(label)))
            .collect()
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Parent names in evaluation order. A parent may appear more than once.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.parent.as_str())
    }
}

impl Default for CategoryInference {
    fn default() -> Self {
        Self::new(&CategorySettings::default())
    }
}

/// Whitespace-free, lowercased form used for keyword matching.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
