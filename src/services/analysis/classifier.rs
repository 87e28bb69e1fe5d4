//! Raw type string to canonical category mapping.
//!
//! Rules are regexes matched against the whole raw type. They are not
//! exclusive: "Schema:Place,DBpedia:City" is both a location and a city.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Category;

/// One pattern and the category it implies.
#[derive(Debug, Clone)]
pub struct TypeRule {
    pattern: Regex,
    category: Category,
}

impl TypeRule {
    /// Compile a rule; `pattern` must match the entire raw type.
    pub fn new(pattern: &str, category: Category) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            category,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn matches(&self, raw_type: &str) -> bool {
        self.pattern.is_match(raw_type)
    }
}

// Stanford labels (PERSON, I-PER), DBpedia ontology names (Person, Place,
// Organisation, City, Country).
const BUILTIN_PATTERNS: &[(&str, Category)] = &[
    (r"PERSON|I-PER|.*Person.*", Category::Person),
    (r"LOCATION|I-LOC|.*Place.*", Category::Location),
    (r"ORGANIZATION|I-ORG|.*Organisation.*", Category::Organization),
    (r"MISC|I-MISC", Category::Misc),
    (r".*City.*", Category::City),
    (r".*Country.*", Category::Country),
];

static BUILTIN_RULES: LazyLock<Vec<TypeRule>> = LazyLock::new(|| {
    BUILTIN_PATTERNS
        .iter()
        .map(|(pattern, category)| {
            TypeRule::new(pattern, *category).expect("built-in type pattern should compile")
        })
        .collect()
});

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    rules: Vec<TypeRule>,
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.clone(),
        }
    }
}

impl TypeClassifier {
    /// A classifier with no rules; everything is `Other`.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule for a new type vocabulary.
    pub fn with_rule(mut self, pattern: &str, category: Category) -> Result<Self, regex::Error> {
        self.rules.push(TypeRule::new(pattern, category)?);
        Ok(self)
    }

    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }

    /// Categories for a raw type in rule order, or `[Other]` when none match.
    ///
    /// Never returns `All`; the aggregator adds that bucket itself.
    pub fn classify(&self, raw_type: &str) -> Vec<Category> {
        let mut categories: Vec<Category> = Vec::new();
        for rule in &self.rules {
            if rule.category != Category::All
                && !categories.contains(&rule.category)
                && rule.matches(raw_type)
            {
                categories.push(rule.category);
            }
        }
        if categories.is_empty() {
            categories.push(Category::Other);
        }
        categories
    }
}
