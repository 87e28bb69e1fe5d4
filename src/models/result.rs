//! Aggregated analysis output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical semantic buckets for classified entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Person,
    Location,
    Organization,
    Misc,
    City,
    Country,
    Other,
    /// Synthetic bucket holding every classified entity of a source.
    All,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Person => "person",
            Category::Location => "location",
            Category::Organization => "organization",
            Category::Misc => "misc",
            Category::City => "city",
            Category::Country => "country",
            Category::Other => "other",
            Category::All => "all",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity annotation together with the categories it was classified into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEntity {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "type")]
    pub raw_type: String,
    pub begin: usize,
    pub end: usize,
    #[serde(skip)]
    pub categories: Vec<Category>,
}

impl ClassifiedEntity {
    /// Value used for query construction: the linked URI when present, else the text.
    pub fn identifier(&self) -> &str {
        self.uri.as_deref().unwrap_or(&self.text)
    }
}

/// Per-source mapping from category to entities in encounter order.
pub type CategoryBuckets = BTreeMap<Category, Vec<ClassifiedEntity>>;

/// A ranked keyphrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyphraseEntity {
    pub text: String,
    pub keyphrase: String,
    #[serde(rename = "stemmed")]
    pub stem: String,
    pub rank: u32,
    pub probability: f64,
    pub begin: usize,
    pub end: usize,
}

/// Per-request result of the analysis engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Keyed by source name ("dbpedia", "stanford").
    #[serde(flatten)]
    pub sources: BTreeMap<String, CategoryBuckets>,
    /// Keyphrases sorted ascending by rank.
    pub kea: Vec<KeyphraseEntity>,
    /// Named query fragments for the search index.
    pub solr: BTreeMap<String, String>,
}

impl AnalysisResult {
    /// Entities of one source and category, empty when absent.
    pub fn bucket(&self, source: &str, category: Category) -> &[ClassifiedEntity] {
        self.sources
            .get(source)
            .and_then(|buckets| buckets.get(&category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let entity = ClassifiedEntity {
            text: "Berlin".to_string(),
            uri: None,
            raw_type: "LOCATION".to_string(),
            begin: 23,
            end: 29,
            categories: vec![Category::Location],
        };
        let mut buckets = CategoryBuckets::new();
        buckets.insert(Category::Location, vec![entity.clone()]);
        buckets.insert(Category::All, vec![entity]);

        let mut result = AnalysisResult::default();
        result.sources.insert("stanford".to_string(), buckets);
        result
            .solr
            .insert("similarity".to_string(), String::new());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stanford"]["location"][0]["text"], "Berlin");
        assert_eq!(json["stanford"]["all"][0]["type"], "LOCATION");
        assert!(json["stanford"]["all"][0].get("uri").is_none());
        assert!(json["stanford"]["all"][0].get("categories").is_none());
        assert!(json["kea"].as_array().unwrap().is_empty());
        assert_eq!(json["solr"]["similarity"], "");
    }

    #[test]
    fn test_keyphrase_field_names() {
        let k = KeyphraseEntity {
            text: "credit cards".to_string(),
            keyphrase: "credit cards".to_string(),
            stem: "credit card".to_string(),
            rank: 1,
            probability: 1.0,
            begin: 0,
            end: 12,
        };
        let json = serde_json::to_value(&k).unwrap();
        assert_eq!(json["stemmed"], "credit card");
        assert_eq!(json["rank"], 1);
    }

    #[test]
    fn test_bucket_lookup_missing() {
        let result = AnalysisResult::default();
        assert!(result.bucket("dbpedia", Category::Person).is_empty());
    }
}
