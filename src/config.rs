//! Configuration management for textnerl using the prefer crate.
//!
//! Configuration is read once at process start and shared read-only
//! afterwards. Missing sections fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AnalysisError;

pub const ENV_LINKER_ENDPOINT: &str = "TEXTNERL_LINKER_ENDPOINT";
pub const ENV_LINKER_BACKEND: &str = "TEXTNERL_LINKER_BACKEND";
pub const ENV_BIND: &str = "TEXTNERL_BIND";

/// Which entity linker backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkerBackend {
    /// Remote DBpedia Spotlight service.
    #[default]
    Spotlight,
    /// Built-in offline gazetteer.
    Gazetteer,
}

impl std::str::FromStr for LinkerBackend {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spotlight" => Ok(Self::Spotlight),
            "gazetteer" => Ok(Self::Gazetteer),
            other => Err(AnalysisError::configuration(format!(
                "unknown linker backend '{}' (expected spotlight or gazetteer)",
                other
            ))),
        }
    }
}

/// Entity linking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    pub backend: LinkerBackend,
    /// Base URL of the Spotlight REST API.
    pub endpoint: String,
    /// Minimum disambiguation confidence, 0 to 1.
    pub confidence: f64,
    /// Ask for every candidate instead of the best resource.
    pub all_candidates: bool,
    pub timeout_secs: u64,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            backend: LinkerBackend::Spotlight,
            endpoint: "http://localhost:2222/rest".to_string(),
            confidence: 0.35,
            all_candidates: false,
            timeout_secs: 30,
        }
    }
}

impl LinkerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Keyphrase extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyphraseConfig {
    pub language: String,
    /// One keyphrase per this many words.
    pub ratio: usize,
}

impl Default for KeyphraseConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            ratio: 80,
        }
    }
}

/// Link validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Links scoring at least this much are confirmed without a named entity.
    pub min_similarity: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.9,
        }
    }
}

/// Search-index query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Index field holding linked entity URIs.
    pub linked_field: String,
    /// Index field holding named entity texts.
    pub ner_field: String,
    /// Key of the combined query under "solr".
    pub name: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            linked_field: "meta.extracted.text_nerl.dbpedia.all".to_string(),
            ner_field: "meta.extracted.text_nerl.ner.all".to_string(),
            name: "similarity".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3030".to_string(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub linker: LinkerConfig,
    pub keyphrase: KeyphraseConfig,
    pub validator: ValidatorConfig,
    pub query: QueryConfig,
    pub server: ServerConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no textnerl config file is found.
    pub async fn load() -> Result<Self, AnalysisError> {
        match prefer::load("textnerl").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default_with_env()),
            },
            Err(_) => Ok(Self::default_with_env()),
        }
    }

    /// Defaults with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// The format is chosen by extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, AnalysisError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AnalysisError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| {
                AnalysisError::configuration(format!("Failed to parse TOML config: {}", e))
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                AnalysisError::configuration(format!("Failed to parse YAML config: {}", e))
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| {
                AnalysisError::configuration(format!("Failed to parse JSON config: {}", e))
            })?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    /// Apply `TEXTNERL_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(endpoint) = env_value(ENV_LINKER_ENDPOINT) {
            self.linker.endpoint = endpoint;
        }
        if let Some(backend) = env_value(ENV_LINKER_BACKEND) {
            match backend.parse() {
                Ok(backend) => self.linker.backend = backend,
                Err(e) => tracing::warn!("Ignoring {}: {}", ENV_LINKER_BACKEND, e),
            }
        }
        if let Some(bind) = env_value(ENV_BIND) {
            self.server.bind = bind;
        }
        self
    }

    /// Check settings that would otherwise fail later at request time.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let mut problems = Vec::new();

        if let Err(e) = Url::parse(&self.linker.endpoint) {
            problems.push(format!(
                "linker.endpoint '{}' is not a URL: {}",
                self.linker.endpoint, e
            ));
        }
        if !(0.0..=1.0).contains(&self.linker.confidence) {
            problems.push(format!(
                "linker.confidence must be between 0 and 1, got {}",
                self.linker.confidence
            ));
        }
        if self.linker.timeout_secs == 0 {
            problems.push("linker.timeout_secs must be positive".to_string());
        }
        if self.keyphrase.ratio == 0 {
            problems.push("keyphrase.ratio must be positive".to_string());
        }
        if self.keyphrase.language != "en" {
            problems.push(format!(
                "keyphrase.language '{}' is not supported (only 'en')",
                self.keyphrase.language
            ));
        }
        if !(0.0..=1.0).contains(&self.validator.min_similarity) {
            problems.push(format!(
                "validator.min_similarity must be between 0 and 1, got {}",
                self.validator.min_similarity
            ));
        }
        for (key, value) in [
            ("query.linked_field", &self.query.linked_field),
            ("query.ner_field", &self.query.ner_field),
            ("query.name", &self.query.name),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{} must not be empty", key));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::configuration(problems.join("; ")))
        }
    }

    /// Serialize as pretty TOML for display.
    pub fn to_toml(&self) -> Result<String, AnalysisError> {
        toml::to_string_pretty(self)
            .map_err(|e| AnalysisError::configuration(format!("Failed to serialize config: {}", e)))
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.linker.backend, LinkerBackend::Spotlight);
        assert_eq!(config.linker.endpoint, "http://localhost:2222/rest");
        assert_eq!(config.linker.confidence, 0.35);
        assert!(!config.linker.all_candidates);
        assert_eq!(config.keyphrase.ratio, 80);
        assert_eq!(config.keyphrase.language, "en");
        assert_eq!(config.query.name, "similarity");
        assert_eq!(config.server.bind, "127.0.0.1:3030");
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_toml_partial() {
        let file = write_config(
            ".toml",
            r#"
[linker]
backend = "gazetteer"
confidence = 0.5

[keyphrase]
ratio = 40
"#,
        );
        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.linker.backend, LinkerBackend::Gazetteer);
        assert_eq!(config.linker.confidence, 0.5);
        assert_eq!(config.linker.timeout_secs, 30);
        assert_eq!(config.keyphrase.ratio, 40);
        assert_eq!(config.validator.min_similarity, 0.9);
        assert_eq!(config.source_path.as_deref(), Some(file.path()));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let yaml = write_config(".yaml", "query:\n  name: related\n");
        let config = Config::load_from_path(yaml.path()).await.unwrap();
        assert_eq!(config.query.name, "related");
        assert_eq!(config.query.ner_field, "meta.extracted.text_nerl.ner.all");

        let json = write_config(".json", r#"{"validator": {"min_similarity": 0.75}}"#);
        let config = Config::load_from_path(json.path()).await.unwrap();
        assert_eq!(config.validator.min_similarity, 0.75);
    }

    #[tokio::test]
    async fn test_load_rejects_bad_file() {
        let file = write_config(".toml", "[linker\nbackend = ");
        let err = Config::load_from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));

        let missing = Config::load_from_path(Path::new("/nonexistent/textnerl.toml"))
            .await
            .unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_collects_problems() {
        let mut config = Config::default();
        config.linker.endpoint = "localhost without scheme".to_string();
        config.linker.confidence = 1.5;
        config.keyphrase.ratio = 0;
        config.keyphrase.language = "de".to_string();
        config.query.ner_field = " ".to_string();

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("linker.endpoint"));
        assert!(message.contains("linker.confidence"));
        assert!(message.contains("keyphrase.ratio"));
        assert!(message.contains("keyphrase.language"));
        assert!(message.contains("query.ner_field"));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "Gazetteer".parse::<LinkerBackend>().unwrap(),
            LinkerBackend::Gazetteer
        );
        assert!("stanford".parse::<LinkerBackend>().is_err());
    }

    #[test]
    fn test_to_toml_round_trips_sections() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("[linker]"));
        assert!(rendered.contains("backend = \"spotlight\""));
        assert!(!rendered.contains("source_path"));
    }
}
