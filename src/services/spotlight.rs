//! Client for a DBpedia-Spotlight-compatible entity linking service.
//!
//! Spotlight encodes every attribute as a string prefixed with `@`, and
//! collapses single-element lists into bare objects in `/candidates`
//! responses. Both quirks are absorbed here so callers only see
//! [`SpotlightResource`].

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::gazetteer::DBPEDIA_RESOURCE_PREFIX;

/// Errors talking to the linking service.
#[derive(Debug, Error)]
pub enum SpotlightError {
    #[error("Invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A resource the service linked to a surface form.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightResource {
    pub uri: String,
    pub surface_form: String,
    /// Character offset of the surface form in the submitted text.
    pub offset: usize,
    pub types: String,
    pub similarity: f64,
    pub support: u64,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(rename = "Resources", default)]
    resources: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(rename = "@URI")]
    uri: String,
    #[serde(rename = "@support", default)]
    support: String,
    #[serde(rename = "@types", default)]
    types: String,
    #[serde(rename = "@surfaceForm")]
    surface_form: String,
    #[serde(rename = "@offset")]
    offset: String,
    #[serde(rename = "@similarityScore", default)]
    similarity: String,
}

#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    annotation: CandidatesAnnotation,
}

#[derive(Debug, Deserialize)]
struct CandidatesAnnotation {
    #[serde(rename = "surfaceForm", default)]
    surface_forms: Option<OneOrMany<RawSurfaceForm>>,
}

#[derive(Debug, Deserialize)]
struct RawSurfaceForm {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@offset")]
    offset: String,
    #[serde(default)]
    resource: Option<OneOrMany<RawCandidate>>,
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(rename = "@uri")]
    uri: String,
    #[serde(rename = "@support", default)]
    support: String,
    #[serde(rename = "@types", default)]
    types: String,
    #[serde(rename = "@finalScore", default)]
    final_score: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

fn parse_number<T: std::str::FromStr + Default>(field: &str, value: &str) -> Result<T, SpotlightError> {
    if value.is_empty() {
        return Ok(T::default());
    }
    value
        .parse()
        .map_err(|_| SpotlightError::Parse(format!("{} is not a number: '{}'", field, value)))
}

/// Parse an `/annotate` response body.
pub fn parse_annotate(body: &str) -> Result<Vec<SpotlightResource>, SpotlightError> {
    let response: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| SpotlightError::Parse(e.to_string()))?;

    response
        .resources
        .into_iter()
        .map(|r| {
            Ok(SpotlightResource {
                offset: parse_number("@offset", &r.offset)?,
                similarity: parse_number("@similarityScore", &r.similarity)?,
                support: parse_number("@support", &r.support)?,
                uri: r.uri,
                surface_form: r.surface_form,
                types: r.types,
            })
        })
        .collect()
}

/// Parse a `/candidates` response body, one resource per candidate.
///
/// Candidate URIs are bare resource names and get the DBpedia prefix.
pub fn parse_candidates(body: &str) -> Result<Vec<SpotlightResource>, SpotlightError> {
    let response: CandidatesResponse =
        serde_json::from_str(body).map_err(|e| SpotlightError::Parse(e.to_string()))?;

    let mut resources = Vec::new();
    let surface_forms = response
        .annotation
        .surface_forms
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    for sf in surface_forms {
        let offset: usize = parse_number("@offset", &sf.offset)?;
        let candidates = sf.resource.map(OneOrMany::into_vec).unwrap_or_default();
        for c in candidates {
            resources.push(SpotlightResource {
                uri: format!("{}{}", DBPEDIA_RESOURCE_PREFIX, c.uri),
                surface_form: sf.name.clone(),
                offset,
                types: c.types,
                similarity: parse_number("@finalScore", &c.final_score)?,
                support: parse_number("@support", &c.support)?,
            });
        }
    }
    Ok(resources)
}

/// HTTP client for the linking service.
pub struct SpotlightClient {
    endpoint: String,
    client: Client,
}

impl SpotlightClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SpotlightError> {
        Url::parse(endpoint)
            .map_err(|e| SpotlightError::InvalidEndpoint(endpoint.to_string(), e.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpotlightError::Connection(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if the service answers at all.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/annotate", self.endpoint);
        match self
            .client
            .get(&url)
            .query(&[("text", "ping")])
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Best resource per surface form.
    pub async fn annotate(
        &self,
        text: &str,
        confidence: f64,
    ) -> Result<Vec<SpotlightResource>, SpotlightError> {
        let body = self.fetch("annotate", text, confidence).await?;
        parse_annotate(&body)
    }

    /// Every candidate resource per surface form.
    pub async fn candidates(
        &self,
        text: &str,
        confidence: f64,
    ) -> Result<Vec<SpotlightResource>, SpotlightError> {
        let body = self.fetch("candidates", text, confidence).await?;
        parse_candidates(&body)
    }

    /// Documents travel in a form body; long texts overflow request-line limits.
    async fn fetch(&self, method: &str, text: &str, confidence: f64) -> Result<String, SpotlightError> {
        let url = format!("{}/{}", self.endpoint, method);
        let confidence = confidence.to_string();
        debug!("Requesting {} ({} chars)", url, text.chars().count());

        let resp = self
            .client
            .post(&url)
            .form(&[("text", text), ("confidence", confidence.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SpotlightError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SpotlightError::Api(format!("HTTP {}", resp.status())));
        }

        resp.text()
            .await
            .map_err(|e| SpotlightError::Parse(e.to_string()))
    }
}
