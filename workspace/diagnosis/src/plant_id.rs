//! Client for the Plant.id v2 identification API.

use crate::error::PlantIdError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::{PlantDetails, SimilarImage};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

pub const DEFAULT_API_URL: &str = "https://api.plant.id/v2/identify";
const UNKNOWN_PLANT: &str = "Unknown Plant";
const MAX_SIMILAR_IMAGES: usize = 3;

const MODIFIERS: [&str; 2] = ["crops_fast", "similar_images"];
const PLANT_DETAILS: [&str; 9] = [
    "common_names",
    "url",
    "description",
    "taxonomy",
    "rank",
    "gbif_id",
    "inaturalist_id",
    "image",
    "synonyms",
];

/// Connection settings for the identification API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlantIdSettings {
    /// Without a key every identification fails with `NotConfigured`.
    pub api_key: Option<String>,
    pub api_url: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for PlantIdSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            connect_timeout_secs: 5,
            timeout_secs: 30,
        }
    }
}

impl PlantIdSettings {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

/// Top suggestion returned by the identification service.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub plant_name: String,
    /// Already a fraction in 0..1.
    pub probability: f64,
    pub details: PlantDetails,
    pub similar_images: Vec<SimilarImage>,
}

/// Something that can name the plant in an image.
#[async_trait]
pub trait PlantIdentifier: Send + Sync {
    async fn identify(&self, image: &[u8]) -> Result<Suggestion, PlantIdError>;

    /// Whether credentials are present at all.
    fn is_configured(&self) -> bool;
}

/// HTTP implementation backed by `reqwest`.
pub struct PlantIdClient {
    client: reqwest::Client,
    settings: PlantIdSettings,
}

impl PlantIdClient {
    pub fn new(settings: PlantIdSettings) -> Result<Self, PlantIdError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("agrismart/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }
}

/// Builds the identify request body for one image.
pub fn request_body(image: &[u8]) -> serde_json::Value {
    json!({
        "images": [STANDARD.encode(image)],
        "modifiers": MODIFIERS,
        "plant_details": PLANT_DETAILS,
        "disease_details": "all",
    })
}

#[async_trait]
impl PlantIdentifier for PlantIdClient {
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    async fn identify(&self, image: &[u8]) -> Result<Suggestion, PlantIdError> {
        let api_key = self.settings.api_key().ok_or(PlantIdError::NotConfigured)?;

        trace!("Sending identification request to {}", self.settings.api_url);
        let response = self
            .client
            .post(&self.settings.api_url)
            .header("Api-Key", api_key)
            .json(&request_body(image))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(PlantIdError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => return Err(PlantIdError::RateLimited),
            status => {
                warn!("Plant.id responded with status {}", status);
                return Err(PlantIdError::UnexpectedStatus(status.as_u16()));
            }
        }

        let body = response.bytes().await?;
        debug!("Received {} byte identification response", body.len());
        parse_response(&body)
    }

    fn is_configured(&self) -> bool {
        self.settings.api_key().is_some()
    }
}

#[derive(Deserialize)]
struct IdentifyResponse {
    #[serde(default)]
    suggestions: Vec<RawSuggestion>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    plant_name: Option<String>,
    probability: Option<f64>,
    plant_details: Option<RawDetails>,
    #[serde(default)]
    similar_images: Vec<RawSimilarImage>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDetails {
    common_names: Option<Vec<String>>,
    description: Option<RawDescription>,
    scientific_name: Option<String>,
    taxonomy: Option<RawTaxonomy>,
    family: Option<String>,
}

#[derive(Deserialize)]
struct RawDescription {
    value: Option<String>,
}

#[derive(Deserialize)]
struct RawTaxonomy {
    family: Option<String>,
}

#[derive(Deserialize)]
struct RawSimilarImage {
    url: String,
    similarity: Option<f64>,
}

/// Extracts the top suggestion from a raw identify response.
pub fn parse_response(body: &[u8]) -> Result<Suggestion, PlantIdError> {
    let response: IdentifyResponse = serde_json::from_slice(body)?;
    let top = response
        .suggestions
        .into_iter()
        .next()
        .ok_or(PlantIdError::NoSuggestions)?;

    let details = top.plant_details.unwrap_or_default();
    let family = details
        .taxonomy
        .and_then(|taxonomy| taxonomy.family)
        .or(details.family);

    Ok(Suggestion {
        plant_name: top
            .plant_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_PLANT.to_string()),
        probability: top.probability.unwrap_or(0.0),
        details: PlantDetails {
            common_names: details.common_names.unwrap_or_default(),
            description: details.description.and_then(|d| d.value),
            scientific_name: details.scientific_name,
            family,
        },
        similar_images: top
            .similar_images
            .into_iter()
            .take(MAX_SIMILAR_IMAGES)
            .map(|image| SimilarImage {
                url: image.url,
                similarity: image.similarity,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode as AxumStatus, routing::post};
    use tokio::net::TcpListener;

    const SAMPLE: &str = r#"{
        "suggestions": [
            {
                "plant_name": "Zea mays",
                "probability": 0.91,
                "plant_details": {
                    "common_names": ["Maize", "Corn"],
                    "description": {"value": "Leaves show orange rust pustules."},
                    "scientific_name": "Zea mays",
                    "taxonomy": {"family": "Poaceae"}
                },
                "similar_images": [
                    {"url": "https://img/1.jpg", "similarity": 0.8},
                    {"url": "https://img/2.jpg", "similarity": 0.7},
                    {"url": "https://img/3.jpg"},
                    {"url": "https://img/4.jpg", "similarity": 0.1}
                ]
            },
            {"plant_name": "Sorghum", "probability": 0.05}
        ]
    }"#;

    #[test]
    fn parses_top_suggestion() {
        let suggestion = parse_response(SAMPLE.as_bytes()).unwrap();
        assert_eq!(suggestion.plant_name, "Zea mays");
        assert_eq!(suggestion.probability, 0.91);
        assert_eq!(suggestion.details.common_names, vec!["Maize", "Corn"]);
        assert_eq!(
            suggestion.details.description.as_deref(),
            Some("Leaves show orange rust pustules.")
        );
        assert_eq!(suggestion.details.family.as_deref(), Some("Poaceae"));
        assert_eq!(suggestion.similar_images.len(), 3);
        assert_eq!(suggestion.similar_images[2].similarity, None);
    }

    #[test]
    fn tolerates_missing_details() {
        let suggestion = parse_response(br#"{"suggestions":[{"plant_details":null}]}"#).unwrap();
        assert_eq!(suggestion.plant_name, "Unknown Plant");
        assert_eq!(suggestion.probability, 0.0);
        assert!(suggestion.details.common_names.is_empty());
        assert!(suggestion.similar_images.is_empty());
    }

    #[test]
    fn empty_suggestions_is_an_error() {
        let result = parse_response(br#"{"suggestions":[]}"#);
        assert!(matches!(result, Err(PlantIdError::NoSuggestions)));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        assert!(matches!(parse_response(b"<html>"), Err(PlantIdError::Json(_))));
    }

    #[test]
    fn request_body_encodes_image() {
        let body = request_body(b"abc");
        assert_eq!(body["images"][0], "YWJj");
        assert_eq!(body["modifiers"][1], "similar_images");
        assert_eq!(body["disease_details"], "all");
        assert_eq!(body["plant_details"].as_array().map(Vec::len), Some(9));
    }

    async fn client_against(status: AxumStatus, body: &'static str) -> PlantIdClient {
        let app = Router::new().route("/identify", post(move || async move { (status, body) }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        PlantIdClient::new(PlantIdSettings {
            api_key: Some("test-key".to_string()),
            api_url: format!("http://{addr}/identify"),
            ..PlantIdSettings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn maps_http_statuses() {
        let client = client_against(AxumStatus::OK, SAMPLE).await;
        let suggestion = client.identify(b"image").await.unwrap();
        assert_eq!(suggestion.plant_name, "Zea mays");

        let client = client_against(AxumStatus::UNAUTHORIZED, "").await;
        assert!(matches!(client.identify(b"image").await, Err(PlantIdError::InvalidApiKey)));

        let client = client_against(AxumStatus::TOO_MANY_REQUESTS, "").await;
        assert!(matches!(client.identify(b"image").await, Err(PlantIdError::RateLimited)));

        let client = client_against(AxumStatus::BAD_GATEWAY, "").await;
        assert!(matches!(
            client.identify(b"image").await,
            Err(PlantIdError::UnexpectedStatus(502))
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = PlantIdClient::new(PlantIdSettings {
            api_key: Some("   ".to_string()),
            ..PlantIdSettings::default()
        })
        .unwrap();
        assert!(!client.is_configured());
        assert!(matches!(client.identify(b"image").await, Err(PlantIdError::NotConfigured)));
    }
}
