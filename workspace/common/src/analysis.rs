use crate::Confidence;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Broad category of the detected problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseKind {
    Healthy,
    Fungal,
    Viral,
    Bacterial,
    Unknown,
}

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Parsed from a Plant.id response
    PlantId,
    /// One of the canned results used when identification fails
    MockFallback,
}

/// Descriptive plant information reported by the identification service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PlantDetails {
    pub common_names: Vec<String>,
    pub description: Option<String>,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
}

/// Reference image of a visually similar specimen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SimilarImage {
    pub url: String,
    pub similarity: Option<f64>,
}

/// Outcome of analysing one crop image.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Analysis {
    /// Plant name as identified
    pub plant_name: String,
    pub is_healthy: bool,
    /// Disease label, absent for healthy plants
    pub disease: Option<String>,
    pub disease_kind: DiseaseKind,
    /// Confidence of the identification (0..1)
    pub confidence: Confidence,
    /// Recommended treatment text
    pub treatment: String,
    /// Prevention advice text
    pub prevention: String,
    pub details: PlantDetails,
    /// At most three similar reference images
    pub similar_images: Vec<SimilarImage>,
    pub source: AnalysisSource,
}

impl Analysis {
    /// Short human readable verdict.
    pub fn status_message(&self) -> String {
        match (&self.disease, self.is_healthy) {
            (_, true) => "Your crop appears healthy!".to_string(),
            (Some(disease), false) => format!("Disease detected: {disease}"),
            (None, false) => "Disease detected".to_string(),
        }
    }
}
