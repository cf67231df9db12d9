//! Keyword heuristic turning an identification suggestion into a diagnosis.
//!
//! Pure and deterministic: the same suggestion always yields the same
//! analysis. Matching is case-insensitive substring search over the plant
//! name and the description.

use crate::advice;
use crate::plant_id::Suggestion;
use common::{Analysis, AnalysisSource, Confidence, DiseaseKind};

/// Any of these in the text marks the plant as unhealthy.
pub const HEALTH_INDICATORS: [&str; 19] = [
    "spot", "rot", "blight", "mildew", "rust", "mosaic", "wilt", "canker", "gall", "scab",
    "yellow", "brown", "black", "fungus", "disease", "infected", "sick", "virus", "bacterial",
];

/// One keyword to disease label mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiseaseRule {
    pub keyword: &'static str,
    pub label: &'static str,
    pub kind: DiseaseKind,
}

/// Scanned in order, first match wins.
pub const DISEASE_RULES: [DiseaseRule; 8] = [
    DiseaseRule { keyword: "rust", label: "Leaf Rust", kind: DiseaseKind::Fungal },
    DiseaseRule { keyword: "mildew", label: "Powdery Mildew", kind: DiseaseKind::Fungal },
    DiseaseRule { keyword: "blight", label: "Leaf Blight", kind: DiseaseKind::Fungal },
    DiseaseRule { keyword: "spot", label: "Leaf Spot", kind: DiseaseKind::Fungal },
    DiseaseRule { keyword: "mosaic", label: "Mosaic Virus", kind: DiseaseKind::Viral },
    DiseaseRule { keyword: "wilt", label: "Bacterial Wilt", kind: DiseaseKind::Bacterial },
    DiseaseRule { keyword: "rot", label: "Root Rot", kind: DiseaseKind::Fungal },
    DiseaseRule { keyword: "canker", label: "Bacterial Canker", kind: DiseaseKind::Bacterial },
];

pub const UNKNOWN_DISEASE: &str = "Unknown Plant Disease";

fn searchable_text(plant_name: &str, description: Option<&str>) -> String {
    format!("{} {}", plant_name, description.unwrap_or_default()).to_lowercase()
}

/// True when no health indicator occurs in the name or description.
pub fn looks_healthy(plant_name: &str, description: Option<&str>) -> bool {
    let text = searchable_text(plant_name, description);
    !HEALTH_INDICATORS.iter().any(|indicator| text.contains(indicator))
}

/// Label and kind for an unhealthy plant.
pub fn identify_disease(plant_name: &str, description: Option<&str>) -> (&'static str, DiseaseKind) {
    let text = searchable_text(plant_name, description);
    DISEASE_RULES
        .iter()
        .find(|rule| text.contains(rule.keyword))
        .map(|rule| (rule.label, rule.kind))
        .unwrap_or((UNKNOWN_DISEASE, DiseaseKind::Unknown))
}

/// Full analysis of a suggestion returned by the identification service.
pub fn classify(suggestion: &Suggestion) -> Analysis {
    let description = suggestion.details.description.as_deref();
    let is_healthy = looks_healthy(&suggestion.plant_name, description);

    let (disease, disease_kind, advice) = if is_healthy {
        (None, DiseaseKind::Healthy, advice::HEALTHY)
    } else {
        let (label, kind) = identify_disease(&suggestion.plant_name, description);
        (Some(label.to_string()), kind, advice::for_disease(label))
    };

    Analysis {
        plant_name: suggestion.plant_name.clone(),
        is_healthy,
        disease,
        disease_kind,
        confidence: Confidence::from_fraction(suggestion.probability),
        treatment: advice.treatment.to_string(),
        prevention: advice.prevention.to_string(),
        details: suggestion.details.clone(),
        similar_images: suggestion.similar_images.clone(),
        source: AnalysisSource::PlantId,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PlantDetails;

    fn suggestion(name: &str, description: Option<&str>) -> Suggestion {
        Suggestion {
            plant_name: name.to_string(),
            probability: 0.82,
            details: PlantDetails {
                description: description.map(str::to_string),
                ..PlantDetails::default()
            },
            similar_images: vec![],
        }
    }

    #[test]
    fn rust_in_description_is_leaf_rust() {
        let analysis = classify(&suggestion("Zea mays", Some("Orange RUST pustules on leaves")));
        assert!(!analysis.is_healthy);
        assert_eq!(analysis.disease.as_deref(), Some("Leaf Rust"));
        assert_eq!(analysis.disease_kind, DiseaseKind::Fungal);
        assert_eq!(analysis.treatment, advice::for_disease("Leaf Rust").treatment);
        assert_eq!(analysis.confidence.fraction(), 0.82);
        assert_eq!(analysis.source, AnalysisSource::PlantId);
    }

    #[test]
    fn table_order_breaks_ties() {
        // "rust" comes before "spot" in the rule table
        let (label, _) = identify_disease("Bean", Some("brown spot and rust"));
        assert_eq!(label, "Leaf Rust");

        // "blight" comes before "rot"
        let (label, _) = identify_disease("Potato blight", Some("tuber rot"));
        assert_eq!(label, "Leaf Blight");
    }

    #[test]
    fn healthy_plant_has_no_disease() {
        let analysis = classify(&suggestion("Solanum lycopersicum", Some("A flowering plant.")));
        assert!(analysis.is_healthy);
        assert_eq!(analysis.disease, None);
        assert_eq!(analysis.disease_kind, DiseaseKind::Healthy);
        assert_eq!(analysis.treatment, advice::HEALTHY.treatment);
    }

    #[test]
    fn indicator_without_rule_is_unknown_disease() {
        let analysis = classify(&suggestion("Cassava", Some("yellowing leaves")));
        assert!(!analysis.is_healthy);
        assert_eq!(analysis.disease.as_deref(), Some(UNKNOWN_DISEASE));
        assert_eq!(analysis.disease_kind, DiseaseKind::Unknown);
        assert_eq!(analysis.treatment, advice::GENERIC.treatment);
    }

    #[test]
    fn canker_uses_generic_advice() {
        let analysis = classify(&suggestion("Citrus canker", None));
        assert_eq!(analysis.disease.as_deref(), Some("Bacterial Canker"));
        assert_eq!(analysis.disease_kind, DiseaseKind::Bacterial);
        assert_eq!(analysis.prevention, advice::GENERIC.prevention);
    }

    #[test]
    fn substring_matches_count() {
        // "carrot" contains "rot"
        assert!(!looks_healthy("Carrot", None));
    }
}
