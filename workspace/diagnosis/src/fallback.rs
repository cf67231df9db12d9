//! Canned results used when the identification service is unavailable.

use common::{Analysis, AnalysisSource, Confidence, DiseaseKind, PlantDetails};
use rand::Rng;

/// Number of distinct canned outcomes.
pub const OUTCOME_COUNT: usize = 3;

/// The canned outcome at `index`, wrapping around.
pub fn outcome(index: usize) -> Analysis {
    match index % OUTCOME_COUNT {
        0 => canned(
            "Maize",
            Some(("Leaf Rust", DiseaseKind::Fungal)),
            87.5,
            "Apply fungicide and remove affected leaves. Ensure proper spacing between plants for air circulation.",
            "Use resistant varieties and avoid overhead watering.",
            &["Corn", "Maize"],
            "Maize plant showing signs of leaf rust infection",
        ),
        1 => canned(
            "Cassava",
            Some(("Powdery Mildew", DiseaseKind::Fungal)),
            72.3,
            "Use sulfur-based fungicide and improve air circulation. Remove severely infected leaves.",
            "Maintain proper plant spacing and avoid nitrogen over-fertilization.",
            &["Cassava", "Manioc"],
            "Cassava plant affected by powdery mildew",
        ),
        _ => canned(
            "Tomato",
            None,
            95.8,
            "No treatment needed - plant is healthy",
            "Continue current maintenance practices.",
            &["Tomato"],
            "Healthy tomato plant",
        ),
    }
}

/// A uniformly chosen canned outcome.
pub fn random_outcome<R: Rng + ?Sized>(rng: &mut R) -> Analysis {
    outcome(rng.random_range(0..OUTCOME_COUNT))
}

fn canned(
    plant_name: &str,
    disease: Option<(&str, DiseaseKind)>,
    percent: f64,
    treatment: &str,
    prevention: &str,
    common_names: &[&str],
    description: &str,
) -> Analysis {
    Analysis {
        plant_name: plant_name.to_string(),
        is_healthy: disease.is_none(),
        disease: disease.map(|(label, _)| label.to_string()),
        disease_kind: disease.map_or(DiseaseKind::Healthy, |(_, kind)| kind),
        confidence: Confidence::from_percent(percent),
        treatment: treatment.to_string(),
        prevention: prevention.to_string(),
        details: PlantDetails {
            common_names: common_names.iter().map(|name| name.to_string()).collect(),
            description: Some(description.to_string()),
            scientific_name: None,
            family: None,
        },
        similar_images: Vec::new(),
        source: AnalysisSource::MockFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_outcome_is_one_of_three() {
        let outcomes: Vec<Analysis> = (0..OUTCOME_COUNT).map(outcome).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let analysis = random_outcome(&mut rng);
            assert!(outcomes.contains(&analysis));
            assert_eq!(analysis.source, AnalysisSource::MockFallback);
        }
    }

    #[test]
    fn canned_values_are_fractions() {
        let maize = outcome(0);
        assert_eq!(maize.disease.as_deref(), Some("Leaf Rust"));
        assert!((maize.confidence.fraction() - 0.875).abs() < 1e-9);

        let cassava = outcome(1);
        assert_eq!(cassava.disease.as_deref(), Some("Powdery Mildew"));
        assert!((cassava.confidence.fraction() - 0.723).abs() < 1e-9);

        let tomato = outcome(2);
        assert!(tomato.is_healthy);
        assert_eq!(tomato.disease_kind, DiseaseKind::Healthy);
        assert!((tomato.confidence.fraction() - 0.958).abs() < 1e-9);
    }

    #[test]
    fn outcome_index_wraps() {
        assert_eq!(outcome(3), outcome(0));
    }
}
