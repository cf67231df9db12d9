//! Crop image diagnosis.
//!
//! The pipeline asks a [`PlantIdentifier`] to name the plant, classifies
//! the answer with a keyword heuristic and attaches static advice. When
//! identification fails for any reason a canned result from [`fallback`]
//! is returned instead, so [`analyze`] itself never fails.

pub mod advice;
pub mod classifier;
pub mod error;
pub mod fallback;
pub mod notify;
pub mod plant_id;
pub mod upload;

pub use error::{DiagnosisError, NotifyError, PlantIdError, UploadError};
pub use notify::{EmailMessage, EmailSettings, Notifier, ResendNotifier};
pub use plant_id::{PlantIdClient, PlantIdSettings, PlantIdentifier, Suggestion};

use common::Analysis;
use tracing::{debug, instrument, warn};

/// Analyses one image. Identification failures degrade to a canned result.
#[instrument(skip(identifier, image), fields(image_bytes = image.len()))]
pub async fn analyze(identifier: &dyn PlantIdentifier, image: &[u8]) -> Analysis {
    match identifier.identify(image).await {
        Ok(suggestion) => {
            debug!("Identified plant as {}", suggestion.plant_name);
            classifier::classify(&suggestion)
        }
        Err(e) => {
            warn!("Plant identification failed, using fallback result: {}", e);
            fallback::random_outcome(&mut rand::rng())
        }
    }
}
