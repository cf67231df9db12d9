//! Transport types shared between the server and the diagnosis pipeline.
//! The server serializes these straight into API payloads, so field names
//! here are part of the public JSON contract.

mod analysis;
mod confidence;

pub use analysis::{Analysis, AnalysisSource, DiseaseKind, PlantDetails, SimilarImage};
pub use confidence::Confidence;
