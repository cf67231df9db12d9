//! SeaORM entities for crop disease reporting.
//!
//! Users submit scan reports about crops; a report may point at a known
//! disease, and diseases are linked to ranked treatments through
//! `disease_treatment`.

pub mod crop;
pub mod disease;
pub mod disease_treatment;
pub mod report;
pub mod treatment;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::crop::Entity as Crop;
    pub use super::disease::Entity as Disease;
    pub use super::disease_treatment::Entity as DiseaseTreatment;
    pub use super::report::Entity as Report;
    pub use super::treatment::Entity as Treatment;
    pub use super::user::Entity as User;
}
