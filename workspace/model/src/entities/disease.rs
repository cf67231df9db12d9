use super::{disease_treatment, treatment};
use sea_orm::entity::prelude::*;

/// A known crop disease.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "diseases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub symptoms: Option<String>,
    pub cause: Option<String>,
    /// Detection accuracy of the model for this disease, as a fraction.
    pub ai_model_accuracy: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::disease_treatment::Entity")]
    DiseaseTreatment,
    #[sea_orm(has_many = "super::report::Entity")]
    Report,
}

impl Related<treatment::Entity> for Entity {
    fn to() -> RelationDef {
        disease_treatment::Relation::Treatment.def()
    }
    fn via() -> Option<RelationDef> {
        Some(disease_treatment::Relation::Disease.def().rev())
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
