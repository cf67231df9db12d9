use super::{disease, disease_treatment};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "treatments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(default_value = "false")]
    pub organic_status: bool,
    /// Free text estimate, e.g. "KES 800-1200 per litre".
    pub cost_estimate: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::disease_treatment::Entity")]
    DiseaseTreatment,
}

impl Related<disease::Entity> for Entity {
    fn to() -> RelationDef {
        disease_treatment::Relation::Disease.def()
    }
    fn via() -> Option<RelationDef> {
        Some(disease_treatment::Relation::Treatment.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
