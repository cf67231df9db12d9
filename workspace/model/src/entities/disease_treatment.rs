use super::{disease, treatment};
use sea_orm::entity::prelude::*;

/// Ranked link between a disease and a treatment. Lower rank is preferred.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "disease_treatments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub disease_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub treatment_id: i32,
    #[sea_orm(default_value = "1")]
    pub priority_rank: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "disease::Entity",
        from = "Column::DiseaseId",
        to = "disease::Column::Id"
    )]
    Disease,
    #[sea_orm(
        belongs_to = "treatment::Entity",
        from = "Column::TreatmentId",
        to = "treatment::Column::Id"
    )]
    Treatment,
}

impl Related<disease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disease.def()
    }
}

impl Related<treatment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treatment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
