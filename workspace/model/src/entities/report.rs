use super::{crop, disease, user};
use sea_orm::entity::prelude::*;

/// One image scan submitted by a user, with its diagnosis.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub crop_id: i32,
    /// Nulled when the disease is deleted.
    pub disease_id: Option<i32>,
    pub image_url: String,
    /// Fraction in 0..1.
    pub confidence_score: f64,
    pub is_healthy: bool,
    /// Set once an agent has verified the diagnosis.
    #[sea_orm(default_value = "false")]
    pub is_accurate: bool,
    pub recommended_treatment: Option<String>,
    pub prevention_tips: Option<String>,
    pub submitted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "crop::Entity",
        from = "Column::CropId",
        to = "crop::Column::Id",
        on_delete = "Cascade"
    )]
    Crop,
    #[sea_orm(
        belongs_to = "disease::Entity",
        from = "Column::DiseaseId",
        to = "disease::Column::Id",
        on_delete = "SetNull"
    )]
    Disease,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crop.def()
    }
}

impl Related<disease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disease.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
