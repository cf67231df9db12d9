use sea_orm::entity::prelude::*;

/// A farmer or extension agent using the service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash, never leaves the server.
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub county: Option<String>,
    pub farm_name: Option<String>,
    /// Farm size in hectares.
    pub farm_size: Option<f64>,
    #[sea_orm(default_value = "false")]
    pub is_extension_agent: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user submits many scan reports.
    #[sea_orm(has_many = "super::report::Entity")]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
