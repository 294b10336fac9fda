use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub full_name: String,

    pub role: String,
    #[sea_orm(belongs_to, from = "role", to = "name")]
    pub role_ref: HasOne<super::role::Entity>,

    /// Set for freshly invited accounts; cleared by the first password change.
    #[sea_orm(default_value = false)]
    pub is_first_login: bool,

    /// Incremented on password change. Tokens carrying an older version are rejected.
    #[sea_orm(default_value = 0)]
    pub token_version: i32,

    #[sea_orm(has_many)]
    pub assignments: HasMany<super::course_assignment::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
