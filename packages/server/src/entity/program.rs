use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Short unique program code, e.g. "BSSE".
    #[sea_orm(unique)]
    pub code: String,
    pub title: String,
    pub duration_years: i32,

    #[sea_orm(has_many)]
    pub plos: HasMany<super::plo::Entity>,

    #[sea_orm(has_many)]
    pub classes: HasMany<super::class_section::Entity>,

    #[sea_orm(has_many, via = "program_course")]
    pub courses: HasMany<super::course::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
