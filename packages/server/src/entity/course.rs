use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique course code, e.g. "CS-201".
    #[sea_orm(unique)]
    pub code: String,
    pub title: String,
    pub credit_hours: i32,
    #[sea_orm(default_value = 0)]
    pub lab_hours: i32,

    #[sea_orm(has_many)]
    pub clos: HasMany<super::clo::Entity>,

    #[sea_orm(has_many)]
    pub assessments: HasMany<super::assessment::Entity>,

    #[sea_orm(has_many, via = "program_course")]
    pub programs: HasMany<super::program::Entity>,

    #[sea_orm(has_many, via = "enrollment")]
    pub students: HasMany<super::student::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
