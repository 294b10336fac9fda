use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A cohort taught in a specific term, e.g. "BSSE-F21 / 5 / A / 2023-2024".
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_section")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub program_id: i32,
    #[sea_orm(belongs_to, from = "program_id", to = "id")]
    pub program: HasOne<super::program::Entity>,

    pub name: String,
    pub semester: i32,
    pub section: String,
    pub academic_session: String,

    #[sea_orm(has_many)]
    pub assignments: HasMany<super::course_assignment::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
