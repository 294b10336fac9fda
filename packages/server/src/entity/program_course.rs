use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Study-plan entry: a course taught in semester N of a program.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program_course")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub program_id: i32,
    #[sea_orm(belongs_to, from = "program_id", to = "id")]
    pub program: HasOne<super::program::Entity>,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    /// 1..=8 within the program's plan.
    pub semester: i32,
    /// Free vocabulary, e.g. "Core" or "Elective".
    pub course_type: String,
}

impl ActiveModelBehavior for ActiveModel {}
