use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Binds a teacher to a course within a class.
///
/// Keyed by (class, course): assigning a different teacher to the same pair
/// updates the existing row instead of inserting a duplicate.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub class_id: i32,
    #[sea_orm(primary_key)]
    pub course_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::class_section::Entity>,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub teacher_id: i32,
    #[sea_orm(belongs_to, from = "teacher_id", to = "id")]
    pub teacher: HasOne<super::user::Entity>,

    pub assigned_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
