use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marks obtained by one student on one question. Written via upsert.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_mark")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub student_id: i32,
    #[sea_orm(primary_key)]
    pub question_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::assessment_question::Entity>,

    pub obtained_marks: f64,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
