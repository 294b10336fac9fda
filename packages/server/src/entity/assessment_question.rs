use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assessment_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub assessment_id: i32,
    #[sea_orm(belongs_to, from = "assessment_id", to = "id")]
    pub assessment: HasOne<super::assessment::Entity>,

    pub question_number: i32,
    pub max_marks: i32,

    /// NULL for questions not tied to a specific outcome.
    pub clo_id: Option<i32>,
    #[sea_orm(belongs_to, from = "clo_id", to = "id")]
    pub clo: BelongsTo<Option<super::clo::Entity>>,

    #[sea_orm(has_many)]
    pub marks: HasMany<super::student_mark::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
