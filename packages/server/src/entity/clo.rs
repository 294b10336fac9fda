use common::taxonomy::LearningDomain;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course Learning Outcome.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    /// Short code within the course, e.g. "CLO-1".
    pub code: String,
    pub description: String,
    pub domain: LearningDomain,
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_one)]
    pub mapping: HasOne<super::clo_plo_mapping::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
