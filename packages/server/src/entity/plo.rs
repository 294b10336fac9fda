use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Program Learning Outcome.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub program_id: i32,
    #[sea_orm(belongs_to, from = "program_id", to = "id")]
    pub program: HasOne<super::program::Entity>,

    pub plo_number: i32,
    pub title: String,
    pub description: Option<String>,

    #[sea_orm(has_many)]
    pub mappings: HasMany<super::clo_plo_mapping::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
