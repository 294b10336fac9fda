use common::taxonomy::{EmphasisLevel, LearningDomain};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mapping edge between a CLO and a PLO with taxonomy metadata.
///
/// Keyed by `clo_id`: a CLO carries at most one active mapping, enforced by
/// the store rather than by UI convention.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clo_plo_mapping")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub clo_id: i32,
    #[sea_orm(belongs_to, from = "clo_id", to = "id")]
    pub clo: HasOne<super::clo::Entity>,

    pub plo_id: i32,
    #[sea_orm(belongs_to, from = "plo_id", to = "id")]
    pub plo: HasOne<super::plo::Entity>,

    pub learning_type: LearningDomain,
    /// Bloom's taxonomy level code within the learning domain, e.g. "C3".
    pub level: String,
    pub emphasis_level: EmphasisLevel,
}

impl ActiveModelBehavior for ActiveModel {}
