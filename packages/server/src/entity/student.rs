use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Registration number, e.g. "21-SE-001".
    #[sea_orm(unique)]
    pub reg_no: String,
    pub email: Option<String>,
    /// Intake batch, e.g. "F21".
    pub batch: String,

    #[sea_orm(has_many, via = "enrollment")]
    pub courses: HasMany<super::course::Entity>,

    #[sea_orm(has_many)]
    pub marks: HasMany<super::student_mark::Entity>,

    pub created_at: DateTimeUtc,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        super::enrollment::Relation::Student.def().rev()
    }
}

impl ActiveModelBehavior for ActiveModel {}
