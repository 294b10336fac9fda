use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{class_section, course, program, role, student, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::{BatchCount, DashboardStats};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Dashboard",
    operation_id = "dashboardStats",
    summary = "Aggregate counts for the landing dashboard",
    description = "Entity counts plus the student head-count per intake batch.",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn stats(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let db = &state.db;

    let programs = program::Entity::find().count(db).await?;
    let courses = course::Entity::find().count(db).await?;
    let classes = class_section::Entity::find().count(db).await?;
    let students = student::Entity::find().count(db).await?;
    let teachers = user::Entity::find()
        .filter(user::Column::Role.eq(role::TEACHER_ROLE))
        .count(db)
        .await?;

    let students_per_batch = student::Entity::find()
        .select_only()
        .column(student::Column::Batch)
        .column_as(student::Column::Id.count(), "count")
        .group_by(student::Column::Batch)
        .order_by_asc(student::Column::Batch)
        .into_model::<BatchCount>()
        .all(db)
        .await?;

    Ok(Json(DashboardStats {
        programs,
        courses,
        classes,
        students,
        teachers,
        students_per_batch,
    }))
}
