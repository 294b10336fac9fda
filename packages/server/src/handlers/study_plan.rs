use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{course, program_course};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::import::{self, BulkImportRequest, BulkImportResponse};
use crate::models::study_plan::*;
use crate::state::AppState;

use super::course::{course_codes, find_course};
use super::program::{find_program, program_codes};

#[utoipa::path(
    post,
    path = "/",
    tag = "Study Plan",
    operation_id = "createStudyPlanEntry",
    summary = "Add a course to a program's study plan",
    description = "Requires `program:manage` permission. A course appears at most once \
        per program's plan.",
    params(("id" = i32, Path, description = "Program ID")),
    request_body = CreateStudyPlanEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = StudyPlanEntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Program or course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Course already in the plan (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(program_id, course_id = payload.course_id))]
pub async fn create_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
    AppJson(payload): AppJson<CreateStudyPlanEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;
    validate_create_study_plan_entry(&payload)?;

    let txn = state.db.begin().await?;
    find_program(&txn, program_id).await?;
    find_course(&txn, payload.course_id).await?;

    let duplicate = program_course::Entity::find()
        .filter(program_course::Column::ProgramId.eq(program_id))
        .filter(program_course::Column::CourseId.eq(payload.course_id))
        .count(&txn)
        .await?;
    if duplicate > 0 {
        return Err(AppError::Conflict(
            "Course is already in this program's study plan".into(),
        ));
    }

    let entry = program_course::ActiveModel {
        program_id: Set(program_id),
        course_id: Set(payload.course_id),
        semester: Set(payload.semester),
        course_type: Set(payload.course_type.trim().to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(StudyPlanEntryResponse::from(entry))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Study Plan",
    operation_id = "listStudyPlan",
    summary = "List a program's study plan",
    description = "Entries joined with course code, title, and credit hours, ordered by \
        semester.",
    params(("id" = i32, Path, description = "Program ID")),
    responses(
        (status = 200, description = "Study-plan entries", body = Vec<StudyPlanListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(program_id))]
pub async fn list_entries(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
) -> Result<Json<Vec<StudyPlanListItem>>, AppError> {
    find_program(&state.db, program_id).await?;

    let entries = program_course::Entity::find()
        .filter(program_course::Column::ProgramId.eq(program_id))
        .inner_join(course::Entity)
        .select_only()
        .column(program_course::Column::Id)
        .column(program_course::Column::CourseId)
        .column_as(course::Column::Code, "course_code")
        .column_as(course::Column::Title, "course_title")
        .column(course::Column::CreditHours)
        .column(program_course::Column::Semester)
        .column(program_course::Column::CourseType)
        .order_by_asc(program_course::Column::Semester)
        .order_by_asc(course::Column::Code)
        .into_model::<StudyPlanListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(entries))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Study Plan",
    operation_id = "updateStudyPlanEntry",
    summary = "Update a study-plan entry",
    description = "Moves the entry to another semester or changes its course type. \
        Requires `program:manage` permission.",
    params(("id" = i32, Path, description = "Study-plan entry ID")),
    request_body = UpdateStudyPlanEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = StudyPlanEntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(entry_id))]
pub async fn update_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<i32>,
    AppJson(payload): AppJson<UpdateStudyPlanEntryRequest>,
) -> Result<Json<StudyPlanEntryResponse>, AppError> {
    auth_user.require_permission("program:manage")?;
    validate_update_study_plan_entry(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_entry(&txn, entry_id).await?;
    let mut active: program_course::ActiveModel = existing.into();

    if let Some(semester) = payload.semester {
        active.semester = Set(semester);
    }
    if let Some(ref course_type) = payload.course_type {
        active.course_type = Set(course_type.trim().to_string());
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Study Plan",
    operation_id = "deleteStudyPlanEntry",
    summary = "Remove a course from a program's study plan",
    description = "Requires `program:manage` permission.",
    params(("id" = i32, Path, description = "Study-plan entry ID")),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(entry_id))]
pub async fn delete_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;

    let entry = find_entry(&state.db, entry_id).await?;
    program_course::Entity::delete_by_id(entry.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/bulk",
    tag = "Study Plan",
    operation_id = "bulkImportStudyPlan",
    summary = "Bulk-import study-plan entries from parsed file rows",
    description = "Rows carry `program_code` and `course_code` instead of ids; both are \
        resolved against the current catalog and a row whose code doesn't resolve is \
        rejected. Non-numeric semesters fall back to 1, missing course types to Core. \
        Requires `program:manage` permission.",
    request_body = BulkImportRequest,
    responses(
        (status = 201, description = "Valid rows imported", body = BulkImportResponse),
        (status = 400, description = "No valid rows (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(rows = payload.rows.len()))]
pub async fn bulk_import_entries(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;

    let txn = state.db.begin().await?;
    let programs_by_code = program_codes(&txn).await?;
    let courses_by_code = course_codes(&txn).await?;

    let outcome = import::parse_study_plan_rows(&payload.rows, &programs_by_code, &courses_by_code);
    if outcome.valid.is_empty() {
        return Err(AppError::Validation(
            "No valid rows in import batch".into(),
        ));
    }

    let inserted = outcome.valid.len();
    program_course::Entity::insert_many(outcome.valid.into_iter().map(|row| {
        program_course::ActiveModel {
            program_id: Set(row.program_id),
            course_id: Set(row.course_id),
            semester: Set(row.semester),
            course_type: Set(row.course_type),
            ..Default::default()
        }
    }))
    .exec(&txn)
    .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkImportResponse {
            inserted,
            rejected: outcome.rejected,
        }),
    ))
}

async fn find_entry<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
) -> Result<program_course::Model, AppError> {
    program_course::Entity::find_by_id(entry_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Study-plan entry not found".into()))
}
