use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{assessment, clo, clo_plo_mapping, course, enrollment, program_course};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::*;
use crate::models::import::{self, BulkImportRequest, BulkImportResponse};
use crate::state::AppState;

use super::program::unique_code_conflict;

#[utoipa::path(
    post,
    path = "/",
    tag = "Courses",
    operation_id = "createCourse",
    summary = "Create a course in the global catalog",
    description = "Requires `course:manage` permission.",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate course code (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(code = %payload.code))]
pub async fn create_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;
    validate_create_course(&payload)?;

    let now = chrono::Utc::now();
    let new_course = course::ActiveModel {
        code: Set(payload.code.trim().to_string()),
        title: Set(payload.title.trim().to_string()),
        credit_hours: Set(payload.credit_hours),
        lab_hours: Set(payload.lab_hours),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_course
        .insert(&state.db)
        .await
        .map_err(unique_code_conflict)?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Courses",
    operation_id = "listCourses",
    summary = "List the course catalog",
    responses(
        (status = 200, description = "List of courses", body = Vec<CourseResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_courses(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let courses = course::Entity::find()
        .order_by_asc(course::Column::Code)
        .all(&state.db)
        .await?;

    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Courses",
    operation_id = "getCourse",
    summary = "Get a course by ID",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = CourseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_course(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CourseResponse>, AppError> {
    let model = find_course(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Courses",
    operation_id = "updateCourse",
    summary = "Update a course",
    description = "Partially updates a course; only provided fields are modified. \
        Requires `course:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate course code (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:manage")?;
    validate_update_course(&payload)?;

    if payload == UpdateCourseRequest::default() {
        let existing = find_course(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_course(&txn, id).await?;
    let mut active: course::ActiveModel = existing.into();

    if let Some(ref code) = payload.code {
        active.code = Set(code.trim().to_string());
    }
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(hours) = payload.credit_hours {
        active.credit_hours = Set(hours);
    }
    if let Some(hours) = payload.lab_hours {
        active.lab_hours = Set(hours);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(unique_code_conflict)?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Courses",
    operation_id = "deleteCourse",
    summary = "Delete a course",
    description = "Deletes a course together with its CLOs (and their PLO mappings) and \
        study-plan entries. Requires `course:manage` permission. Returns 409 CONFLICT \
        if assessments or enrollments still reference the course.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Assessments or enrollments still reference this course (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;

    let txn = state.db.begin().await?;
    find_course(&txn, id).await?;

    let assessment_count = assessment::Entity::find()
        .filter(assessment::Column::CourseId.eq(id))
        .count(&txn)
        .await?;
    if assessment_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete course with existing assessments".into(),
        ));
    }

    let enrollment_count = enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.eq(id))
        .count(&txn)
        .await?;
    if enrollment_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete course with enrolled students".into(),
        ));
    }

    clo_plo_mapping::Entity::delete_many()
        .filter(
            clo_plo_mapping::Column::CloId.in_subquery(
                SeaQuery::select()
                    .column(clo::Column::Id)
                    .from(clo::Entity)
                    .and_where(clo::Column::CourseId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;

    clo::Entity::delete_many()
        .filter(clo::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    program_course::Entity::delete_many()
        .filter(program_course::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    course::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/bulk",
    tag = "Courses",
    operation_id = "bulkImportCourses",
    summary = "Bulk-import courses from parsed file rows",
    description = "Validates each row (`code`, `title`, `credit_hours` required; \
        non-numeric credit hours fall back to 3, lab hours to 0) and persists the \
        valid rows in one transaction. Requires `course:manage` permission.",
    request_body = BulkImportRequest,
    responses(
        (status = 201, description = "Valid rows imported", body = BulkImportResponse),
        (status = 400, description = "No valid rows (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate course code (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(rows = payload.rows.len()))]
pub async fn bulk_import_courses(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;

    let outcome = import::parse_course_rows(&payload.rows);
    if outcome.valid.is_empty() {
        return Err(AppError::Validation(
            "No valid rows in import batch".into(),
        ));
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let inserted = outcome.valid.len();
    course::Entity::insert_many(outcome.valid.into_iter().map(|row| course::ActiveModel {
        code: Set(row.code),
        title: Set(row.title),
        credit_hours: Set(row.credit_hours),
        lab_hours: Set(row.lab_hours),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }))
    .exec(&txn)
    .await
    .map_err(unique_code_conflict)?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkImportResponse {
            inserted,
            rejected: outcome.rejected,
        }),
    ))
}

pub async fn find_course<C: ConnectionTrait>(db: &C, id: i32) -> Result<course::Model, AppError> {
    course::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

/// Pre-fetched code→id map used by study-plan import resolution.
pub async fn course_codes<C: ConnectionTrait>(db: &C) -> Result<HashMap<String, i32>, AppError> {
    let rows: Vec<(i32, String)> = course::Entity::find()
        .select_only()
        .column(course::Column::Id)
        .column(course::Column::Code)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(id, code)| (code, id)).collect())
}
