use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{enrollment, student, student_mark};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::import::{self, BulkImportRequest, BulkImportResponse};
use crate::models::shared::validate_bulk_ids;
use crate::models::student::*;
use crate::state::AppState;

use super::course::find_course;

#[utoipa::path(
    post,
    path = "/",
    tag = "Students",
    operation_id = "createStudent",
    summary = "Register a student",
    description = "Requires `student:manage` permission.",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate registration number (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(reg_no = %payload.reg_no))]
pub async fn create_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_create_student(&payload)?;

    let model = student::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        reg_no: Set(payload.reg_no.trim().to_string()),
        email: Set(payload.email.map(|e| e.trim().to_string())),
        batch: Set(payload.batch.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(unique_reg_no_conflict)?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Students",
    operation_id = "listStudents",
    summary = "List all students",
    responses(
        (status = 200, description = "List of students", body = Vec<StudentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_students(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let students = student::Entity::find()
        .order_by_asc(student::Column::RegNo)
        .all(&state.db)
        .await?;

    Ok(Json(students.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Students",
    operation_id = "getStudent",
    summary = "Get a student by ID",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = StudentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_student(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    let model = find_student(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Students",
    operation_id = "updateStudent",
    summary = "Update a student",
    description = "Partially updates a student; `email` is three-state (omit, null to \
        clear, value to set). Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate registration number (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_update_student(&payload)?;

    if payload == UpdateStudentRequest::default() {
        let existing = find_student(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_student(&txn, id).await?;
    let mut active: student::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref reg_no) = payload.reg_no {
        active.reg_no = Set(reg_no.trim().to_string());
    }
    match payload.email {
        Some(Some(email)) => active.email = Set(Some(email.trim().to_string())),
        Some(None) => active.email = Set(None),
        None => {}
    }
    if let Some(ref batch) = payload.batch {
        active.batch = Set(batch.trim().to_string());
    }

    let model = active.update(&txn).await.map_err(unique_reg_no_conflict)?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Students",
    operation_id = "deleteStudent",
    summary = "Delete a student",
    description = "Deletes a student together with their enrollments and marks. \
        Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;

    let txn = state.db.begin().await?;
    find_student(&txn, id).await?;

    student_mark::Entity::delete_many()
        .filter(student_mark::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    enrollment::Entity::delete_many()
        .filter(enrollment::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    student::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/bulk",
    tag = "Students",
    operation_id = "bulkImportStudents",
    summary = "Bulk-import students from parsed file rows",
    description = "Rows require `name`, `reg_no`, `batch`; `email` is optional. \
        Requires `student:manage` permission.",
    request_body = BulkImportRequest,
    responses(
        (status = 201, description = "Valid rows imported", body = BulkImportResponse),
        (status = 400, description = "No valid rows (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate registration number (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(rows = payload.rows.len()))]
pub async fn bulk_import_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;

    let outcome = import::parse_student_rows(&payload.rows);
    if outcome.valid.is_empty() {
        return Err(AppError::Validation(
            "No valid rows in import batch".into(),
        ));
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let inserted = outcome.valid.len();
    student::Entity::insert_many(outcome.valid.into_iter().map(|row| student::ActiveModel {
        name: Set(row.name),
        reg_no: Set(row.reg_no),
        email: Set(row.email),
        batch: Set(row.batch),
        created_at: Set(now),
        ..Default::default()
    }))
    .exec(&txn)
    .await
    .map_err(unique_reg_no_conflict)?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkImportResponse {
            inserted,
            rejected: outcome.rejected,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Enrollments",
    operation_id = "enrollStudents",
    summary = "Enroll students into a course",
    description = "Idempotent per (course, student) pair: students already enrolled are \
        skipped, and the response counts only newly created records. All listed \
        students must exist. Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = EnrollStudentsRequest,
    responses(
        (status = 200, description = "Batch processed", body = EnrollStudentsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, students = payload.student_ids.len()))]
pub async fn enroll_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<EnrollStudentsRequest>,
) -> Result<Json<EnrollStudentsResponse>, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_bulk_ids(&payload.student_ids, "student_ids", 500)?;

    let txn = state.db.begin().await?;
    find_course(&txn, course_id).await?;

    let known = student::Entity::find()
        .filter(student::Column::Id.is_in(payload.student_ids.clone()))
        .count(&txn)
        .await?;
    if known as usize != payload.student_ids.len() {
        return Err(AppError::NotFound(
            "One or more students do not exist".into(),
        ));
    }

    let now = chrono::Utc::now();
    let result = enrollment::Entity::insert_many(payload.student_ids.iter().map(|&student_id| {
        enrollment::ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            enrolled_at: Set(now),
        }
    }))
    .on_conflict(
        OnConflict::columns([
            enrollment::Column::CourseId,
            enrollment::Column::StudentId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;
    txn.commit().await?;

    Ok(Json(EnrollStudentsResponse { enrolled: result }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Enrollments",
    operation_id = "listEnrolledStudents",
    summary = "List students enrolled in a course",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled students", body = Vec<StudentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(course_id))]
pub async fn list_enrolled_students(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    find_course(&state.db, course_id).await?;

    let students = student::Entity::find()
        .inner_join(enrollment::Entity)
        .filter(enrollment::Column::CourseId.eq(course_id))
        .order_by_asc(student::Column::RegNo)
        .all(&state.db)
        .await?;

    Ok(Json(students.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/{student_id}",
    tag = "Enrollments",
    operation_id = "unenrollStudent",
    summary = "Remove a student from a course",
    description = "Requires `student:manage` permission.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 204, description = "Enrollment removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id, student_id))]
pub async fn unenroll_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;

    let result = enrollment::Entity::delete_by_id((course_id, student_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Enrollment not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn unique_reg_no_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Registration number is already in use".into())
        }
        _ => AppError::from(e),
    }
}

async fn find_student<C: ConnectionTrait>(db: &C, id: i32) -> Result<student::Model, AppError> {
    student::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}
