use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{class_section, course, course_assignment, role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::classes::*;
use crate::state::AppState;

use super::course::find_course;
use super::program::find_program;

#[utoipa::path(
    post,
    path = "/",
    tag = "Classes",
    operation_id = "createClass",
    summary = "Create a class section",
    description = "Requires `class:manage` permission.",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(program_id = payload.program_id))]
pub async fn create_class(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("class:manage")?;
    validate_create_class(&payload)?;

    let txn = state.db.begin().await?;
    find_program(&txn, payload.program_id).await?;

    let model = class_section::ActiveModel {
        program_id: Set(payload.program_id),
        name: Set(payload.name.trim().to_string()),
        semester: Set(payload.semester),
        section: Set(payload.section.trim().to_string()),
        academic_session: Set(payload.academic_session.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(ClassResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Classes",
    operation_id = "listClasses",
    summary = "List all class sections",
    responses(
        (status = 200, description = "List of classes", body = Vec<ClassResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_classes(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let classes = class_section::Entity::find()
        .order_by_asc(class_section::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(classes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Classes",
    operation_id = "getClass",
    summary = "Get a class section by ID",
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class details", body = ClassResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_class(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClassResponse>, AppError> {
    let model = find_class(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Classes",
    operation_id = "updateClass",
    summary = "Update a class section",
    description = "Partially updates a class; only provided fields are modified. \
        Requires `class:manage` permission.",
    params(("id" = i32, Path, description = "Class ID")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_class(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateClassRequest>,
) -> Result<Json<ClassResponse>, AppError> {
    auth_user.require_permission("class:manage")?;
    validate_update_class(&payload)?;

    if payload == UpdateClassRequest::default() {
        let existing = find_class(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_class(&txn, id).await?;
    let mut active: class_section::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(semester) = payload.semester {
        active.semester = Set(semester);
    }
    if let Some(ref section) = payload.section {
        active.section = Set(section.trim().to_string());
    }
    if let Some(ref session) = payload.academic_session {
        active.academic_session = Set(session.trim().to_string());
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Classes",
    operation_id = "deleteClass",
    summary = "Delete a class section",
    description = "Deletes a class and its course assignments. Requires `class:manage` \
        permission.",
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_class(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("class:manage")?;

    let txn = state.db.begin().await?;
    find_class(&txn, id).await?;

    course_assignment::Entity::delete_many()
        .filter(course_assignment::Column::ClassId.eq(id))
        .exec(&txn)
        .await?;
    class_section::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Classes",
    operation_id = "assignCourse",
    summary = "Assign a teacher to a course within a class",
    description = "Keyed on the (class, course) pair: assigning the same course again \
        replaces the previous teacher instead of adding a second assignment. Requires \
        `class:manage` permission.",
    params(("id" = i32, Path, description = "Class ID")),
    request_body = AssignCourseRequest,
    responses(
        (status = 200, description = "Assignment created or replaced", body = AssignmentResponse),
        (status = 400, description = "User is not a teacher (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Class, course, or teacher not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(class_id, course_id = payload.course_id, teacher_id = payload.teacher_id)
)]
pub async fn assign_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<i32>,
    AppJson(payload): AppJson<AssignCourseRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth_user.require_permission("class:manage")?;

    let txn = state.db.begin().await?;
    find_class(&txn, class_id).await?;
    find_course(&txn, payload.course_id).await?;

    let teacher = user::Entity::find_by_id(payload.teacher_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Teacher not found".into()))?;
    if teacher.role != role::TEACHER_ROLE {
        return Err(AppError::Validation(
            "Assigned user must have the teacher role".into(),
        ));
    }

    let assigned_at = chrono::Utc::now();
    course_assignment::Entity::insert(course_assignment::ActiveModel {
        class_id: Set(class_id),
        course_id: Set(payload.course_id),
        teacher_id: Set(payload.teacher_id),
        assigned_at: Set(assigned_at),
    })
    .on_conflict(
        OnConflict::columns([
            course_assignment::Column::ClassId,
            course_assignment::Column::CourseId,
        ])
        .update_columns([
            course_assignment::Column::TeacherId,
            course_assignment::Column::AssignedAt,
        ])
        .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;
    txn.commit().await?;

    Ok(Json(AssignmentResponse {
        class_id,
        course_id: payload.course_id,
        teacher_id: payload.teacher_id,
        assigned_at,
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Classes",
    operation_id = "listAssignments",
    summary = "List a class's course assignments",
    description = "Assignments joined with course code/title and teacher name.",
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Assignments", body = Vec<AssignmentListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(class_id))]
pub async fn list_assignments(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<i32>,
) -> Result<Json<Vec<AssignmentListItem>>, AppError> {
    find_class(&state.db, class_id).await?;

    let assignments = course_assignment::Entity::find()
        .filter(course_assignment::Column::ClassId.eq(class_id))
        .inner_join(course::Entity)
        .inner_join(user::Entity)
        .select_only()
        .column(course_assignment::Column::CourseId)
        .column_as(course::Column::Code, "course_code")
        .column_as(course::Column::Title, "course_title")
        .column(course_assignment::Column::TeacherId)
        .column_as(user::Column::FullName, "teacher_name")
        .order_by_asc(course::Column::Code)
        .into_model::<AssignmentListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(assignments))
}

#[utoipa::path(
    delete,
    path = "/{course_id}",
    tag = "Classes",
    operation_id = "removeAssignment",
    summary = "Remove a course assignment from a class",
    description = "Requires `class:manage` permission.",
    params(
        ("id" = i32, Path, description = "Class ID"),
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(class_id, course_id))]
pub async fn remove_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((class_id, course_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("class:manage")?;

    let result = course_assignment::Entity::delete_by_id((class_id, course_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Assignment not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_class<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<class_section::Model, AppError> {
    class_section::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Class not found".into()))
}
