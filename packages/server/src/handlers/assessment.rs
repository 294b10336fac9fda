use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{assessment, assessment_question, clo, student, student_mark};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::assessment::*;
use crate::state::AppState;

use super::course::find_course;

#[utoipa::path(
    post,
    path = "/",
    tag = "Assessments",
    operation_id = "createAssessment",
    summary = "Create an assessment for a course",
    description = "Requires `assessment:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CreateAssessmentRequest,
    responses(
        (status = 201, description = "Assessment created", body = AssessmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, title = %payload.title))]
pub async fn create_assessment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("assessment:manage")?;
    validate_create_assessment(&payload)?;

    let txn = state.db.begin().await?;
    find_course(&txn, course_id).await?;

    let now = chrono::Utc::now();
    let model = assessment::ActiveModel {
        course_id: Set(course_id),
        title: Set(payload.title.trim().to_string()),
        kind: Set(payload.kind),
        description: Set(payload.description),
        drive_link: Set(payload.drive_link),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(AssessmentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Assessments",
    operation_id = "listAssessments",
    summary = "List a course's assessments",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of assessments", body = Vec<AssessmentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(course_id))]
pub async fn list_assessments(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<AssessmentResponse>>, AppError> {
    find_course(&state.db, course_id).await?;

    let assessments = assessment::Entity::find()
        .filter(assessment::Column::CourseId.eq(course_id))
        .order_by_asc(assessment::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(assessments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Assessments",
    operation_id = "getAssessment",
    summary = "Get an assessment by ID",
    params(("id" = i32, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Assessment details", body = AssessmentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Assessment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_assessment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let model = find_assessment(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Assessments",
    operation_id = "updateAssessment",
    summary = "Update an assessment",
    description = "Partially updates an assessment; `description` and `drive_link` are \
        three-state (omit, null to clear, value to set). Requires `assessment:manage` \
        permission.",
    params(("id" = i32, Path, description = "Assessment ID")),
    request_body = UpdateAssessmentRequest,
    responses(
        (status = 200, description = "Assessment updated", body = AssessmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assessment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_assessment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAssessmentRequest>,
) -> Result<Json<AssessmentResponse>, AppError> {
    auth_user.require_permission("assessment:manage")?;
    validate_update_assessment(&payload)?;

    if payload == UpdateAssessmentRequest::default() {
        let existing = find_assessment(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_assessment(&txn, id).await?;
    let mut active: assessment::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(kind);
    }
    match payload.description {
        Some(Some(description)) => active.description = Set(Some(description)),
        Some(None) => active.description = Set(None),
        None => {}
    }
    match payload.drive_link {
        Some(Some(drive_link)) => active.drive_link = Set(Some(drive_link)),
        Some(None) => active.drive_link = Set(None),
        None => {}
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Assessments",
    operation_id = "deleteAssessment",
    summary = "Delete an assessment",
    description = "Deletes an assessment together with its questions and marks. \
        Requires `assessment:manage` permission.",
    params(("id" = i32, Path, description = "Assessment ID")),
    responses(
        (status = 204, description = "Assessment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assessment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_assessment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("assessment:manage")?;

    let txn = state.db.begin().await?;
    find_assessment(&txn, id).await?;

    let question_ids = question_ids_of(&txn, id).await?;
    if !question_ids.is_empty() {
        student_mark::Entity::delete_many()
            .filter(student_mark::Column::QuestionId.is_in(question_ids))
            .exec(&txn)
            .await?;
    }
    assessment_question::Entity::delete_many()
        .filter(assessment_question::Column::AssessmentId.eq(id))
        .exec(&txn)
        .await?;
    assessment::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Assessments",
    operation_id = "createQuestion",
    summary = "Add a question to an assessment",
    description = "An optional `clo_id` ties the question to a learning outcome of the \
        assessment's course. Requires `assessment:manage` permission.",
    params(("id" = i32, Path, description = "Assessment ID")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assessment or CLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(assessment_id))]
pub async fn create_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<i32>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("assessment:manage")?;
    validate_create_question(&payload)?;

    let txn = state.db.begin().await?;
    let assessment = find_assessment(&txn, assessment_id).await?;

    if let Some(clo_id) = payload.clo_id {
        check_clo_in_course(&txn, clo_id, assessment.course_id).await?;
    }

    let model = assessment_question::ActiveModel {
        assessment_id: Set(assessment_id),
        question_number: Set(payload.question_number),
        max_marks: Set(payload.max_marks),
        clo_id: Set(payload.clo_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Assessments",
    operation_id = "listQuestions",
    summary = "List an assessment's questions",
    params(("id" = i32, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "List of questions", body = Vec<QuestionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Assessment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(assessment_id))]
pub async fn list_questions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<i32>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    find_assessment(&state.db, assessment_id).await?;

    let questions = assessment_question::Entity::find()
        .filter(assessment_question::Column::AssessmentId.eq(assessment_id))
        .order_by_asc(assessment_question::Column::QuestionNumber)
        .all(&state.db)
        .await?;

    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{question_id}",
    tag = "Assessments",
    operation_id = "updateQuestion",
    summary = "Update an assessment question",
    description = "`clo_id` is three-state: omit to keep, null to detach, value to \
        re-tie. Requires `assessment:manage` permission.",
    params(
        ("id" = i32, Path, description = "Assessment ID"),
        ("question_id" = i32, Path, description = "Question ID"),
    ),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question or CLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(assessment_id, question_id))]
pub async fn update_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((assessment_id, question_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    auth_user.require_permission("assessment:manage")?;
    validate_update_question(&payload)?;

    let txn = state.db.begin().await?;
    let assessment = find_assessment(&txn, assessment_id).await?;
    let existing = find_question(&txn, assessment_id, question_id).await?;
    let mut active: assessment_question::ActiveModel = existing.into();

    if let Some(n) = payload.question_number {
        active.question_number = Set(n);
    }
    if let Some(marks) = payload.max_marks {
        active.max_marks = Set(marks);
    }
    match payload.clo_id {
        Some(Some(clo_id)) => {
            check_clo_in_course(&txn, clo_id, assessment.course_id).await?;
            active.clo_id = Set(Some(clo_id));
        }
        Some(None) => active.clo_id = Set(None),
        None => {}
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{question_id}",
    tag = "Assessments",
    operation_id = "deleteQuestion",
    summary = "Delete an assessment question",
    description = "Deletes a question and its recorded marks. Requires \
        `assessment:manage` permission.",
    params(
        ("id" = i32, Path, description = "Assessment ID"),
        ("question_id" = i32, Path, description = "Question ID"),
    ),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(assessment_id, question_id))]
pub async fn delete_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((assessment_id, question_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("assessment:manage")?;

    let txn = state.db.begin().await?;
    find_question(&txn, assessment_id, question_id).await?;

    student_mark::Entity::delete_many()
        .filter(student_mark::Column::QuestionId.eq(question_id))
        .exec(&txn)
        .await?;
    assessment_question::Entity::delete_by_id(question_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/marks",
    tag = "Marks",
    operation_id = "listMarks",
    summary = "List all recorded marks for an assessment",
    params(("id" = i32, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Recorded marks", body = Vec<MarkResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Assessment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(assessment_id))]
pub async fn list_marks(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<i32>,
) -> Result<Json<Vec<MarkResponse>>, AppError> {
    find_assessment(&state.db, assessment_id).await?;

    let question_ids = question_ids_of(&state.db, assessment_id).await?;
    if question_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let marks = student_mark::Entity::find()
        .filter(student_mark::Column::QuestionId.is_in(question_ids))
        .order_by_asc(student_mark::Column::StudentId)
        .order_by_asc(student_mark::Column::QuestionId)
        .all(&state.db)
        .await?;

    Ok(Json(marks.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{id}/marks",
    tag = "Marks",
    operation_id = "upsertMarks",
    summary = "Record marks for an assessment in batch",
    description = "Keyed on (student, question): re-submitting a pair overwrites the \
        stored marks instead of adding a second record. Every question must belong to \
        this assessment and every student must exist; the whole batch is applied in one \
        transaction or not at all. Requires `grade:enter` permission.",
    params(("id" = i32, Path, description = "Assessment ID")),
    request_body = UpsertMarksRequest,
    responses(
        (status = 200, description = "Batch applied", body = UpsertMarksResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assessment or student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(assessment_id, entries = payload.entries.len()))]
pub async fn upsert_marks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<i32>,
    AppJson(payload): AppJson<UpsertMarksRequest>,
) -> Result<Json<UpsertMarksResponse>, AppError> {
    auth_user.require_permission("grade:enter")?;
    validate_upsert_marks(&payload)?;

    let txn = state.db.begin().await?;
    find_assessment(&txn, assessment_id).await?;

    let question_ids: HashSet<i32> = question_ids_of(&txn, assessment_id)
        .await?
        .into_iter()
        .collect();
    // Postgres rejects an upsert that touches the same row twice.
    let mut seen = HashSet::new();
    for entry in &payload.entries {
        if !question_ids.contains(&entry.question_id) {
            return Err(AppError::Validation(format!(
                "Question {} does not belong to this assessment",
                entry.question_id
            )));
        }
        if !seen.insert((entry.student_id, entry.question_id)) {
            return Err(AppError::Validation(format!(
                "Duplicate entry for student {} question {}",
                entry.student_id, entry.question_id
            )));
        }
    }

    let student_ids: Vec<i32> = payload
        .entries
        .iter()
        .map(|e| e.student_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let known = student::Entity::find()
        .filter(student::Column::Id.is_in(student_ids.clone()))
        .count(&txn)
        .await?;
    if known as usize != student_ids.len() {
        return Err(AppError::NotFound(
            "One or more students do not exist".into(),
        ));
    }

    let now = chrono::Utc::now();
    let written = payload.entries.len();
    student_mark::Entity::insert_many(payload.entries.into_iter().map(|entry| {
        student_mark::ActiveModel {
            student_id: Set(entry.student_id),
            question_id: Set(entry.question_id),
            obtained_marks: Set(entry.obtained_marks),
            updated_at: Set(now),
        }
    }))
    .on_conflict(
        OnConflict::columns([
            student_mark::Column::StudentId,
            student_mark::Column::QuestionId,
        ])
        .update_columns([
            student_mark::Column::ObtainedMarks,
            student_mark::Column::UpdatedAt,
        ])
        .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;
    txn.commit().await?;

    Ok(Json(UpsertMarksResponse { written }))
}

async fn find_assessment<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<assessment::Model, AppError> {
    assessment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".into()))
}

async fn find_question<C: ConnectionTrait>(
    db: &C,
    assessment_id: i32,
    question_id: i32,
) -> Result<assessment_question::Model, AppError> {
    let question = assessment_question::Entity::find_by_id(question_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))?;

    if question.assessment_id != assessment_id {
        return Err(AppError::NotFound("Question not found".into()));
    }

    Ok(question)
}

async fn check_clo_in_course<C: ConnectionTrait>(
    db: &C,
    clo_id: i32,
    course_id: i32,
) -> Result<(), AppError> {
    let clo = clo::Entity::find_by_id(clo_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("CLO not found".into()))?;

    if clo.course_id != course_id {
        return Err(AppError::Validation(
            "CLO belongs to a different course".into(),
        ));
    }
    Ok(())
}

async fn question_ids_of<C: ConnectionTrait>(
    db: &C,
    assessment_id: i32,
) -> Result<Vec<i32>, AppError> {
    let ids: Vec<i32> = assessment_question::Entity::find()
        .filter(assessment_question::Column::AssessmentId.eq(assessment_id))
        .select_only()
        .column(assessment_question::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids)
}
