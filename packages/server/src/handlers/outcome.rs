use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{assessment_question, clo, clo_plo_mapping, plo};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::outcome::*;
use crate::state::AppState;

use super::course::find_course;

#[utoipa::path(
    post,
    path = "/",
    tag = "CLOs",
    operation_id = "createClo",
    summary = "Create a course learning outcome",
    description = "Requires `clo:manage` permission. When `plo_id` is given, the CLO's \
        single mapping edge is created in the same transaction; `level` defaults to \
        the base level of the CLO's learning domain and `emphasis_level` to Medium.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CreateCloRequest,
    responses(
        (status = 201, description = "CLO created", body = CloResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or PLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, code = %payload.code))]
pub async fn create_clo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateCloRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("clo:manage")?;
    validate_create_clo(&payload)?;

    let txn = state.db.begin().await?;
    find_course(&txn, course_id).await?;

    let new_clo = clo::ActiveModel {
        course_id: Set(course_id),
        code: Set(payload.code.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        domain: Set(payload.domain),
        is_active: Set(payload.is_active),
        ..Default::default()
    };
    let model = new_clo.insert(&txn).await?;

    if let Some(plo_id) = payload.plo_id {
        find_plo(&txn, plo_id).await?;
        let level = payload
            .level
            .unwrap_or_else(|| payload.domain.base_level().to_string());
        clo_plo_mapping::ActiveModel {
            clo_id: Set(model.id),
            plo_id: Set(plo_id),
            learning_type: Set(payload.domain),
            level: Set(level),
            emphasis_level: Set(payload.emphasis_level.unwrap_or_default()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok((StatusCode::CREATED, Json(CloResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "CLOs",
    operation_id = "listClos",
    summary = "List a course's learning outcomes",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of CLOs", body = Vec<CloResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(course_id))]
pub async fn list_clos(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<CloResponse>>, AppError> {
    find_course(&state.db, course_id).await?;

    let clos = clo::Entity::find()
        .filter(clo::Column::CourseId.eq(course_id))
        .order_by_asc(clo::Column::Code)
        .all(&state.db)
        .await?;

    Ok(Json(clos.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{clo_id}",
    tag = "CLOs",
    operation_id = "updateClo",
    summary = "Update a course learning outcome",
    description = "Requires `clo:manage` permission. The `plo_id` field is three-state: \
        omit it to leave the mapping untouched, send null to clear it, or send a PLO id \
        to replace it. Replacement deletes the old edge and inserts the new one in the \
        same transaction, so the CLO never ends up with two mappings.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("clo_id" = i32, Path, description = "CLO ID"),
    ),
    request_body = UpdateCloRequest,
    responses(
        (status = 200, description = "CLO updated", body = CloResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "CLO or PLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, clo_id))]
pub async fn update_clo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, clo_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateCloRequest>,
) -> Result<Json<CloResponse>, AppError> {
    auth_user.require_permission("clo:manage")?;
    validate_update_clo(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_clo_for_course(&txn, course_id, clo_id).await?;

    let effective_domain = payload.domain.unwrap_or(existing.domain);
    if let Some(ref level) = payload.level {
        validate_level(effective_domain, level)?;
    }

    let mut active: clo::ActiveModel = existing.into();
    if let Some(ref code) = payload.code {
        active.code = Set(code.trim().to_string());
    }
    if let Some(ref description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(domain) = payload.domain {
        active.domain = Set(domain);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let model = active.update(&txn).await?;

    match payload.plo_id {
        Some(Some(new_plo_id)) => {
            find_plo(&txn, new_plo_id).await?;

            let previous = clo_plo_mapping::Entity::find_by_id(clo_id).one(&txn).await?;
            let level = match payload.level {
                Some(level) => level,
                // Carry the old level forward only if it still fits the
                // effective domain.
                None => previous
                    .as_ref()
                    .map(|m| m.level.clone())
                    .filter(|l| effective_domain.is_valid_level(l))
                    .unwrap_or_else(|| effective_domain.base_level().to_string()),
            };
            let emphasis_level = payload
                .emphasis_level
                .or(previous.as_ref().map(|m| m.emphasis_level))
                .unwrap_or_default();

            clo_plo_mapping::Entity::delete_by_id(clo_id).exec(&txn).await?;
            clo_plo_mapping::ActiveModel {
                clo_id: Set(clo_id),
                plo_id: Set(new_plo_id),
                learning_type: Set(effective_domain),
                level: Set(level),
                emphasis_level: Set(emphasis_level),
            }
            .insert(&txn)
            .await?;
        }
        Some(None) => {
            clo_plo_mapping::Entity::delete_by_id(clo_id).exec(&txn).await?;
        }
        None => {
            // Keep an existing edge in step with taxonomy field updates.
            if let Some(mapping) = clo_plo_mapping::Entity::find_by_id(clo_id).one(&txn).await? {
                let mut edge: clo_plo_mapping::ActiveModel = mapping.into();
                edge.learning_type = Set(effective_domain);
                if let Some(level) = payload.level {
                    edge.level = Set(level);
                }
                if let Some(emphasis) = payload.emphasis_level {
                    edge.emphasis_level = Set(emphasis);
                }
                edge.update(&txn).await?;
            } else if payload.level.is_some() || payload.emphasis_level.is_some() {
                return Err(AppError::Validation(
                    "level and emphasis_level require an existing mapping or a plo_id".into(),
                ));
            }
        }
    }

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{clo_id}",
    tag = "CLOs",
    operation_id = "deleteClo",
    summary = "Delete a course learning outcome",
    description = "Deletes a CLO and its mapping edge; assessment questions pointing at \
        it are detached rather than deleted. Requires `clo:manage` permission.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("clo_id" = i32, Path, description = "CLO ID"),
    ),
    responses(
        (status = 204, description = "CLO deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "CLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id, clo_id))]
pub async fn delete_clo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, clo_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("clo:manage")?;

    let txn = state.db.begin().await?;
    find_clo_for_course(&txn, course_id, clo_id).await?;

    assessment_question::Entity::update_many()
        .col_expr(assessment_question::Column::CloId, Expr::value(Value::Int(None)))
        .filter(assessment_question::Column::CloId.eq(clo_id))
        .exec(&txn)
        .await?;

    clo_plo_mapping::Entity::delete_by_id(clo_id).exec(&txn).await?;
    clo::Entity::delete_by_id(clo_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{clo_id}/mapping",
    tag = "CLOs",
    operation_id = "getCloMapping",
    summary = "Get a CLO's mapping edge",
    description = "Returns the CLO's mapping edges as a list, which by construction \
        contains zero or one element.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("clo_id" = i32, Path, description = "CLO ID"),
    ),
    responses(
        (status = 200, description = "Mapping edges (empty or a single edge)", body = Vec<MappingResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "CLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(course_id, clo_id))]
pub async fn get_clo_mapping(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, clo_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<MappingResponse>>, AppError> {
    find_clo_for_course(&state.db, course_id, clo_id).await?;

    let edges = clo_plo_mapping::Entity::find_by_id(clo_id)
        .one(&state.db)
        .await?;

    Ok(Json(edges.into_iter().map(Into::into).collect()))
}

async fn find_clo_for_course<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    clo_id: i32,
) -> Result<clo::Model, AppError> {
    let clo = clo::Entity::find_by_id(clo_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("CLO not found".into()))?;

    if clo.course_id != course_id {
        return Err(AppError::NotFound("CLO not found".into()));
    }

    Ok(clo)
}

async fn find_plo<C: ConnectionTrait>(db: &C, id: i32) -> Result<plo::Model, AppError> {
    plo::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("PLO not found".into()))
}
