use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{class_section, clo_plo_mapping, plo, program, program_course};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::import::{self, BulkImportRequest, BulkImportResponse};
use crate::models::program::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Programs",
    operation_id = "createProgram",
    summary = "Create a new degree program",
    description = "Requires `program:manage` permission.",
    request_body = CreateProgramRequest,
    responses(
        (status = 201, description = "Program created", body = ProgramResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate program code (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(code = %payload.code))]
pub async fn create_program(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProgramRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;
    validate_create_program(&payload)?;

    let now = chrono::Utc::now();
    let new_program = program::ActiveModel {
        code: Set(payload.code.trim().to_string()),
        title: Set(payload.title.trim().to_string()),
        duration_years: Set(payload.duration_years),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_program
        .insert(&state.db)
        .await
        .map_err(unique_code_conflict)?;

    Ok((StatusCode::CREATED, Json(ProgramResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Programs",
    operation_id = "listPrograms",
    summary = "List all programs",
    responses(
        (status = 200, description = "List of programs", body = Vec<ProgramResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_programs(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProgramResponse>>, AppError> {
    let programs = program::Entity::find()
        .order_by_asc(program::Column::Code)
        .all(&state.db)
        .await?;

    Ok(Json(programs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Programs",
    operation_id = "getProgram",
    summary = "Get a program by ID",
    params(("id" = i32, Path, description = "Program ID")),
    responses(
        (status = 200, description = "Program details", body = ProgramResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_program(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProgramResponse>, AppError> {
    let model = find_program(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Programs",
    operation_id = "updateProgram",
    summary = "Update a program",
    description = "Partially updates a program; only provided fields are modified. \
        Requires `program:manage` permission.",
    params(("id" = i32, Path, description = "Program ID")),
    request_body = UpdateProgramRequest,
    responses(
        (status = 200, description = "Program updated", body = ProgramResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_program(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProgramRequest>,
) -> Result<Json<ProgramResponse>, AppError> {
    auth_user.require_permission("program:manage")?;
    validate_update_program(&payload)?;

    if payload == UpdateProgramRequest::default() {
        let existing = find_program(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_program(&txn, id).await?;
    let mut active: program::ActiveModel = existing.into();

    if let Some(ref code) = payload.code {
        active.code = Set(code.trim().to_string());
    }
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(years) = payload.duration_years {
        active.duration_years = Set(years);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(unique_code_conflict)?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Programs",
    operation_id = "deleteProgram",
    summary = "Delete a program",
    description = "Deletes a program together with its PLOs (and their CLO mappings) and \
        study-plan entries. Requires `program:manage` permission. Returns 409 CONFLICT \
        if classes still reference the program.",
    params(("id" = i32, Path, description = "Program ID")),
    responses(
        (status = 204, description = "Program deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Classes still reference this program (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_program(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;

    let txn = state.db.begin().await?;
    find_program(&txn, id).await?;

    let class_count = class_section::Entity::find()
        .filter(class_section::Column::ProgramId.eq(id))
        .count(&txn)
        .await?;
    if class_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete program with existing classes".into(),
        ));
    }

    clo_plo_mapping::Entity::delete_many()
        .filter(
            clo_plo_mapping::Column::PloId.in_subquery(
                SeaQuery::select()
                    .column(plo::Column::Id)
                    .from(plo::Entity)
                    .and_where(plo::Column::ProgramId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;

    plo::Entity::delete_many()
        .filter(plo::Column::ProgramId.eq(id))
        .exec(&txn)
        .await?;
    program_course::Entity::delete_many()
        .filter(program_course::Column::ProgramId.eq(id))
        .exec(&txn)
        .await?;
    program::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/bulk",
    tag = "Programs",
    operation_id = "bulkImportPrograms",
    summary = "Bulk-import programs from parsed file rows",
    description = "Validates each row (`code`, `title`, `duration_years` required; \
        non-numeric duration falls back to 4) and persists the valid rows in one \
        transaction. Requires `program:manage` permission. Refused outright when no \
        row is valid.",
    request_body = BulkImportRequest,
    responses(
        (status = 201, description = "Valid rows imported", body = BulkImportResponse),
        (status = 400, description = "No valid rows (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate program code (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(rows = payload.rows.len()))]
pub async fn bulk_import_programs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;

    let outcome = import::parse_program_rows(&payload.rows);
    if outcome.valid.is_empty() {
        return Err(AppError::Validation(
            "No valid rows in import batch".into(),
        ));
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let inserted = outcome.valid.len();
    program::Entity::insert_many(outcome.valid.into_iter().map(|row| program::ActiveModel {
        code: Set(row.code),
        title: Set(row.title),
        duration_years: Set(row.duration_years),
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

#[utoipa::path(
    post,
    path = "/",
    tag = "PLOs",
    operation_id = "createPlo",
    summary = "Create a program learning outcome",
    description = "Requires `program:manage` permission.",
    params(("id" = i32, Path, description = "Program ID")),
    request_body = CreatePloRequest,
    responses(
        (status = 201, description = "PLO created", body = PloResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(program_id))]
pub async fn create_plo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
    AppJson(payload): AppJson<CreatePloRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;
    validate_create_plo(&payload)?;

    let txn = state.db.begin().await?;
    find_program(&txn, program_id).await?;

    let new_plo = plo::ActiveModel {
        program_id: Set(program_id),
        plo_number: Set(payload.plo_number),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        ..Default::default()
    };

    let model = new_plo.insert(&txn).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(PloResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "PLOs",
    operation_id = "listPlos",
    summary = "List a program's learning outcomes",
    params(("id" = i32, Path, description = "Program ID")),
    responses(
        (status = 200, description = "List of PLOs", body = Vec<PloResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(program_id))]
pub async fn list_plos(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
) -> Result<Json<Vec<PloResponse>>, AppError> {
    find_program(&state.db, program_id).await?;

    let plos = plo::Entity::find()
        .filter(plo::Column::ProgramId.eq(program_id))
        .order_by_asc(plo::Column::PloNumber)
        .all(&state.db)
        .await?;

    Ok(Json(plos.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{plo_id}",
    tag = "PLOs",
    operation_id = "updatePlo",
    summary = "Update a program learning outcome",
    description = "Requires `program:manage` permission. The `description` field supports \
        three-state updates: omit to leave unchanged, null to clear, value to set.",
    params(
        ("id" = i32, Path, description = "Program ID"),
        ("plo_id" = i32, Path, description = "PLO ID"),
    ),
    request_body = UpdatePloRequest,
    responses(
        (status = 200, description = "PLO updated", body = PloResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "PLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(program_id, plo_id))]
pub async fn update_plo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((program_id, plo_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdatePloRequest>,
) -> Result<Json<PloResponse>, AppError> {
    auth_user.require_permission("program:manage")?;
    validate_update_plo(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_plo_for_program(&txn, program_id, plo_id).await?;
    let mut active: plo::ActiveModel = existing.into();

    if let Some(n) = payload.plo_number {
        active.plo_number = Set(n);
    }
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    match payload.description {
        Some(Some(desc)) => active.description = Set(Some(desc)),
        Some(None) => active.description = Set(None),
        None => {}
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{plo_id}",
    tag = "PLOs",
    operation_id = "deletePlo",
    summary = "Delete a program learning outcome",
    description = "Deletes a PLO and any CLO mappings pointing at it. Requires \
        `program:manage` permission.",
    params(
        ("id" = i32, Path, description = "Program ID"),
        ("plo_id" = i32, Path, description = "PLO ID"),
    ),
    responses(
        (status = 204, description = "PLO deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "PLO not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(program_id, plo_id))]
pub async fn delete_plo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((program_id, plo_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;

    let txn = state.db.begin().await?;
    let plo = find_plo_for_program(&txn, program_id, plo_id).await?;

    clo_plo_mapping::Entity::delete_many()
        .filter(clo_plo_mapping::Column::PloId.eq(plo.id))
        .exec(&txn)
        .await?;
    plo::Entity::delete_by_id(plo.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/bulk",
    tag = "PLOs",
    operation_id = "bulkImportPlos",
    summary = "Bulk-import PLOs for a program",
    description = "Rows require `title`; `plo_number` defaults to the row position. \
        Requires `program:manage` permission.",
    params(("id" = i32, Path, description = "Program ID")),
    request_body = BulkImportRequest,
    responses(
        (status = 201, description = "Valid rows imported", body = BulkImportResponse),
        (status = 400, description = "No valid rows (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(program_id, rows = payload.rows.len()))]
pub async fn bulk_import_plos(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
    AppJson(payload): AppJson<BulkImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("program:manage")?;

    let outcome = import::parse_plo_rows(&payload.rows);
    if outcome.valid.is_empty() {
        return Err(AppError::Validation(
            "No valid rows in import batch".into(),
        ));
    }

    let txn = state.db.begin().await?;
    find_program(&txn, program_id).await?;

    let inserted = outcome.valid.len();
    plo::Entity::insert_many(outcome.valid.into_iter().map(|row| plo::ActiveModel {
        program_id: Set(program_id),
        plo_number: Set(row.plo_number),
        title: Set(row.title),
        description: Set(row.description),
        ..Default::default()
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

/// Map a unique-key violation on a code column to a 409.
pub fn unique_code_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Code is already in use".into())
        }
        _ => AppError::from(e),
    }
}

pub async fn find_program<C: ConnectionTrait>(db: &C, id: i32) -> Result<program::Model, AppError> {
    program::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".into()))
}

async fn find_plo_for_program<C: ConnectionTrait>(
    db: &C,
    program_id: i32,
    plo_id: i32,
) -> Result<plo::Model, AppError> {
    let plo = plo::Entity::find_by_id(plo_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("PLO not found".into()))?;

    if plo.program_id != program_id {
        return Err(AppError::NotFound("PLO not found".into()));
    }

    Ok(plo)
}

/// Pre-fetched code→id map used by study-plan import resolution.
pub async fn program_codes<C: ConnectionTrait>(db: &C) -> Result<HashMap<String, i32>, AppError> {
    let rows: Vec<(i32, String)> = program::Entity::find()
        .select_only()
        .column(program::Column::Id)
        .column(program::Column::Code)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(id, code)| (code, id)).collect())
}
