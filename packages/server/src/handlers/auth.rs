use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::mail::MailMessage;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{role, role_permission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    ChangePasswordRequest, InviteTeacherRequest, InviteTeacherResponse, LoginRequest,
    LoginResponse, MeResponse, validate_change_password_request, validate_invite_request,
    validate_login_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt, password};

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with email and password",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim();

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let permissions = permissions_for_role(&state.db, &user.role).await?;

    let token = jwt::sign(
        user.id,
        &user.email,
        &user.role,
        permissions.clone(),
        user.token_version,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        email: user.email,
        full_name: user.full_name,
        role: user.role,
        permissions,
        is_first_login: user.is_first_login,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Return the current authenticated user's info",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.user_id,
        email: auth_user.email,
        role: auth_user.role,
        permissions: auth_user.permissions,
    })
}

#[utoipa::path(
    post,
    path = "/password",
    tag = "Auth",
    operation_id = "changePassword",
    summary = "Change the current user's password",
    description = "Verifies the current password, stores the new one, clears the first-login \
        flag, and bumps the account's token version so every previously issued token \
        (including the one used for this call) stops working. The client must log in again.",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed; re-authentication required"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_change_password_request(&payload)?;

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let is_valid = hash::verify_password(&payload.current_password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_version = user.token_version + 1;
    let mut active: user::ActiveModel = user.into();
    active.password = Set(new_hash);
    active.is_first_login = Set(false);
    active.token_version = Set(new_version);
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Invitations",
    operation_id = "inviteTeacher",
    summary = "Invite a teacher",
    description = "Creates a teacher account with a generated temporary password and \
        `is_first_login` set, then attempts to email the credentials. Requires \
        `user:invite` permission. A mail-delivery failure does NOT fail the request: \
        the account is still created and the temporary password is returned in the \
        body for manual distribution.",
    request_body = InviteTeacherRequest,
    responses(
        (status = 201, description = "Teacher invited", body = InviteTeacherResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(email = %payload.email))]
pub async fn invite_teacher(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<InviteTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:invite")?;
    validate_invite_request(&payload)?;

    let email = payload.email.trim().to_string();
    let temporary_password = password::generate_temporary();

    let password_hash = hash::hash_password(&temporary_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        email: Set(email.clone()),
        password: Set(password_hash),
        full_name: Set(payload.full_name.trim().to_string()),
        role: Set(role::TEACHER_ROLE.to_string()),
        is_first_login: Set(true),
        token_version: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
            _ => AppError::from(e),
        })?;

    let message = MailMessage {
        to: email.clone(),
        subject: "Your OBE portal account".into(),
        body: format!(
            "Hello {},\n\nAn account has been created for you.\n\n\
             Email: {}\nTemporary password: {}\n\n\
             You will be asked to choose a new password on first login.",
            user.full_name, email, temporary_password
        ),
    };

    // Tolerated failure: the account exists either way, so hand the
    // credentials back to the inviter instead of failing the request.
    let email_sent = match state.mailer.send(&message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(email = %email, "Invitation mail failed: {e}");
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(InviteTeacherResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            email_sent,
            temporary_password: if email_sent {
                None
            } else {
                Some(temporary_password)
            },
        }),
    ))
}

pub async fn permissions_for_role<C: ConnectionTrait>(
    db: &C,
    role: &str,
) -> Result<Vec<String>, AppError> {
    let role_perms = role_permission::Entity::find()
        .filter(role_permission::Column::Role.eq(role))
        .all(db)
        .await?;
    Ok(role_perms.into_iter().map(|rp| rp.permission).collect())
}
