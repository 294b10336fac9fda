use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub permissions: Vec<String>,
    /// True until the account's first password change; the client is expected
    /// to route to a forced password-change screen while set.
    pub is_first_login: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct InviteTeacherRequest {
    pub email: String,
    pub full_name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InviteTeacherResponse {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    /// Whether the invitation email was delivered.
    pub email_sent: bool,
    /// Generated credentials, returned for manual distribution when the
    /// email could not be delivered.
    pub temporary_password: Option<String>,
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.len() < 3 || email.len() > 254 || !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_login_request(req: &LoginRequest) -> Result<(), AppError> {
    validate_email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

pub fn validate_change_password_request(req: &ChangePasswordRequest) -> Result<(), AppError> {
    if req.current_password.is_empty() {
        return Err(AppError::Validation(
            "Current password must not be empty".into(),
        ));
    }
    validate_password(&req.new_password)
}

pub fn validate_invite_request(req: &InviteTeacherRequest) -> Result<(), AppError> {
    validate_email(&req.email)?;
    let name = req.full_name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation(
            "Full name must be 1-128 characters".into(),
        ));
    }
    Ok(())
}
