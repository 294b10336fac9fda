use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{validate_code, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProgramRequest {
    pub code: String,
    pub title: String,
    pub duration_years: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProgramRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub duration_years: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProgramResponse {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub duration_years: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::program::Model> for ProgramResponse {
    fn from(m: crate::entity::program::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            title: m.title,
            duration_years: m.duration_years,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePloRequest {
    pub plo_number: i32,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdatePloRequest {
    pub plo_number: Option<i32>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::shared::double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PloResponse {
    pub id: i32,
    pub program_id: i32,
    pub plo_number: i32,
    pub title: String,
    pub description: Option<String>,
}

impl From<crate::entity::plo::Model> for PloResponse {
    fn from(m: crate::entity::plo::Model) -> Self {
        Self {
            id: m.id,
            program_id: m.program_id,
            plo_number: m.plo_number,
            title: m.title,
            description: m.description,
        }
    }
}

fn validate_duration(years: i32) -> Result<(), AppError> {
    if !(1..=8).contains(&years) {
        return Err(AppError::Validation(
            "Duration must be 1-8 years".into(),
        ));
    }
    Ok(())
}

fn validate_plo_number(n: i32) -> Result<(), AppError> {
    if !(1..=99).contains(&n) {
        return Err(AppError::Validation("PLO number must be 1-99".into()));
    }
    Ok(())
}

pub fn validate_create_program(req: &CreateProgramRequest) -> Result<(), AppError> {
    validate_code(&req.code, "Program")?;
    validate_title(&req.title)?;
    validate_duration(req.duration_years)
}

pub fn validate_update_program(req: &UpdateProgramRequest) -> Result<(), AppError> {
    if let Some(ref code) = req.code {
        validate_code(code, "Program")?;
    }
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(years) = req.duration_years {
        validate_duration(years)?;
    }
    Ok(())
}

pub fn validate_create_plo(req: &CreatePloRequest) -> Result<(), AppError> {
    validate_plo_number(req.plo_number)?;
    validate_title(&req.title)
}

pub fn validate_update_plo(req: &UpdatePloRequest) -> Result<(), AppError> {
    if let Some(n) = req.plo_number {
        validate_plo_number(n)?;
    }
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    Ok(())
}
