use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{validate_code, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    /// Required on manual creation; bulk import defaults it instead.
    pub credit_hours: i32,
    #[serde(default)]
    pub lab_hours: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub credit_hours: Option<i32>,
    pub lab_hours: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub credit_hours: i32,
    pub lab_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::course::Model> for CourseResponse {
    fn from(m: crate::entity::course::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            title: m.title,
            credit_hours: m.credit_hours,
            lab_hours: m.lab_hours,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_credit_hours(hours: i32) -> Result<(), AppError> {
    if !(0..=6).contains(&hours) {
        return Err(AppError::Validation("Credit hours must be 0-6".into()));
    }
    Ok(())
}

fn validate_lab_hours(hours: i32) -> Result<(), AppError> {
    if !(0..=6).contains(&hours) {
        return Err(AppError::Validation("Lab hours must be 0-6".into()));
    }
    Ok(())
}

pub fn validate_create_course(req: &CreateCourseRequest) -> Result<(), AppError> {
    validate_code(&req.code, "Course")?;
    validate_title(&req.title)?;
    validate_credit_hours(req.credit_hours)?;
    validate_lab_hours(req.lab_hours)
}

pub fn validate_update_course(req: &UpdateCourseRequest) -> Result<(), AppError> {
    if let Some(ref code) = req.code {
        validate_code(code, "Course")?;
    }
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(hours) = req.credit_hours {
        validate_credit_hours(hours)?;
    }
    if let Some(hours) = req.lab_hours {
        validate_lab_hours(hours)?;
    }
    Ok(())
}
