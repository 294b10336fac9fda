use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::auth::validate_email;
use super::shared::validate_title;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    pub name: String,
    pub reg_no: String,
    pub email: Option<String>,
    pub batch: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub reg_no: Option<String>,
    #[serde(default, deserialize_with = "super::shared::double_option")]
    pub email: Option<Option<String>>,
    pub batch: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub name: String,
    pub reg_no: String,
    pub email: Option<String>,
    pub batch: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::student::Model> for StudentResponse {
    fn from(m: crate::entity::student::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            reg_no: m.reg_no,
            email: m.email,
            batch: m.batch,
            created_at: m.created_at,
        }
    }
}

/// Enroll a batch of students into one course. Repeats are no-ops.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct EnrollStudentsRequest {
    pub student_ids: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EnrollStudentsResponse {
    /// Number of new enrollment records. Already-enrolled students don't count.
    pub enrolled: u64,
}

fn validate_reg_no(reg_no: &str) -> Result<(), AppError> {
    let reg_no = reg_no.trim();
    if reg_no.is_empty() || reg_no.chars().count() > 32 {
        return Err(AppError::Validation(
            "Registration number must be 1-32 characters".into(),
        ));
    }
    Ok(())
}

fn validate_batch(batch: &str) -> Result<(), AppError> {
    let batch = batch.trim();
    if batch.is_empty() || batch.chars().count() > 16 {
        return Err(AppError::Validation("Batch must be 1-16 characters".into()));
    }
    Ok(())
}

pub fn validate_create_student(req: &CreateStudentRequest) -> Result<(), AppError> {
    validate_title(&req.name)?;
    validate_reg_no(&req.reg_no)?;
    if let Some(ref email) = req.email {
        validate_email(email)?;
    }
    validate_batch(&req.batch)
}

pub fn validate_update_student(req: &UpdateStudentRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_title(name)?;
    }
    if let Some(ref reg_no) = req.reg_no {
        validate_reg_no(reg_no)?;
    }
    if let Some(Some(ref email)) = req.email {
        validate_email(email)?;
    }
    if let Some(ref batch) = req.batch {
        validate_batch(batch)?;
    }
    Ok(())
}
