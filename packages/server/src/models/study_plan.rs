use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_semester;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudyPlanEntryRequest {
    pub course_id: i32,
    pub semester: i32,
    #[serde(default = "default_course_type")]
    pub course_type: String,
}

fn default_course_type() -> String {
    super::import::DEFAULT_COURSE_TYPE.to_string()
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateStudyPlanEntryRequest {
    pub semester: Option<i32>,
    pub course_type: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudyPlanEntryResponse {
    pub id: i32,
    pub program_id: i32,
    pub course_id: i32,
    pub semester: i32,
    pub course_type: String,
}

impl From<crate::entity::program_course::Model> for StudyPlanEntryResponse {
    fn from(m: crate::entity::program_course::Model) -> Self {
        Self {
            id: m.id,
            program_id: m.program_id,
            course_id: m.course_id,
            semester: m.semester,
            course_type: m.course_type,
        }
    }
}

/// Study-plan entry joined with its course, as listed under a program.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct StudyPlanListItem {
    pub id: i32,
    pub course_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub credit_hours: i32,
    pub semester: i32,
    pub course_type: String,
}

fn validate_course_type(course_type: &str) -> Result<(), AppError> {
    let course_type = course_type.trim();
    if course_type.is_empty() || course_type.chars().count() > 32 {
        return Err(AppError::Validation(
            "Course type must be 1-32 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_study_plan_entry(
    req: &CreateStudyPlanEntryRequest,
) -> Result<(), AppError> {
    validate_semester(req.semester)?;
    validate_course_type(&req.course_type)
}

pub fn validate_update_study_plan_entry(
    req: &UpdateStudyPlanEntryRequest,
) -> Result<(), AppError> {
    if let Some(semester) = req.semester {
        validate_semester(semester)?;
    }
    if let Some(ref course_type) = req.course_type {
        validate_course_type(course_type)?;
    }
    Ok(())
}
