use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{validate_semester, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateClassRequest {
    pub program_id: i32,
    pub name: String,
    pub semester: i32,
    pub section: String,
    pub academic_session: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub semester: Option<i32>,
    pub section: Option<String>,
    pub academic_session: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClassResponse {
    pub id: i32,
    pub program_id: i32,
    pub name: String,
    pub semester: i32,
    pub section: String,
    pub academic_session: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::class_section::Model> for ClassResponse {
    fn from(m: crate::entity::class_section::Model) -> Self {
        Self {
            id: m.id,
            program_id: m.program_id,
            name: m.name,
            semester: m.semester,
            section: m.section,
            academic_session: m.academic_session,
            created_at: m.created_at,
        }
    }
}

/// Assign (or reassign) a teacher to a course within a class.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssignCourseRequest {
    pub course_id: i32,
    pub teacher_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub class_id: i32,
    pub course_id: i32,
    pub teacher_id: i32,
    pub assigned_at: DateTime<Utc>,
}

impl From<crate::entity::course_assignment::Model> for AssignmentResponse {
    fn from(m: crate::entity::course_assignment::Model) -> Self {
        Self {
            class_id: m.class_id,
            course_id: m.course_id,
            teacher_id: m.teacher_id,
            assigned_at: m.assigned_at,
        }
    }
}

/// Assignment joined with course and teacher names, as listed under a class.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct AssignmentListItem {
    pub course_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub teacher_id: i32,
    pub teacher_name: String,
}

fn validate_section(section: &str) -> Result<(), AppError> {
    let section = section.trim();
    if section.is_empty() || section.chars().count() > 8 {
        return Err(AppError::Validation(
            "Section must be 1-8 characters".into(),
        ));
    }
    Ok(())
}

fn validate_session(session: &str) -> Result<(), AppError> {
    let session = session.trim();
    if session.is_empty() || session.chars().count() > 16 {
        return Err(AppError::Validation(
            "Academic session must be 1-16 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_class(req: &CreateClassRequest) -> Result<(), AppError> {
    validate_title(&req.name)?;
    validate_semester(req.semester)?;
    validate_section(&req.section)?;
    validate_session(&req.academic_session)
}

pub fn validate_update_class(req: &UpdateClassRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_title(name)?;
    }
    if let Some(semester) = req.semester {
        validate_semester(semester)?;
    }
    if let Some(ref section) = req.section {
        validate_section(section)?;
    }
    if let Some(ref session) = req.academic_session {
        validate_session(session)?;
    }
    Ok(())
}
