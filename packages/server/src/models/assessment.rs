use chrono::{DateTime, Utc};
use common::taxonomy::AssessmentType;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_title;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAssessmentRequest {
    pub title: String,
    pub kind: AssessmentType,
    pub description: Option<String>,
    /// URL of the attachment in the external object store.
    pub drive_link: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateAssessmentRequest {
    pub title: Option<String>,
    pub kind: Option<AssessmentType>,
    #[serde(default, deserialize_with = "super::shared::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::shared::double_option")]
    pub drive_link: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssessmentResponse {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub kind: AssessmentType,
    pub description: Option<String>,
    pub drive_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::assessment::Model> for AssessmentResponse {
    fn from(m: crate::entity::assessment::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            title: m.title,
            kind: m.kind,
            description: m.description,
            drive_link: m.drive_link,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateQuestionRequest {
    pub question_number: i32,
    pub max_marks: i32,
    /// CLO assessed by this question, if any.
    pub clo_id: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateQuestionRequest {
    pub question_number: Option<i32>,
    pub max_marks: Option<i32>,
    #[serde(default, deserialize_with = "super::shared::double_option")]
    pub clo_id: Option<Option<i32>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    pub id: i32,
    pub assessment_id: i32,
    pub question_number: i32,
    pub max_marks: i32,
    pub clo_id: Option<i32>,
}

impl From<crate::entity::assessment_question::Model> for QuestionResponse {
    fn from(m: crate::entity::assessment_question::Model) -> Self {
        Self {
            id: m.id,
            assessment_id: m.assessment_id,
            question_number: m.question_number,
            max_marks: m.max_marks,
            clo_id: m.clo_id,
        }
    }
}

/// One student's marks on one question.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct MarkEntry {
    pub student_id: i32,
    pub question_id: i32,
    pub obtained_marks: f64,
}

/// Batch mark entry. Existing records for a (student, question) pair are
/// overwritten.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertMarksRequest {
    pub entries: Vec<MarkEntry>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UpsertMarksResponse {
    /// Number of mark records written (inserted or overwritten).
    pub written: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MarkResponse {
    pub student_id: i32,
    pub question_id: i32,
    pub obtained_marks: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::student_mark::Model> for MarkResponse {
    fn from(m: crate::entity::student_mark::Model) -> Self {
        Self {
            student_id: m.student_id,
            question_id: m.question_id,
            obtained_marks: m.obtained_marks,
            updated_at: m.updated_at,
        }
    }
}

fn validate_optional_text(text: &Option<String>, what: &str, max: usize) -> Result<(), AppError> {
    if let Some(text) = text
        && text.trim().chars().count() > max
    {
        return Err(AppError::Validation(format!(
            "{what} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn validate_question_number(n: i32) -> Result<(), AppError> {
    if !(1..=99).contains(&n) {
        return Err(AppError::Validation("Question number must be 1-99".into()));
    }
    Ok(())
}

fn validate_max_marks(marks: i32) -> Result<(), AppError> {
    if !(1..=1000).contains(&marks) {
        return Err(AppError::Validation("Max marks must be 1-1000".into()));
    }
    Ok(())
}

pub fn validate_create_assessment(req: &CreateAssessmentRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_optional_text(&req.description, "Description", 1024)?;
    validate_optional_text(&req.drive_link, "Drive link", 512)
}

pub fn validate_update_assessment(req: &UpdateAssessmentRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_optional_text(description, "Description", 1024)?;
    }
    if let Some(ref drive_link) = req.drive_link {
        validate_optional_text(drive_link, "Drive link", 512)?;
    }
    Ok(())
}

pub fn validate_create_question(req: &CreateQuestionRequest) -> Result<(), AppError> {
    validate_question_number(req.question_number)?;
    validate_max_marks(req.max_marks)
}

pub fn validate_update_question(req: &UpdateQuestionRequest) -> Result<(), AppError> {
    if let Some(n) = req.question_number {
        validate_question_number(n)?;
    }
    if let Some(marks) = req.max_marks {
        validate_max_marks(marks)?;
    }
    Ok(())
}

pub fn validate_upsert_marks(req: &UpsertMarksRequest) -> Result<(), AppError> {
    if req.entries.is_empty() {
        return Err(AppError::Validation("entries must not be empty".into()));
    }
    if req.entries.len() > 1000 {
        return Err(AppError::Validation("Too many entries: max 1000".into()));
    }
    for entry in &req.entries {
        if entry.obtained_marks < 0.0 || !entry.obtained_marks.is_finite() {
            return Err(AppError::Validation(format!(
                "Obtained marks must be a non-negative number (student {}, question {})",
                entry.student_id, entry.question_id
            )));
        }
    }
    Ok(())
}
