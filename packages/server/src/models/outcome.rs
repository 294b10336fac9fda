use common::taxonomy::{EmphasisLevel, LearningDomain};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_code;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCloRequest {
    pub code: String,
    pub description: String,
    pub domain: LearningDomain,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// When present, one mapping edge to this PLO is created alongside the CLO.
    pub plo_id: Option<i32>,
    /// Bloom's level code for the mapping; defaults to the base level of the
    /// CLO's domain.
    pub level: Option<String>,
    /// Defaults to Medium.
    pub emphasis_level: Option<EmphasisLevel>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCloRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub domain: Option<LearningDomain>,
    pub is_active: Option<bool>,
    /// Three-state field: omit to leave the mapping untouched, set to null to
    /// clear it, or provide a PLO id to replace it.
    #[serde(default, deserialize_with = "super::shared::double_option")]
    pub plo_id: Option<Option<i32>>,
    pub level: Option<String>,
    pub emphasis_level: Option<EmphasisLevel>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CloResponse {
    pub id: i32,
    pub course_id: i32,
    pub code: String,
    pub description: String,
    pub domain: LearningDomain,
    pub is_active: bool,
}

impl From<crate::entity::clo::Model> for CloResponse {
    fn from(m: crate::entity::clo::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            code: m.code,
            description: m.description,
            domain: m.domain,
            is_active: m.is_active,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MappingResponse {
    pub clo_id: i32,
    pub plo_id: i32,
    pub learning_type: LearningDomain,
    pub level: String,
    pub emphasis_level: EmphasisLevel,
}

impl From<crate::entity::clo_plo_mapping::Model> for MappingResponse {
    fn from(m: crate::entity::clo_plo_mapping::Model) -> Self {
        Self {
            clo_id: m.clo_id,
            plo_id: m.plo_id,
            learning_type: m.learning_type,
            level: m.level,
            emphasis_level: m.emphasis_level,
        }
    }
}

fn validate_description(description: &str) -> Result<(), AppError> {
    let description = description.trim();
    if description.is_empty() || description.chars().count() > 1024 {
        return Err(AppError::Validation(
            "Description must be 1-1024 characters".into(),
        ));
    }
    Ok(())
}

/// Check a Bloom's level code against the domain it claims to classify.
pub fn validate_level(domain: LearningDomain, level: &str) -> Result<(), AppError> {
    if !domain.is_valid_level(level) {
        return Err(AppError::Validation(format!(
            "'{level}' is not a valid {domain} level code (expected {}1-{}{})",
            domain.prefix(),
            domain.prefix(),
            domain.max_level(),
        )));
    }
    Ok(())
}

pub fn validate_create_clo(req: &CreateCloRequest) -> Result<(), AppError> {
    validate_code(&req.code, "CLO")?;
    validate_description(&req.description)?;
    if let Some(ref level) = req.level {
        validate_level(req.domain, level)?;
    }
    if req.plo_id.is_none() && (req.level.is_some() || req.emphasis_level.is_some()) {
        return Err(AppError::Validation(
            "level and emphasis_level require a plo_id".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_clo(req: &UpdateCloRequest) -> Result<(), AppError> {
    if let Some(ref code) = req.code {
        validate_code(code, "CLO")?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    // Level codes are checked against the effective domain in the handler,
    // where the stored CLO is available.
    Ok(())
}
