//! Fixed vocabulary shared by the API and its clients: learning domains,
//! Bloom's-taxonomy level codes, emphasis levels, and assessment types.

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Learning domain of an outcome (the three Bloom's taxonomy domains).
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum LearningDomain {
    /// Knowledge and intellectual skills (levels C1-C6).
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Cognitive"))]
    Cognitive,
    /// Physical and manual skills (levels P1-P7).
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Psychomotor"))]
    Psychomotor,
    /// Attitudes and values (levels A1-A5).
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Affective"))]
    Affective,
}

impl LearningDomain {
    /// All domains.
    pub const ALL: &'static [LearningDomain] =
        &[Self::Cognitive, Self::Psychomotor, Self::Affective];

    /// Single-letter prefix used in level codes ("C3", "P2", "A1").
    pub fn prefix(&self) -> char {
        match self {
            Self::Cognitive => 'C',
            Self::Psychomotor => 'P',
            Self::Affective => 'A',
        }
    }

    /// Highest level number defined for this domain.
    pub fn max_level(&self) -> u8 {
        match self {
            Self::Cognitive => 6,
            Self::Psychomotor => 7,
            Self::Affective => 5,
        }
    }

    /// The lowest level code of this domain ("C1", "P1", "A1").
    pub fn base_level(&self) -> String {
        format!("{}1", self.prefix())
    }

    /// Whether `code` is a valid Bloom's level code for this domain.
    ///
    /// Codes are a domain prefix followed by a level number, e.g. `C1`-`C6`
    /// for the cognitive domain.
    pub fn is_valid_level(&self, code: &str) -> bool {
        let mut chars = code.chars();
        if chars.next() != Some(self.prefix()) {
            return false;
        }
        match chars.as_str().parse::<u8>() {
            Ok(n) => (1..=self.max_level()).contains(&n),
            Err(_) => false,
        }
    }

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cognitive => "Cognitive",
            Self::Psychomotor => "Psychomotor",
            Self::Affective => "Affective",
        }
    }
}

impl fmt::Display for LearningDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningDomain {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cognitive" => Ok(Self::Cognitive),
            "Psychomotor" => Ok(Self::Psychomotor),
            "Affective" => Ok(Self::Affective),
            _ => Err(ParseVocabularyError {
                invalid: s.to_string(),
                expected: "Cognitive, Psychomotor, Affective",
            }),
        }
    }
}

/// Qualitative weight of a CLO's contribution to a mapped PLO.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum EmphasisLevel {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Low"))]
    Low,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Medium"))]
    Medium,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "High"))]
    High,
}

impl EmphasisLevel {
    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Default for EmphasisLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for EmphasisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmphasisLevel {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            _ => Err(ParseVocabularyError {
                invalid: s.to_string(),
                expected: "Low, Medium, High",
            }),
        }
    }
}

/// Kind of an assessment instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum AssessmentType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Quiz"))]
    Quiz,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Assignment"))]
    Assignment,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Exam"))]
    Exam,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Project"))]
    Project,
}

impl AssessmentType {
    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "Quiz",
            Self::Assignment => "Assignment",
            Self::Exam => "Exam",
            Self::Project => "Project",
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentType {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Quiz" => Ok(Self::Quiz),
            "Assignment" => Ok(Self::Assignment),
            "Exam" => Ok(Self::Exam),
            "Project" => Ok(Self::Project),
            _ => Err(ParseVocabularyError {
                invalid: s.to_string(),
                expected: "Quiz, Assignment, Exam, Project",
            }),
        }
    }
}

/// Error when parsing an invalid vocabulary string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVocabularyError {
    invalid: String,
    expected: &'static str,
}

impl fmt::Display for ParseVocabularyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value '{}'. Valid values: {}",
            self.invalid, self.expected
        )
    }
}

impl std::error::Error for ParseVocabularyError {}
