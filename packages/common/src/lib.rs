pub mod mail;
pub mod taxonomy;

pub use taxonomy::{AssessmentType, EmphasisLevel, LearningDomain};
