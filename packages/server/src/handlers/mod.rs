pub mod assessment;
pub mod auth;
pub mod classes;
pub mod course;
pub mod dashboard;
pub mod outcome;
pub mod program;
pub mod student;
pub mod study_plan;
