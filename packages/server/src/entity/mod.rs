pub mod assessment;
pub mod assessment_question;
pub mod class_section;
pub mod clo;
pub mod clo_plo_mapping;
pub mod course;
pub mod course_assignment;
pub mod enrollment;
pub mod plo;
pub mod program;
pub mod program_course;
pub mod role;
pub mod role_permission;
pub mod student;
pub mod student_mark;
pub mod user;
