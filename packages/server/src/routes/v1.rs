use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/invitations", invitation_routes())
        .nest("/programs", program_routes())
        .nest("/programs/{id}/plos", plo_routes())
        .nest("/programs/{id}/study-plan", program_study_plan_routes())
        .nest("/study-plan", study_plan_routes())
        .nest("/courses", course_routes())
        .nest("/courses/{id}/clos", clo_routes())
        .nest("/courses/{id}/enrollments", enrollment_routes())
        .nest("/courses/{id}/assessments", course_assessment_routes())
        .nest("/assessments", assessment_routes())
        .nest("/assessments/{id}/questions", question_routes())
        .nest("/classes", class_routes())
        .nest("/classes/{id}/assignments", assignment_routes())
        .nest("/students", student_routes())
        .nest("/dashboard", dashboard_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
        .routes(routes!(handlers::auth::change_password))
}

fn invitation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::invite_teacher))
}

fn program_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::program::create_program,
            handlers::program::list_programs
        ))
        .routes(routes!(
            handlers::program::get_program,
            handlers::program::update_program,
            handlers::program::delete_program
        ))
        .routes(routes!(handlers::program::bulk_import_programs))
}

fn plo_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::program::create_plo,
            handlers::program::list_plos
        ))
        .routes(routes!(
            handlers::program::update_plo,
            handlers::program::delete_plo
        ))
        .routes(routes!(handlers::program::bulk_import_plos))
}

fn program_study_plan_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::study_plan::create_entry,
        handlers::study_plan::list_entries
    ))
}

fn study_plan_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::study_plan::update_entry,
            handlers::study_plan::delete_entry
        ))
        .routes(routes!(handlers::study_plan::bulk_import_entries))
}

fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::create_course,
            handlers::course::list_courses
        ))
        .routes(routes!(
            handlers::course::get_course,
            handlers::course::update_course,
            handlers::course::delete_course
        ))
        .routes(routes!(handlers::course::bulk_import_courses))
}

fn clo_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::outcome::create_clo,
            handlers::outcome::list_clos
        ))
        .routes(routes!(
            handlers::outcome::update_clo,
            handlers::outcome::delete_clo
        ))
        .routes(routes!(handlers::outcome::get_clo_mapping))
}

fn enrollment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::student::enroll_students,
            handlers::student::list_enrolled_students
        ))
        .routes(routes!(handlers::student::unenroll_student))
}

fn course_assessment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::assessment::create_assessment,
        handlers::assessment::list_assessments
    ))
}

fn assessment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::assessment::get_assessment,
            handlers::assessment::update_assessment,
            handlers::assessment::delete_assessment
        ))
        .routes(routes!(
            handlers::assessment::list_marks,
            handlers::assessment::upsert_marks
        ))
}

fn question_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::assessment::create_question,
            handlers::assessment::list_questions
        ))
        .routes(routes!(
            handlers::assessment::update_question,
            handlers::assessment::delete_question
        ))
}

fn class_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::classes::create_class,
            handlers::classes::list_classes
        ))
        .routes(routes!(
            handlers::classes::get_class,
            handlers::classes::update_class,
            handlers::classes::delete_class
        ))
}

fn assignment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::classes::assign_course,
            handlers::classes::list_assignments
        ))
        .routes(routes!(handlers::classes::remove_assignment))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::student::create_student,
            handlers::student::list_students
        ))
        .routes(routes!(
            handlers::student::get_student,
            handlers::student::update_student,
            handlers::student::delete_student
        ))
        .routes(routes!(handlers::student::bulk_import_students))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::dashboard::stats))
}
