use serde_json::json;

use crate::common::{TestApp, routes};

mod class_crud {
    use super::*;

    #[tokio::test]
    async fn a_class_can_be_created_and_fetched() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;

        let class_id = app.create_class(&token, program_id, "BSSE-3A").await;

        let res = app.get_with_token(&routes::class(class_id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "BSSE-3A");
        assert_eq!(res.body["section"], "A");
        assert_eq!(res.body["academic_session"], "Fall 2025");
    }

    #[tokio::test]
    async fn creating_a_class_for_a_missing_program_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::CLASSES,
                &json!({
                    "program_id": 999,
                    "name": "Ghost",
                    "semester": 1,
                    "section": "A",
                    "academic_session": "Fall 2025",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn deleting_a_class_drops_its_assignments() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let course_id = app.create_course(&token, "CS-201").await;
        let class_id = app.create_class(&token, program_id, "BSSE-3A").await;
        let teacher_id = invite_teacher_id(&app, &token, "t1@obe.test").await;

        let assign = app
            .post_with_token(
                &routes::assignments(class_id),
                &json!({"course_id": course_id, "teacher_id": teacher_id}),
                &token,
            )
            .await;
        assert_eq!(assign.status, 200, "Assign failed: {}", assign.text);

        let del = app.delete_with_token(&routes::class(class_id), &token).await;
        assert_eq!(del.status, 204);

        let res = app.get_with_token(&routes::class(class_id), &token).await;
        assert_eq!(res.status, 404);
    }
}

/// Invite a teacher through the API and read the new account id back.
async fn invite_teacher_id(app: &TestApp, admin_token: &str, email: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::INVITATIONS,
            &json!({"email": email, "full_name": "Course Teacher"}),
            admin_token,
        )
        .await;
    assert_eq!(res.status, 201, "Invite failed: {}", res.text);
    res.id()
}

mod assignments {
    use super::*;

    /// Upsert-by-pair: assigning the same (class, course) twice swaps the
    /// teacher instead of duplicating the assignment.
    #[tokio::test]
    async fn reassigning_a_course_replaces_the_teacher() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let course_id = app.create_course(&token, "CS-201").await;
        let class_id = app.create_class(&token, program_id, "BSSE-3A").await;
        let first_teacher = invite_teacher_id(&app, &token, "t1@obe.test").await;
        let second_teacher = invite_teacher_id(&app, &token, "t2@obe.test").await;

        let first = app
            .post_with_token(
                &routes::assignments(class_id),
                &json!({"course_id": course_id, "teacher_id": first_teacher}),
                &token,
            )
            .await;
        assert_eq!(first.status, 200, "First assign failed: {}", first.text);

        let second = app
            .post_with_token(
                &routes::assignments(class_id),
                &json!({"course_id": course_id, "teacher_id": second_teacher}),
                &token,
            )
            .await;
        assert_eq!(second.status, 200, "Reassign failed: {}", second.text);

        let list = app
            .get_with_token(&routes::assignments(class_id), &token)
            .await;
        let assignments = list.body.as_array().unwrap();
        assert_eq!(assignments.len(), 1, "pair must stay unique");
        assert_eq!(assignments[0]["teacher_id"], second_teacher);
        assert_eq!(assignments[0]["course_code"], "CS-201");
    }

    #[tokio::test]
    async fn assigning_a_non_teacher_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let course_id = app.create_course(&token, "CS-201").await;
        let class_id = app.create_class(&token, program_id, "BSSE-3A").await;

        // The bootstrap admin is not a teacher.
        let me = app.get_with_token(routes::ME, &token).await;
        let admin_id = me.body["id"].as_i64().unwrap() as i32;

        let res = app
            .post_with_token(
                &routes::assignments(class_id),
                &json!({"course_id": course_id, "teacher_id": admin_id}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn an_assignment_can_be_removed_once() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let course_id = app.create_course(&token, "CS-201").await;
        let class_id = app.create_class(&token, program_id, "BSSE-3A").await;
        let teacher_id = invite_teacher_id(&app, &token, "t1@obe.test").await;

        app.post_with_token(
            &routes::assignments(class_id),
            &json!({"course_id": course_id, "teacher_id": teacher_id}),
            &token,
        )
        .await;

        let del = app
            .delete_with_token(&routes::assignment(class_id, course_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let again = app
            .delete_with_token(&routes::assignment(class_id, course_id), &token)
            .await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn teachers_cannot_manage_assignments() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let program_id = app.create_program(&admin, "BSSE").await;
        let course_id = app.create_course(&admin, "CS-201").await;
        let class_id = app.create_class(&admin, program_id, "BSSE-3A").await;
        let teacher = app
            .create_user_with_role("teacher@obe.test", "teachpass1", "teacher")
            .await;

        let res = app
            .post_with_token(
                &routes::assignments(class_id),
                &json!({"course_id": course_id, "teacher_id": 1}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
