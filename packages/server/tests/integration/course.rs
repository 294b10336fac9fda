use serde_json::json;

use crate::common::{TestApp, routes};

mod course_crud {
    use super::*;

    #[tokio::test]
    async fn a_partial_update_only_touches_the_named_fields() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_course(&token, "CS-201").await;

        let res = app
            .put_with_token(&routes::course(id), &json!({"credit_hours": 4}), &token)
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        assert_eq!(res.body["credit_hours"], 4);
        assert_eq!(res.body["code"], "CS-201");
        assert_eq!(res.body["title"], "Data Structures");
    }

    #[tokio::test]
    async fn duplicate_course_codes_are_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.create_course(&token, "CS-201").await;

        let res = app
            .post_with_token(
                routes::COURSES,
                &json!({"code": "CS-201", "title": "Duplicate", "credit_hours": 3}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn a_course_with_assessments_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let assessment_id = app.create_assessment(&token, course_id, "Quiz 1").await;

        let refused = app
            .delete_with_token(&routes::course(course_id), &token)
            .await;
        assert_eq!(refused.status, 409);
        assert_eq!(refused.body["code"], "CONFLICT");

        let del = app
            .delete_with_token(&routes::assessment(assessment_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let res = app
            .delete_with_token(&routes::course(course_id), &token)
            .await;
        assert_eq!(res.status, 204);
    }

    #[tokio::test]
    async fn deleting_a_course_cascades_its_clos_and_plan_entries() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let course_id = app.create_course(&token, "CS-201").await;

        app.post_with_token(
            &routes::clos(course_id),
            &json!({
                "code": "CLO-1",
                "description": "Explain basic data structures",
                "domain": "Cognitive",
            }),
            &token,
        )
        .await;
        app.post_with_token(
            &routes::study_plan(program_id),
            &json!({"course_id": course_id, "semester": 3, "course_type": "Core"}),
            &token,
        )
        .await;

        let del = app
            .delete_with_token(&routes::course(course_id), &token)
            .await;
        assert_eq!(del.status, 204, "Delete failed: {}", del.text);

        let plan = app
            .get_with_token(&routes::study_plan(program_id), &token)
            .await;
        assert_eq!(plan.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn teachers_cannot_create_courses() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("teacher@obe.test", "teachpass1", "teacher")
            .await;

        let res = app
            .post_with_token(
                routes::COURSES,
                &json!({"code": "CS-201", "title": "Data Structures", "credit_hours": 3}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
