use serde_json::json;

use crate::common::{TestApp, routes};

async fn setup(app: &TestApp, token: &str) -> (i32, i32, i32) {
    let program_id = app.create_program(token, "BSSE").await;
    let course_id = app.create_course(token, "CS-201").await;
    let plo_id = app.create_plo(token, program_id, 1).await;
    (program_id, course_id, plo_id)
}

mod clo_crud {
    use super::*;

    #[tokio::test]
    async fn create_without_plo_leaves_no_mapping() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, course_id, _) = setup(&app, &token).await;

        let res = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "CLO create failed: {}", res.text);
        assert_eq!(res.body["is_active"], true);
        let clo_id = res.id();

        let mapping = app
            .get_with_token(&routes::clo_mapping(course_id, clo_id), &token)
            .await;
        assert_eq!(mapping.status, 200);
        assert_eq!(mapping.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn taxonomy_fields_without_a_plo_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, course_id, _) = setup(&app, &token).await;

        let res = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                    "level": "C2",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn a_level_code_from_another_domain_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, course_id, plo_id) = setup(&app, &token).await;

        let res = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Assemble a circuit",
                    "domain": "Psychomotor",
                    "plo_id": plo_id,
                    "level": "C3",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn teachers_can_manage_clos() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (_, course_id, _) = setup(&app, &admin).await;
        let teacher = app
            .create_user_with_role("teacher@obe.test", "teachpass1", "teacher")
            .await;

        let res = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                }),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 201, "CLO create failed: {}", res.text);
    }
}

mod mapping {
    use super::*;

    /// One mapping per CLO: creating with a PLO forges the edge with
    /// defaulted taxonomy fields.
    #[tokio::test]
    async fn create_with_plo_defaults_level_and_emphasis() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, course_id, plo_id) = setup(&app, &token).await;

        let res = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                    "plo_id": plo_id,
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "CLO create failed: {}", res.text);
        let clo_id = res.id();

        let mapping = app
            .get_with_token(&routes::clo_mapping(course_id, clo_id), &token)
            .await;
        let edges = mapping.body.as_array().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0]["plo_id"], plo_id);
        assert_eq!(edges[0]["learning_type"], "Cognitive");
        assert_eq!(edges[0]["level"], "C1");
        assert_eq!(edges[0]["emphasis_level"], "Medium");
    }

    /// Re-targeting the mapping replaces the edge instead of adding a second
    /// one.
    #[tokio::test]
    async fn updating_the_plo_replaces_the_edge_rather_than_appending() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (program_id, course_id, plo_one) = setup(&app, &token).await;
        let plo_two = app.create_plo(&token, program_id, 2).await;

        let created = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                    "plo_id": plo_one,
                    "level": "C3",
                }),
                &token,
            )
            .await;
        let clo_id = created.id();

        let update = app
            .put_with_token(
                &routes::clo(course_id, clo_id),
                &json!({"plo_id": plo_two}),
                &token,
            )
            .await;
        assert_eq!(update.status, 200, "CLO update failed: {}", update.text);

        let mapping = app
            .get_with_token(&routes::clo_mapping(course_id, clo_id), &token)
            .await;
        let edges = mapping.body.as_array().unwrap();
        assert_eq!(edges.len(), 1, "mapping must stay a single edge");
        assert_eq!(edges[0]["plo_id"], plo_two);
        // Taxonomy fields carry over when untouched.
        assert_eq!(edges[0]["level"], "C3");
    }

    #[tokio::test]
    async fn a_null_plo_clears_the_mapping_and_an_absent_one_leaves_it() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, course_id, plo_id) = setup(&app, &token).await;

        let created = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                    "plo_id": plo_id,
                }),
                &token,
            )
            .await;
        let clo_id = created.id();

        // Absent plo_id: rename only, edge untouched.
        let rename = app
            .put_with_token(
                &routes::clo(course_id, clo_id),
                &json!({"code": "CLO-1R"}),
                &token,
            )
            .await;
        assert_eq!(rename.status, 200);
        let mapping = app
            .get_with_token(&routes::clo_mapping(course_id, clo_id), &token)
            .await;
        assert_eq!(mapping.body.as_array().unwrap().len(), 1);

        // Explicit null: edge cleared.
        let clear = app
            .put_with_token(
                &routes::clo(course_id, clo_id),
                &json!({"plo_id": null}),
                &token,
            )
            .await;
        assert_eq!(clear.status, 200, "CLO update failed: {}", clear.text);
        let mapping = app
            .get_with_token(&routes::clo_mapping(course_id, clo_id), &token)
            .await;
        assert_eq!(mapping.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn deleting_the_clo_removes_its_edge() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, course_id, plo_id) = setup(&app, &token).await;

        let created = app
            .post_with_token(
                &routes::clos(course_id),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain basic data structures",
                    "domain": "Cognitive",
                    "plo_id": plo_id,
                }),
                &token,
            )
            .await;
        let clo_id = created.id();

        let del = app
            .delete_with_token(&routes::clo(course_id, clo_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let mapping = app
            .get_with_token(&routes::clo_mapping(course_id, clo_id), &token)
            .await;
        assert_eq!(mapping.status, 404);
    }
}
