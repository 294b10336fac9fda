use serde_json::json;

use crate::common::{TestApp, routes};

mod program_crud {
    use super::*;

    #[tokio::test]
    async fn a_partial_update_only_touches_the_named_fields() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_program(&token, "BSSE").await;

        let res = app
            .put_with_token(
                &routes::program(id),
                &json!({"title": "Software Engineering (revised)"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        assert_eq!(res.body["title"], "Software Engineering (revised)");
        assert_eq!(res.body["code"], "BSSE");
        assert_eq!(res.body["duration_years"], 4);
    }

    #[tokio::test]
    async fn duplicate_program_codes_are_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.create_program(&token, "BSSE").await;
        let other = app.create_program(&token, "BSCS").await;

        let res = app
            .put_with_token(&routes::program(other), &json!({"code": "BSSE"}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn a_program_with_classes_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let class_id = app.create_class(&token, program_id, "BSSE-3A").await;

        let refused = app
            .delete_with_token(&routes::program(program_id), &token)
            .await;
        assert_eq!(refused.status, 409);
        assert_eq!(refused.body["code"], "CONFLICT");

        // Once the class is gone the program can be deleted, PLOs included.
        app.create_plo(&token, program_id, 1).await;
        let class_del = app.delete_with_token(&routes::class(class_id), &token).await;
        assert_eq!(class_del.status, 204);

        let del = app
            .delete_with_token(&routes::program(program_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let gone = app.get_with_token(&routes::program(program_id), &token).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn programs_are_listed_in_code_order() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.create_program(&token, "BSSE").await;
        app.create_program(&token, "BSCS").await;

        let res = app.get_with_token(routes::PROGRAMS, &token).await;
        let programs = res.body.as_array().unwrap();
        assert_eq!(programs[0]["code"], "BSCS");
        assert_eq!(programs[1]["code"], "BSSE");
    }
}

mod plo_crud {
    use super::*;

    #[tokio::test]
    async fn a_plo_can_be_created_with_a_description() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;

        let res = app
            .post_with_token(
                &routes::plos(program_id),
                &json!({
                    "plo_number": 1,
                    "title": "Engineering Knowledge",
                    "description": "Apply knowledge of mathematics and science",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "Create failed: {}", res.text);
        assert_eq!(res.body["plo_number"], 1);
        assert_eq!(
            res.body["description"],
            "Apply knowledge of mathematics and science"
        );
    }

    #[tokio::test]
    async fn a_null_description_clears_the_stored_value() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;

        let created = app
            .post_with_token(
                &routes::plos(program_id),
                &json!({
                    "plo_number": 1,
                    "title": "Engineering Knowledge",
                    "description": "To be removed",
                }),
                &token,
            )
            .await;
        let plo_id = created.id();

        let cleared = app
            .put_with_token(
                &routes::plo(program_id, plo_id),
                &json!({"description": null}),
                &token,
            )
            .await;
        assert_eq!(cleared.status, 200, "Update failed: {}", cleared.text);
        assert!(cleared.body["description"].is_null());

        // A rename afterwards leaves the cleared description alone.
        let renamed = app
            .put_with_token(
                &routes::plo(program_id, plo_id),
                &json!({"title": "Problem Analysis"}),
                &token,
            )
            .await;
        assert!(renamed.body["description"].is_null());
    }

    #[tokio::test]
    async fn a_plo_of_another_program_is_not_reachable() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        let other = app.create_program(&token, "BSCS").await;
        let plo_id = app.create_plo(&token, program_id, 1).await;

        let res = app
            .delete_with_token(&routes::plo(other, plo_id), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod study_plan {
    use super::*;

    async fn setup(app: &TestApp, token: &str) -> (i32, i32) {
        let program_id = app.create_program(token, "BSSE").await;
        let course_id = app.create_course(token, "CS-201").await;
        (program_id, course_id)
    }

    #[tokio::test]
    async fn an_entry_joins_course_details_into_the_plan() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (program_id, course_id) = setup(&app, &token).await;

        let created = app
            .post_with_token(
                &routes::study_plan(program_id),
                &json!({"course_id": course_id, "semester": 3, "course_type": "Core"}),
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "Create failed: {}", created.text);

        let plan = app
            .get_with_token(&routes::study_plan(program_id), &token)
            .await;
        let entries = plan.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["course_code"], "CS-201");
        assert_eq!(entries[0]["credit_hours"], 3);
        assert_eq!(entries[0]["semester"], 3);
    }

    #[tokio::test]
    async fn the_same_course_cannot_appear_twice_in_one_plan() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (program_id, course_id) = setup(&app, &token).await;
        let body = json!({"course_id": course_id, "semester": 3, "course_type": "Core"});

        let first = app
            .post_with_token(&routes::study_plan(program_id), &body, &token)
            .await;
        assert_eq!(first.status, 201, "Create failed: {}", first.text);

        let res = app
            .post_with_token(&routes::study_plan(program_id), &body, &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn an_entry_can_be_moved_to_another_semester_and_removed() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (program_id, course_id) = setup(&app, &token).await;

        let created = app
            .post_with_token(
                &routes::study_plan(program_id),
                &json!({"course_id": course_id, "semester": 3, "course_type": "Core"}),
                &token,
            )
            .await;
        let entry_id = created.id();

        let moved = app
            .put_with_token(
                &routes::study_plan_entry(entry_id),
                &json!({"semester": 4, "course_type": "Elective"}),
                &token,
            )
            .await;
        assert_eq!(moved.status, 200, "Update failed: {}", moved.text);
        assert_eq!(moved.body["semester"], 4);
        assert_eq!(moved.body["course_type"], "Elective");

        let del = app
            .delete_with_token(&routes::study_plan_entry(entry_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let again = app
            .delete_with_token(&routes::study_plan_entry(entry_id), &token)
            .await;
        assert_eq!(again.status, 404);
    }
}

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn stats_count_every_entity_and_group_students_by_batch() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let program_id = app.create_program(&token, "BSSE").await;
        app.create_course(&token, "CS-201").await;
        app.create_course(&token, "CS-101").await;
        app.create_class(&token, program_id, "BSSE-3A").await;
        app.create_student(&token, "21-SE-001").await;
        app.create_student(&token, "21-SE-002").await;
        app.post_with_token(
            routes::STUDENTS,
            &json!({"name": "New Batch", "reg_no": "22-SE-001", "batch": "F22"}),
            &token,
        )
        .await;
        app.create_user_with_role("teacher@obe.test", "teachpass1", "teacher")
            .await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &token).await;

        assert_eq!(res.status, 200, "Stats failed: {}", res.text);
        assert_eq!(res.body["programs"], 1);
        assert_eq!(res.body["courses"], 2);
        assert_eq!(res.body["classes"], 1);
        assert_eq!(res.body["students"], 3);
        assert_eq!(res.body["teachers"], 1);

        let per_batch = res.body["students_per_batch"].as_array().unwrap();
        assert_eq!(per_batch.len(), 2);
        let f21 = per_batch.iter().find(|b| b["batch"] == "F21").unwrap();
        let f22 = per_batch.iter().find(|b| b["batch"] == "F22").unwrap();
        assert_eq!(f21["count"], 2);
        assert_eq!(f22["count"], 1);
    }

    #[tokio::test]
    async fn stats_require_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::DASHBOARD_STATS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
