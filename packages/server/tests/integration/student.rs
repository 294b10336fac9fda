use serde_json::json;

use crate::common::{TestApp, routes};

mod student_crud {
    use super::*;

    #[tokio::test]
    async fn duplicate_registration_numbers_are_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.create_student(&token, "21-SE-001").await;

        let res = app
            .post_with_token(
                routes::STUDENTS,
                &json!({"name": "Other Student", "reg_no": "21-SE-001", "batch": "F21"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn a_null_email_clears_the_stored_address() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::STUDENTS,
                &json!({
                    "name": "Ada Lovelace",
                    "reg_no": "21-SE-001",
                    "email": "ada@obe.test",
                    "batch": "F21",
                }),
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "Create failed: {}", created.text);
        let id = created.id();

        let cleared = app
            .put_with_token(&routes::student(id), &json!({"email": null}), &token)
            .await;
        assert_eq!(cleared.status, 200, "Update failed: {}", cleared.text);
        assert!(cleared.body["email"].is_null());

        // An update that doesn't mention email leaves it alone.
        let renamed = app
            .put_with_token(&routes::student(id), &json!({"batch": "F22"}), &token)
            .await;
        assert!(renamed.body["email"].is_null());
        assert_eq!(renamed.body["batch"], "F22");
    }

    #[tokio::test]
    async fn deleting_a_student_removes_their_enrollments() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        app.post_with_token(
            &routes::enrollments(course_id),
            &json!({"student_ids": [student_id]}),
            &token,
        )
        .await;

        let del = app
            .delete_with_token(&routes::student(student_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let list = app
            .get_with_token(&routes::enrollments(course_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }
}

mod enrollments {
    use super::*;

    /// Idempotence: repeating an enrollment batch counts only the pairs that
    /// are actually new.
    #[tokio::test]
    async fn repeated_enrollment_batches_only_count_new_pairs() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let s1 = app.create_student(&token, "21-SE-001").await;
        let s2 = app.create_student(&token, "21-SE-002").await;
        let s3 = app.create_student(&token, "21-SE-003").await;

        let first = app
            .post_with_token(
                &routes::enrollments(course_id),
                &json!({"student_ids": [s1, s2]}),
                &token,
            )
            .await;
        assert_eq!(first.status, 200, "Enroll failed: {}", first.text);
        assert_eq!(first.body["enrolled"], 2);

        // Overlapping batch: only the new student counts.
        let second = app
            .post_with_token(
                &routes::enrollments(course_id),
                &json!({"student_ids": [s1, s2, s3]}),
                &token,
            )
            .await;
        assert_eq!(second.status, 200, "Enroll failed: {}", second.text);
        assert_eq!(second.body["enrolled"], 1);

        let list = app
            .get_with_token(&routes::enrollments(course_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn enrolling_an_unknown_student_fails_the_whole_batch() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let s1 = app.create_student(&token, "21-SE-001").await;

        let res = app
            .post_with_token(
                &routes::enrollments(course_id),
                &json!({"student_ids": [s1, 9999]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        // Nothing was applied.
        let list = app
            .get_with_token(&routes::enrollments(course_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn an_empty_batch_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;

        let res = app
            .post_with_token(
                &routes::enrollments(course_id),
                &json!({"student_ids": []}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn a_duplicated_id_within_one_batch_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let res = app
            .post_with_token(
                &routes::enrollments(course_id),
                &json!({"student_ids": [student_id, student_id]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].as_str().unwrap().contains("student_ids"));
    }

    #[tokio::test]
    async fn a_student_can_be_unenrolled_once() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        app.post_with_token(
            &routes::enrollments(course_id),
            &json!({"student_ids": [student_id]}),
            &token,
        )
        .await;

        let del = app
            .delete_with_token(&routes::enrollment(course_id, student_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let again = app
            .delete_with_token(&routes::enrollment(course_id, student_id), &token)
            .await;
        assert_eq!(again.status, 404);
    }
}
