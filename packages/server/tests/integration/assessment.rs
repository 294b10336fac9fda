use serde_json::json;

use crate::common::{TestApp, routes};

mod assessment_crud {
    use super::*;

    #[tokio::test]
    async fn an_assessment_can_be_created_and_fetched() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;

        let res = app
            .post_with_token(
                &routes::course_assessments(course_id),
                &json!({
                    "title": "Quiz 1",
                    "kind": "Quiz",
                    "drive_link": "https://drive.example/quiz1",
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "Create failed: {}", res.text);
        let id = res.id();

        let fetched = app.get_with_token(&routes::assessment(id), &token).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["title"], "Quiz 1");
        assert_eq!(fetched.body["kind"], "Quiz");
        assert_eq!(fetched.body["course_id"], course_id);
    }

    #[tokio::test]
    async fn a_null_drive_link_clears_the_stored_value() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;

        let created = app
            .post_with_token(
                &routes::course_assessments(course_id),
                &json!({
                    "title": "Quiz 1",
                    "kind": "Quiz",
                    "drive_link": "https://drive.example/quiz1",
                }),
                &token,
            )
            .await;
        let id = created.id();

        let res = app
            .put_with_token(&routes::assessment(id), &json!({"drive_link": null}), &token)
            .await;
        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        assert!(res.body["drive_link"].is_null());
    }

    #[tokio::test]
    async fn deleting_an_assessment_removes_its_questions_and_marks() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let assessment_id = app.create_assessment(&token, course_id, "Quiz 1").await;
        let question_id = app.create_question(&token, assessment_id, 1).await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let marks = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 7.5},
                ]}),
                &token,
            )
            .await;
        assert_eq!(marks.status, 200, "Marks failed: {}", marks.text);

        let del = app
            .delete_with_token(&routes::assessment(assessment_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let gone = app
            .get_with_token(&routes::assessment(assessment_id), &token)
            .await;
        assert_eq!(gone.status, 404);
    }
}

mod questions {
    use super::*;

    #[tokio::test]
    async fn a_question_may_reference_a_clo_of_the_same_course() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let assessment_id = app.create_assessment(&token, course_id, "Quiz 1").await;

        let clo = app
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
        let clo_id = clo.id();

        let res = app
            .post_with_token(
                &routes::questions(assessment_id),
                &json!({"question_number": 1, "max_marks": 10, "clo_id": clo_id}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "Create failed: {}", res.text);
        assert_eq!(res.body["clo_id"], clo_id);
    }

    #[tokio::test]
    async fn a_clo_from_another_course_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let other_course = app.create_course(&token, "CS-101").await;
        let assessment_id = app.create_assessment(&token, course_id, "Quiz 1").await;

        let clo = app
            .post_with_token(
                &routes::clos(other_course),
                &json!({
                    "code": "CLO-1",
                    "description": "Explain variables",
                    "domain": "Cognitive",
                }),
                &token,
            )
            .await;

        let res = app
            .post_with_token(
                &routes::questions(assessment_id),
                &json!({"question_number": 1, "max_marks": 10, "clo_id": clo.id()}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn a_question_can_be_updated_and_deleted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let assessment_id = app.create_assessment(&token, course_id, "Quiz 1").await;
        let question_id = app.create_question(&token, assessment_id, 1).await;

        let updated = app
            .put_with_token(
                &routes::question(assessment_id, question_id),
                &json!({"max_marks": 20}),
                &token,
            )
            .await;
        assert_eq!(updated.status, 200, "Update failed: {}", updated.text);
        assert_eq!(updated.body["max_marks"], 20);
        assert_eq!(updated.body["question_number"], 1);

        let del = app
            .delete_with_token(&routes::question(assessment_id, question_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let list = app
            .get_with_token(&routes::questions(assessment_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn deleting_a_clo_detaches_it_from_questions() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let course_id = app.create_course(&token, "CS-201").await;
        let assessment_id = app.create_assessment(&token, course_id, "Quiz 1").await;

        let clo = app
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
        let clo_id = clo.id();

        let question = app
            .post_with_token(
                &routes::questions(assessment_id),
                &json!({"question_number": 1, "max_marks": 10, "clo_id": clo_id}),
                &token,
            )
            .await;
        let question_id = question.id();

        let del = app
            .delete_with_token(&routes::clo(course_id, clo_id), &token)
            .await;
        assert_eq!(del.status, 204);

        let list = app
            .get_with_token(&routes::questions(assessment_id), &token)
            .await;
        let questions = list.body.as_array().unwrap();
        let detached = questions
            .iter()
            .find(|q| q["id"] == question_id)
            .unwrap();
        assert!(detached["clo_id"].is_null());
    }
}

mod marks {
    use super::*;

    async fn setup(app: &TestApp, token: &str) -> (i32, i32, i32) {
        let course_id = app.create_course(token, "CS-201").await;
        let assessment_id = app.create_assessment(token, course_id, "Quiz 1").await;
        let question_id = app.create_question(token, assessment_id, 1).await;
        (course_id, assessment_id, question_id)
    }

    /// Upsert-by-pair: re-submitting a (student, question) pair overwrites
    /// the stored marks instead of adding a second record.
    #[tokio::test]
    async fn resubmitting_a_pair_overwrites_the_stored_marks() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, assessment_id, question_id) = setup(&app, &token).await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let first = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 4.0},
                ]}),
                &token,
            )
            .await;
        assert_eq!(first.status, 200, "First batch failed: {}", first.text);
        assert_eq!(first.body["written"], 1);

        let second = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 8.5},
                ]}),
                &token,
            )
            .await;
        assert_eq!(second.status, 200, "Second batch failed: {}", second.text);

        let list = app
            .get_with_token(&routes::marks(assessment_id), &token)
            .await;
        let records = list.body.as_array().unwrap();
        assert_eq!(records.len(), 1, "pair must stay unique");
        assert_eq!(records[0]["obtained_marks"], 8.5);
    }

    #[tokio::test]
    async fn a_question_from_another_assessment_rejects_the_batch() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (course_id, assessment_id, _) = setup(&app, &token).await;
        let other = app.create_assessment(&token, course_id, "Quiz 2").await;
        let foreign_question = app.create_question(&token, other, 1).await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let res = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": foreign_question, "obtained_marks": 5.0},
                ]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn a_duplicated_pair_within_one_batch_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, assessment_id, question_id) = setup(&app, &token).await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let res = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 5.0},
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 6.0},
                ]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn an_unknown_student_rejects_the_whole_batch() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, assessment_id, question_id) = setup(&app, &token).await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let res = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 5.0},
                    {"student_id": 9999, "question_id": question_id, "obtained_marks": 5.0},
                ]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        // The transaction rolled back, so the valid entry did not land either.
        let list = app
            .get_with_token(&routes::marks(assessment_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn negative_marks_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let (_, assessment_id, question_id) = setup(&app, &token).await;
        let student_id = app.create_student(&token, "21-SE-001").await;

        let res = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": -1.0},
                ]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn teachers_can_enter_grades() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (_, assessment_id, question_id) = setup(&app, &admin).await;
        let student_id = app.create_student(&admin, "21-SE-001").await;
        let teacher = app
            .create_user_with_role("teacher@obe.test", "teachpass1", "teacher")
            .await;

        let res = app
            .put_with_token(
                &routes::marks(assessment_id),
                &json!({"entries": [
                    {"student_id": student_id, "question_id": question_id, "obtained_marks": 9.0},
                ]}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 200, "Teacher batch failed: {}", res.text);
    }
}
