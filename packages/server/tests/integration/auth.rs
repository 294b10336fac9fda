use std::sync::Arc;

use serde_json::json;

use crate::common::{ADMIN_EMAIL, ADMIN_PASSWORD, FailingMailer, RecordingMailer, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn admin_can_log_in_with_seeded_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["role"], "admin");
        assert_eq!(res.body["is_first_login"], false);
        assert!(
            res.body["permissions"]
                .as_array()
                .unwrap()
                .iter()
                .any(|p| p == "program:manage")
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": ADMIN_EMAIL, "password": "not-the-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_email_is_rejected_with_the_same_error_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@obe.test", "password": "whatever1"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn returns_the_calling_users_profile() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["email"], ADMIN_EMAIL);
        assert_eq!(res.body["role"], "admin");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod invitations {
    use super::*;

    #[tokio::test]
    async fn admin_can_invite_a_teacher_and_the_mail_carries_credentials() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = TestApp::spawn_with_mailer(mailer.clone()).await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::INVITATIONS,
                &json!({"email": "teacher@obe.test", "full_name": "Grace Hopper"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "Invite failed: {}", res.text);
        assert_eq!(res.body["email_sent"], true);
        assert!(res.body["temporary_password"].is_null());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "teacher@obe.test");
        assert!(sent[0].body.contains("Temporary password"));
    }

    #[tokio::test]
    async fn mail_failure_still_creates_the_account_and_returns_the_password() {
        let app = TestApp::spawn_with_mailer(Arc::new(FailingMailer)).await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::INVITATIONS,
                &json!({"email": "teacher@obe.test", "full_name": "Grace Hopper"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "Invite failed: {}", res.text);
        assert_eq!(res.body["email_sent"], false);
        let temp_password = res.body["temporary_password"]
            .as_str()
            .expect("temporary password should be returned when mail fails");

        // The account is usable with the returned credentials.
        let login = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "teacher@obe.test", "password": temp_password}),
            )
            .await;
        assert_eq!(login.status, 200, "Login failed: {}", login.text);
        assert_eq!(login.body["is_first_login"], true);
        assert_eq!(login.body["role"], "teacher");
    }

    #[tokio::test]
    async fn inviting_an_existing_email_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let body = json!({"email": "teacher@obe.test", "full_name": "Grace Hopper"});

        let first = app.post_with_token(routes::INVITATIONS, &body, &token).await;
        assert_eq!(first.status, 201, "First invite failed: {}", first.text);

        let res = app.post_with_token(routes::INVITATIONS, &body, &token).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn teachers_cannot_invite() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("existing@obe.test", "teachpass1", "teacher")
            .await;

        let res = app
            .post_with_token(
                routes::INVITATIONS,
                &json!({"email": "another@obe.test", "full_name": "Someone"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod password_change {
    use super::*;

    /// First-login state machine: an invited teacher logs in with the
    /// temporary password, changes it, and every token issued before the
    /// change stops working.
    #[tokio::test]
    async fn changing_the_password_clears_first_login_and_invalidates_old_tokens() {
        let app = TestApp::spawn_with_mailer(Arc::new(FailingMailer)).await;
        let admin = app.admin_token().await;

        let invite = app
            .post_with_token(
                routes::INVITATIONS,
                &json!({"email": "teacher@obe.test", "full_name": "Grace Hopper"}),
                &admin,
            )
            .await;
        let temp_password = invite.body["temporary_password"].as_str().unwrap().to_string();

        let login = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "teacher@obe.test", "password": temp_password}),
            )
            .await;
        assert_eq!(login.body["is_first_login"], true);
        let old_token = login.body["token"].as_str().unwrap().to_string();

        let change = app
            .post_with_token(
                routes::PASSWORD,
                &json!({
                    "current_password": temp_password,
                    "new_password": "my-chosen-pass-9",
                }),
                &old_token,
            )
            .await;
        assert_eq!(change.status, 204, "Password change failed: {}", change.text);

        // The token used for the change itself is now rejected.
        let me = app.get_with_token(routes::ME, &old_token).await;
        assert_eq!(me.status, 401);
        assert_eq!(me.body["code"], "TOKEN_INVALID");

        // A fresh login with the new password works and the gate is cleared.
        let relogin = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "teacher@obe.test", "password": "my-chosen-pass-9"}),
            )
            .await;
        assert_eq!(relogin.status, 200);
        assert_eq!(relogin.body["is_first_login"], false);

        // The temporary password no longer works.
        let stale = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "teacher@obe.test", "password": temp_password}),
            )
            .await;
        assert_eq!(stale.status, 401);
    }

    #[tokio::test]
    async fn wrong_current_password_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::PASSWORD,
                &json!({
                    "current_password": "definitely-wrong",
                    "new_password": "a-new-password-1",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}
