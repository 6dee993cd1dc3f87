mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{assert_redirects_to, set_cookie, TestApp};
use uuid::Uuid;

#[tokio::test]
async fn callback_without_code_redirects_to_login() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/auth/callback", None).await?;
    assert_redirects_to(&response, "/auth/login");
    assert!(set_cookie(&response).is_none());

    Ok(())
}

#[tokio::test]
async fn callback_with_valid_code_establishes_a_session() -> Result<()> {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let code = app.store.issue_code(user_id).await;

    let response = app.get(&format!("/auth/callback?code={code}"), None).await?;
    assert_redirects_to(&response, "/dashboard");

    let cookie = set_cookie(&response).expect("session cookie set");
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));

    let token = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("session_token="))
        .expect("cookie value")
        .to_string();

    // The persisted session now passes the gate.
    let dashboard = app.get("/dashboard", Some(&token)).await?;
    assert_eq!(dashboard.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn callback_with_failing_exchange_redirects_to_login() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/auth/callback?code=code-unknown", None).await?;
    assert_redirects_to(&response, "/auth/login");
    assert!(set_cookie(&response).is_none());

    Ok(())
}

#[tokio::test]
async fn codes_are_single_use() -> Result<()> {
    let app = TestApp::new();
    let code = app.store.issue_code(Uuid::new_v4()).await;

    let first = app.get(&format!("/auth/callback?code={code}"), None).await?;
    assert_redirects_to(&first, "/dashboard");

    let second = app.get(&format!("/auth/callback?code={code}"), None).await?;
    assert_redirects_to(&second, "/auth/login");

    Ok(())
}

#[tokio::test]
async fn logout_revokes_the_session_and_clears_the_cookie() -> Result<()> {
    let app = TestApp::new();
    let (_user, token) = app.signed_in_user().await;

    let response = app
        .post_form("/logout", &[("", "")][..0], Some(&token))
        .await?;
    assert_redirects_to(&response, "/");

    let cookie = set_cookie(&response).expect("clearing cookie set");
    assert!(cookie.starts_with("session_token=;"));
    assert!(cookie.contains("Max-Age=0"));

    assert!(!app.store.has_session(&token).await);
    let after = app.get("/dashboard", Some(&token)).await?;
    assert_redirects_to(&after, "/");

    Ok(())
}
