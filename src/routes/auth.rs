use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::{headers::Cookie, typed_header::TypedHeader};
use serde::Deserialize;

use crate::{
    gate::{DASHBOARD_PATH, LANDING_PATH, LOGIN_PATH, SESSION_COOKIE},
    pages,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// One-time login code exchange. Everything that goes wrong here lands the
/// caller back on the login page.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match exchange(&state, params).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "auth callback failed");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

async fn exchange(state: &AppState, params: CallbackParams) -> anyhow::Result<Response> {
    let Some(code) = params.code else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    match state.store.exchange_code(&code).await {
        Ok(session) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                SET_COOKIE,
                build_session_cookie(state, &session.access_token),
            );
            Ok((headers, Redirect::to(DASHBOARD_PATH)).into_response())
        }
        Err(err) => {
            tracing::error!(error = %err, "session exchange failed");
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
) -> Response {
    if let Some(token) = cookies
        .as_ref()
        .and_then(|TypedHeader(cookie)| cookie.get(SESSION_COOKIE))
    {
        if let Err(err) = state.store.sign_out(token).await {
            tracing::warn!(error = %err, "sign-out against session store failed");
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, build_clear_session_cookie(&state));
    (headers, Redirect::to(LANDING_PATH)).into_response()
}

pub async fn landing_page() -> Html<String> {
    let body = "<h1>Huntboard</h1>\
                <p>Track job applications, networking contacts and daily goals.</p>\
                <p><a href=\"/auth/login\">Log in</a> or <a href=\"/auth/signup\">Sign up</a></p>";
    Html(pages::layout("Welcome", body))
}

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    let body = format!(
        "<h1>Log in</h1><p><a href=\"{url}\">Continue with your account</a></p>",
        url = authorize_url(&state),
    );
    Html(pages::layout("Log in", &body))
}

pub async fn signup_page(State(state): State<AppState>) -> Html<String> {
    let body = format!(
        "<h1>Sign up</h1><p><a href=\"{url}\">Create an account</a></p>\
         <p>You will receive a verification email before your first login.</p>",
        url = authorize_url(&state),
    );
    Html(pages::layout("Sign up", &body))
}

pub async fn verify_email_page() -> Html<String> {
    let body = "<h1>Check your inbox</h1>\
                <p>Follow the link in the verification email to finish signing up, \
                then <a href=\"/auth/login\">log in</a>.</p>";
    Html(pages::layout("Verify email", body))
}

/// Hosted identity UI; it redirects back to our callback with a one-time code.
fn authorize_url(state: &AppState) -> String {
    format!(
        "{store}/auth/v1/authorize?redirect_to={base}/auth/callback",
        store = state.config.store_url.trim_end_matches('/'),
        base = state.config.public_base_url.trim_end_matches('/'),
    )
}

fn build_session_cookie(state: &AppState, token: &str) -> HeaderValue {
    let mut parts = vec![format!("{SESSION_COOKIE}={token}")];
    parts.push("Path=/".into());
    parts.push("HttpOnly".into());
    // Lax so the cookie survives the top-level redirect from the identity
    // provider back into the dashboard.
    parts.push("SameSite=Lax".into());
    if state.config.session_cookie_secure {
        parts.push("Secure".into());
    }

    HeaderValue::from_str(&parts.join("; ")).expect("valid session cookie")
}

fn build_clear_session_cookie(state: &AppState) -> HeaderValue {
    let mut parts = vec![format!("{SESSION_COOKIE}=")];
    parts.push("Path=/".into());
    parts.push("HttpOnly".into());
    parts.push("SameSite=Lax".into());
    parts.push("Max-Age=0".into());
    parts.push("Expires=Thu, 01 Jan 1970 00:00:00 GMT".into());
    if state.config.session_cookie_secure {
        parts.push("Secure".into());
    }

    HeaderValue::from_str(&parts.join("; ")).expect("valid session cookie")
}
