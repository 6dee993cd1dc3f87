use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{headers::Cookie, typed_header::TypedHeader};

use crate::{error::AppError, state::AppState, store::Session};

pub const SESSION_COOKIE: &str = "session_token";

pub const LANDING_PATH: &str = "/";
pub const AUTH_PREFIX: &str = "/auth";
pub const CALLBACK_PATH: &str = "/auth/callback";
pub const LOGIN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const OPEN_PREFIXES: [&str; 3] = ["/assets", "/static", "/api"];

/// Request gate run ahead of every route. Resolves the caller's session once
/// and decides between allow-through and redirect; any unexpected failure
/// inside the gate collapses to a redirect to the landing page.
pub async fn require_session(
    state: State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
    request: Request,
    next: Next,
) -> Response {
    match gate(state, cookies, request, next).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "request gate failed");
            Redirect::to(LANDING_PATH).into_response()
        }
    }
}

async fn gate(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
    mut request: Request,
    next: Next,
) -> Result<Response, anyhow::Error> {
    let path = request.uri().path().to_owned();

    // Assets, the API surface and the favicon skip the session check.
    if path == "/favicon.ico" || OPEN_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return Ok(next.run(request).await);
    }

    // The callback has no session yet.
    if path.starts_with(CALLBACK_PATH) {
        return Ok(next.run(request).await);
    }

    let token = cookies
        .as_ref()
        .and_then(|TypedHeader(cookie)| cookie.get(SESSION_COOKIE));

    let session = match token {
        Some(token) => match state.store.validate_session(token).await {
            Ok(session) => Some(session),
            Err(err) => {
                // Treated as unauthenticated rather than aborting the request.
                tracing::warn!(error = %err, "session validation failed");
                None
            }
        },
        None => None,
    };

    match session {
        Some(session) => {
            if path == LANDING_PATH || path.starts_with(AUTH_PREFIX) {
                return Ok(Redirect::to(DASHBOARD_PATH).into_response());
            }
            request.extensions_mut().insert(session);
            Ok(next.run(request).await)
        }
        None => {
            if !path.starts_with(AUTH_PREFIX) && path != LANDING_PATH {
                return Ok(Redirect::to(LANDING_PATH).into_response());
            }
            Ok(next.run(request).await)
        }
    }
}

/// Session context resolved by the gate, pulled from request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(AppError::unauthorized)
    }
}
