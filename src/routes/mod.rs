use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{gate, state::AppState};

pub mod auth;
pub mod goals;
pub mod health;
pub mod jobs;
pub mod network;
pub mod records;

use goals::GoalsView;
use jobs::ApplicationsView;
use network::ContactsView;

pub fn create_router(state: AppState) -> Router<()> {
    let auth_routes = Router::new()
        .route("/login", get(auth::login_page))
        .route("/signup", get(auth::signup_page))
        .route("/verify-email", get(auth::verify_email_page))
        .route("/callback", get(auth::callback));

    let dashboard_routes = Router::new()
        .route("/", get(records::list::<GoalsView>))
        .route("/goals", post(records::create::<GoalsView>))
        .route("/goals/:id/toggle", post(records::update::<GoalsView>))
        .route(
            "/jobs",
            get(records::list::<ApplicationsView>).post(records::create::<ApplicationsView>),
        )
        .route("/jobs/:id/status", post(records::update::<ApplicationsView>))
        .route(
            "/network",
            get(records::list::<ContactsView>).post(records::create::<ContactsView>),
        )
        .route("/network/:id/status", post(records::update::<ContactsView>));

    Router::new()
        .route("/", get(auth::landing_page))
        .nest("/auth", auth_routes)
        // Outside /auth so the gate's "authenticated users leave auth pages"
        // rule does not swallow the request.
        .route("/logout", post(auth::logout))
        .nest("/dashboard", dashboard_routes)
        .route("/api/health", get(health::health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_session,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
