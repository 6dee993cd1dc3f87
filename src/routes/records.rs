use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    gate::CurrentUser,
    pages,
    state::AppState,
};

/// One record view is a collection name plus the three things that differ
/// between the pages: the form schemas, the create-time stamping rules and
/// the row rendering. Everything else — fetch, insert, single-field patch,
/// redirect-back — is shared by the generic handlers below.
pub trait RecordView: Send + Sync + 'static {
    /// Collection name at the session store.
    const COLLECTION: &'static str;
    /// Page the view lives on; writes redirect back here.
    const BASE_PATH: &'static str;
    const TITLE: &'static str;

    type Record: Serialize + DeserializeOwned + Send;
    type CreateForm: DeserializeOwned + Send + 'static;
    type UpdateForm: DeserializeOwned + Send + 'static;

    /// Validates the submitted form and builds the row to insert, stamped
    /// with the owning identity and creation time. Runs before any write
    /// reaches the backend.
    fn new_record(
        form: Self::CreateForm,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Value, String>;

    /// The single-field patch issued by the inline mutation control.
    fn update_patch(form: Self::UpdateForm) -> Value;

    fn render_page(records: &[Self::Record]) -> String;
}

pub async fn list<V: RecordView>(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Html<String>> {
    let rows = state
        .store
        .list_records(V::COLLECTION, session.user_id, &session.access_token)
        .await?;

    let records: Vec<V::Record> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(collection = V::COLLECTION, error = %err, "skipping malformed record");
                None
            }
        })
        .collect();

    Ok(Html(pages::layout(V::TITLE, &V::render_page(&records))))
}

pub async fn create<V: RecordView>(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Form(form): Form<V::CreateForm>,
) -> AppResult<Response> {
    // No resolvable identity is a silent no-op.
    let Some(CurrentUser(session)) = user else {
        return Ok(Redirect::to(V::BASE_PATH).into_response());
    };

    let record =
        V::new_record(form, session.user_id, Utc::now()).map_err(AppError::bad_request)?;

    if let Err(err) = state
        .store
        .insert_record(V::COLLECTION, &session.access_token, record)
        .await
    {
        // Operator console only; the page simply reloads unchanged.
        tracing::error!(collection = V::COLLECTION, error = %err, "record create failed");
    }

    Ok(Redirect::to(V::BASE_PATH).into_response())
}

pub async fn update<V: RecordView>(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<Uuid>,
    Form(form): Form<V::UpdateForm>,
) -> AppResult<Response> {
    let Some(CurrentUser(session)) = user else {
        return Ok(Redirect::to(V::BASE_PATH).into_response());
    };

    let patch = V::update_patch(form);

    if let Err(err) = state
        .store
        .update_record(V::COLLECTION, &session.access_token, id, patch)
        .await
    {
        tracing::error!(
            collection = V::COLLECTION,
            record_id = %id,
            error = %err,
            "record update failed"
        );
    }

    Ok(Redirect::to(V::BASE_PATH).into_response())
}
