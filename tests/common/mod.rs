use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use huntboard::config::AppConfig;
use huntboard::routes;
use huntboard::state::AppState;
use huntboard::store::{Session, SessionStore};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::util::ServiceExt;
use uuid::Uuid;

/// In-memory stand-in for the hosted backend: sessions, one-time login
/// codes and the three record collections, plus a call log so tests can
/// assert exactly how many writes reached the store.
#[derive(Default)]
pub struct FakeSessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    codes: Mutex<HashMap<String, Session>>,
    records: Mutex<HashMap<String, Vec<Value>>>,
    inserts: Mutex<Vec<(String, Value)>>,
    updates: Mutex<Vec<(String, Uuid, Value)>>,
    fail_writes: AtomicBool,
}

#[allow(dead_code)]
impl FakeSessionStore {
    pub async fn register_session(&self, user_id: Uuid) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        let session = Session {
            access_token: token.clone(),
            user_id,
            email: Some(format!("{user_id}@example.test")),
        };
        self.sessions.lock().await.insert(token.clone(), session);
        token
    }

    pub async fn issue_code(&self, user_id: Uuid) -> String {
        let code = format!("code-{}", Uuid::new_v4());
        let token = format!("token-{}", Uuid::new_v4());
        let session = Session {
            access_token: token,
            user_id,
            email: Some(format!("{user_id}@example.test")),
        };
        self.codes.lock().await.insert(code.clone(), session);
        code
    }

    pub async fn has_session(&self, token: &str) -> bool {
        self.sessions.lock().await.contains_key(token)
    }

    pub async fn rows(&self, collection: &str) -> Vec<Value> {
        self.records
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn insert_calls(&self, collection: &str) -> Vec<Value> {
        self.inserts
            .lock()
            .await
            .iter()
            .filter(|(name, _)| name == collection)
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub async fn update_calls(&self, collection: &str) -> Vec<(Uuid, Value)> {
        self.updates
            .lock()
            .await
            .iter()
            .filter(|(name, _, _)| name == collection)
            .map(|(_, id, patch)| (*id, patch.clone()))
            .collect()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn writes_failing(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn exchange_code(&self, code: &str) -> Result<Session> {
        // One-time codes: the exchange consumes them.
        let session = self
            .codes
            .lock()
            .await
            .remove(code)
            .ok_or_else(|| anyhow!("unknown or already-used code"))?;
        self.sessions
            .lock()
            .await
            .insert(session.access_token.clone(), session.clone());
        Ok(session)
    }

    async fn validate_session(&self, token: &str) -> Result<Session> {
        self.sessions
            .lock()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow!("invalid session token"))
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        self.sessions.lock().await.remove(token);
        Ok(())
    }

    async fn list_records(
        &self,
        collection: &str,
        user_id: Uuid,
        _token: &str,
    ) -> Result<Vec<Value>> {
        let owner = user_id.to_string();
        Ok(self
            .rows(collection)
            .await
            .into_iter()
            .filter(|row| row.get("user_id").and_then(Value::as_str) == Some(owner.as_str()))
            .collect())
    }

    async fn insert_record(&self, collection: &str, _token: &str, record: Value) -> Result<Value> {
        self.inserts
            .lock()
            .await
            .push((collection.to_string(), record.clone()));

        if self.writes_failing() {
            bail!("simulated backend rejection");
        }

        let mut stored = record;
        if let Some(object) = stored.as_object_mut() {
            object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        self.records
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        collection: &str,
        _token: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<Value> {
        self.updates
            .lock()
            .await
            .push((collection.to_string(), id, patch.clone()));

        if self.writes_failing() {
            bail!("simulated backend rejection");
        }

        let wanted = id.to_string();
        let mut guard = self.records.lock().await;
        let rows = guard
            .get_mut(collection)
            .ok_or_else(|| anyhow!("unknown collection {collection}"))?;
        let row = rows
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(wanted.as_str()))
            .ok_or_else(|| anyhow!("no {collection} record with id {id}"))?;

        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(row.clone())
    }
}

pub struct TestApp {
    router: Router,
    pub store: Arc<FakeSessionStore>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig {
            store_url: "http://session-store.local".to_string(),
            store_api_key: "test-api-key-0123456789".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            public_base_url: "http://127.0.0.1:3000".to_string(),
            session_cookie_secure: false,
        };

        let store = Arc::new(FakeSessionStore::default());
        let store_for_state: Arc<dyn SessionStore> = store.clone();
        let state = AppState::new(config, store_for_state);
        let router = routes::create_router(state);

        Self { router, store }
    }

    /// Registers a fresh user session directly in the fake store and returns
    /// (user id, session token).
    pub async fn signed_in_user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = self.store.register_session(user_id).await;
        (user_id, token)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header("cookie", format!("session_token={token}"));
        }
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_urlencoded::to_string(form)?;
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header("cookie", format!("session_token={token}"));
        }
        let request = builder.body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub fn location(response: &hyper::Response<Body>) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

#[allow(dead_code)]
pub fn set_cookie(response: &hyper::Response<Body>) -> Option<String> {
    response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

#[allow(dead_code)]
pub async fn body_to_string(body: Body) -> Result<String> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(String::from_utf8(collected.to_bytes().to_vec())?)
}

#[allow(dead_code)]
pub fn assert_redirects_to(response: &hyper::Response<Body>, target: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response).as_deref(), Some(target));
}
