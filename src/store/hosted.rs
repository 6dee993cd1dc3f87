use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::AppConfig;

use super::{Session, SessionStore};

/// HTTP client for the hosted backend. Auth endpoints live under
/// `/auth/v1`, record collections under `/rest/v1/{collection}`. Every
/// request carries the project API key; record calls additionally carry the
/// caller's access token so ownership is enforced server-side.
pub struct HostedStore {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl HostedStore {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let base_url =
            Url::parse(&config.store_url).context("SESSION_STORE_URL must be a valid URL")?;
        let http = Client::builder()
            .build()
            .context("failed to build session store HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_key: config.store_api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid session store endpoint path {path}"))
    }

    fn collection_endpoint(&self, collection: &str) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{collection}"))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: StoreUser,
}

#[derive(Debug, Deserialize)]
struct StoreUser {
    id: Uuid,
    email: Option<String>,
}

#[async_trait]
impl SessionStore for HostedStore {
    async fn exchange_code(&self, code: &str) -> Result<Session> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "authorization_code");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "auth_code": code }))
            .send()
            .await
            .context("code exchange request failed")?;

        if !response.status().is_success() {
            bail!("code exchange rejected with status {}", response.status());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("malformed code exchange response")?;

        Ok(Session {
            access_token: token.access_token,
            user_id: token.user.id,
            email: token.user.email,
        })
    }

    async fn validate_session(&self, token: &str) -> Result<Session> {
        let url = self.endpoint("auth/v1/user")?;

        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .context("session validation request failed")?;

        if !response.status().is_success() {
            bail!(
                "session validation rejected with status {}",
                response.status()
            );
        }

        let user: StoreUser = response
            .json()
            .await
            .context("malformed session validation response")?;

        Ok(Session {
            access_token: token.to_owned(),
            user_id: user.id,
            email: user.email,
        })
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let url = self.endpoint("auth/v1/logout")?;

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .context("sign-out request failed")?;

        if !response.status().is_success() {
            bail!("sign-out rejected with status {}", response.status());
        }

        Ok(())
    }

    async fn list_records(
        &self,
        collection: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<Vec<Value>> {
        let mut url = self.collection_endpoint(collection)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("user_id", &format!("eq.{user_id}"))
            .append_pair("order", "created_at.asc");

        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("failed to list {collection}"))?;

        if !response.status().is_success() {
            bail!(
                "listing {collection} rejected with status {}",
                response.status()
            );
        }

        response
            .json()
            .await
            .with_context(|| format!("malformed {collection} list response"))
    }

    async fn insert_record(&self, collection: &str, token: &str, record: Value) -> Result<Value> {
        let url = self.collection_endpoint(collection)?;

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(token)
            .json(&record)
            .send()
            .await
            .with_context(|| format!("failed to insert into {collection}"))?;

        if !response.status().is_success() {
            bail!(
                "insert into {collection} rejected with status {}",
                response.status()
            );
        }

        let mut rows: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("malformed {collection} insert response"))?;

        rows.pop()
            .ok_or_else(|| anyhow!("insert into {collection} returned no row"))
    }

    async fn update_record(
        &self,
        collection: &str,
        token: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<Value> {
        let mut url = self.collection_endpoint(collection)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));

        let response = self
            .http
            .patch(url)
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(token)
            .json(&patch)
            .send()
            .await
            .with_context(|| format!("failed to update {collection} record {id}"))?;

        if !response.status().is_success() {
            bail!(
                "update of {collection} record {id} rejected with status {}",
                response.status()
            );
        }

        let mut rows: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("malformed {collection} update response"))?;

        rows.pop()
            .ok_or_else(|| anyhow!("no {collection} record matched id {id}"))
    }
}
