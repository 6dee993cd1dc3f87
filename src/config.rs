use std::env;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub server_host: String,
    pub server_port: u16,
    pub public_base_url: String,
    pub session_cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let store_url = env::var("SESSION_STORE_URL").context("SESSION_STORE_URL must be set")?;
        let store_api_key =
            env::var("SESSION_STORE_API_KEY").context("SESSION_STORE_API_KEY must be set")?;
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{server_host}:{server_port}"));
        let session_cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            store_url,
            store_api_key,
            server_host,
            server_port,
            public_base_url,
            session_cookie_secure,
        })
    }

    pub fn redacted_store_api_key(&self) -> String {
        redact_api_key(&self.store_api_key)
    }
}

fn redact_api_key(raw: &str) -> String {
    if raw.len() <= 8 {
        return "***".to_string();
    }
    let prefix: String = raw.chars().take(8).collect();
    format!("{prefix}***")
}
