//! Typed, environment-driven configuration (A1). Loaded once at startup;
//! `Settings::from_env` returns an error — never panics — so `main` can
//! `.context(...)` it and exit non-zero on a bad deployment.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Settings {
    pub supabase_url: String,
    pub supabase_api_key: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub cors_origins: Vec<String>,
    pub debug: bool,
    pub upstash_redis_rest_url: String,
    pub upstash_redis_rest_token: String,
    pub ws_heartbeat_interval_secs: u64,
    pub ws_connection_timeout_secs: u64,
    pub port: u16,
}

impl Settings {
    /// Mirrors the original ruleset's `Settings(BaseSettings)`: required
    /// credentials fail boot if absent, everything else has a default.
    pub fn from_env() -> Result<Self> {
        let supabase_url = require_env("SUPABASE_URL")?;
        if !supabase_url.starts_with("https://") && !supabase_url.starts_with("http://") {
            bail!("SUPABASE_URL must be an http(s) URL");
        }
        let upstash_redis_rest_url = require_env("UPSTASH_REDIS_REST_URL")?;
        if !upstash_redis_rest_url.starts_with("https://") {
            bail!("UPSTASH_REDIS_REST_URL must start with https://");
        }
        let upstash_redis_rest_token = require_env("UPSTASH_REDIS_REST_TOKEN")?;
        if upstash_redis_rest_token.is_empty() {
            bail!("UPSTASH_REDIS_REST_TOKEN must not be empty");
        }

        Ok(Settings {
            supabase_url,
            supabase_api_key: require_env("SUPABASE_API_KEY")?,
            google_client_id: require_env("GOOGLE_CLIENT_ID")?,
            google_client_secret: require_env("GOOGLE_CLIENT_SECRET")?,
            cors_origins: env_list("CORS_ORIGINS", vec!["http://localhost:3000".to_string()]),
            debug: env_bool("DEBUG", false)?,
            upstash_redis_rest_url,
            upstash_redis_rest_token,
            ws_heartbeat_interval_secs: env_parse("WS_HEARTBEAT_INTERVAL", 30)?,
            ws_connection_timeout_secs: env_parse("WS_CONNECTION_TIMEOUT", 120)?,
            port: env_parse("PORT", 8080)?,
        })
    }

    pub fn supabase_jwks_url(&self) -> String {
        format!("{}/auth/v1/.well-known/jwks.json", self.supabase_url.trim_end_matches('/'))
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required environment variable {key}"))
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
        Err(_) => default,
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<bool>().with_context(|| format!("{key} must be true or false")),
        Err(_) => Ok(default),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_https_redis_url() {
        std::env::set_var("SUPABASE_URL", "https://example.supabase.co");
        std::env::set_var("SUPABASE_API_KEY", "key");
        std::env::set_var("GOOGLE_CLIENT_ID", "id");
        std::env::set_var("GOOGLE_CLIENT_SECRET", "secret");
        std::env::set_var("UPSTASH_REDIS_REST_URL", "http://insecure.example.com");
        std::env::set_var("UPSTASH_REDIS_REST_TOKEN", "token");
        let result = Settings::from_env();
        assert!(result.is_err());
        std::env::remove_var("UPSTASH_REDIS_REST_URL");
    }
}
