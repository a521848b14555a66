use std::env;

use crate::application::linktracking::DEFAULT_BROKEN_CLASS;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_port: u16,
    pub frontend_url: Option<String>,
    /// Without a database the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub site_base_url: Option<String>,
    pub broken_link_class: String,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_port = get("API_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(8890);
        let frontend_url = get("FRONTEND_URL");
        let database_url = get("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let database_max_connections = get("DATABASE_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let site_base_url = get("SITE_BASE_URL").and_then(|v| {
            let trimmed = v.trim();
            if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                Some(trimmed.to_string())
            } else {
                None
            }
        });
        let broken_link_class = get("BROKEN_LINK_CLASS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !s.contains(char::is_whitespace))
            .unwrap_or_else(|| DEFAULT_BROKEN_CLASS.to_string());
        let is_production = matches!(
            get("RUST_ENV").as_deref(),
            Some("production") | Some("prod")
        );

        if is_production && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set in production");
        }

        Ok(Self {
            api_port,
            frontend_url,
            database_url,
            database_max_connections,
            site_base_url,
            broken_link_class,
            is_production,
        })
    }
}
