use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub app_env: String,
    pub frontend_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub api_rps: u32,
    pub auth_rps: u32,
    pub uploads_dir: String,
    pub public_app_url: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let frontend_url = env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty());
        let mut allowed_origins = vec![
            "http://localhost:4200".to_string(),
            "http://localhost:4201".to_string(),
            "http://localhost:4000".to_string(),
        ];
        if let Ok(raw) = env::var("ALLOWED_ORIGINS") {
            allowed_origins.extend(
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from),
            );
        }
        if let Some(url) = &frontend_url {
            allowed_origins.push(url.clone());
        }
        allowed_origins.sort();
        allowed_origins.dedup();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_expiration_hours: get_env_parse_or("JWT_EXPIRATION_HOURS", 24)?,
            app_env: get_env_or("APP_ENV", "development"),
            public_app_url: absolute_url(
                "PUBLIC_APP_URL",
                &get_env_or(
                    "PUBLIC_APP_URL",
                    frontend_url.as_deref().unwrap_or("http://localhost:4200"),
                ),
            )?,
            frontend_url,
            allowed_origins,
            api_rps: get_env_parse_or("API_RPS", 50)?,
            auth_rps: get_env_parse_or("AUTH_RPS", 5)?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

/// Base URL used to build shareable links; must be absolute http(s).
fn absolute_url(name: &str, raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!("{} must be an http(s) URL", name)));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_must_be_absolute_http() {
        assert_eq!(
            absolute_url("PUBLIC_APP_URL", "https://crm.hub.com.br/").unwrap(),
            "https://crm.hub.com.br"
        );
        assert!(absolute_url("PUBLIC_APP_URL", "crm.hub.com.br").is_err());
        assert!(absolute_url("PUBLIC_APP_URL", "ftp://crm.hub.com.br").is_err());
    }
}
