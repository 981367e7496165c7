use crate::auth::RouteMatcher;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,

    #[serde(default = "default_public_routes")]
    pub public_routes: Vec<String>,

    /// Session token -> user id.
    #[serde(default)]
    pub session_tokens: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            sign_in_url: default_sign_in_url(),
            public_routes: default_public_routes(),
            session_tokens: HashMap::new(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_sign_in_url() -> String {
    "/sign-in".to_string()
}

pub fn default_public_routes() -> Vec<String> {
    [
        "/",                 // landing page
        "/s(.*)",            // public storefront
        "/sign-in(.*)",      // sign-in flow
        "/sign-up(.*)",      // sign-up flow
        "/api/webhooks(.*)", // inbound webhooks
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Load configuration from config.toml and environment variables
pub fn load() -> Result<Config, figment::Error> {
    Figment::new()
        .merge(Toml::file("config.toml"))
        // Use double-underscore nesting for snake_case keys
        .merge(Env::prefixed("STOREFRONT_").split("__"))
        .extract()
}

/// Validate configuration and return a user-friendly error
pub fn validate(config: &Config) -> Result<(), String> {
    if config.server.port == 0 {
        return Err("server.port must be greater than 0".into());
    }

    let auth = &config.auth;

    if auth.sign_in_url.trim().is_empty() {
        return Err("auth.sign_in_url must not be empty".into());
    }

    if let Err(err) = RouteMatcher::new(&auth.public_routes) {
        return Err(format!("auth.public_routes is invalid: {err:#}"));
    }

    Ok(())
}

/// A sanitized view of AuthConfig safe for logging
#[derive(Debug)]
#[allow(dead_code)]
pub struct SanitizedAuthConfig {
    pub sign_in_url: String,
    pub public_routes: Vec<String>,
    pub session_tokens: usize,
}

impl AuthConfig {
    pub fn sanitized_for_log(&self) -> SanitizedAuthConfig {
        SanitizedAuthConfig {
            sign_in_url: self.sign_in_url.clone(),
            public_routes: self.public_routes.clone(),
            session_tokens: self.session_tokens.len(),
        }
    }
}
