pub mod matcher;

pub use matcher::{RouteMatcher, in_scope, is_api_path};

use crate::config::AuthConfig;
use anyhow::Result;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const SESSION_COOKIE: &str = "__session";

/// The authenticated user attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

pub trait Authenticator: Send + Sync {
    /// Resolve the session carried by the request, if any.
    fn authenticate(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Accepts opaque session tokens from a fixed token -> user id table, sent
/// either as a bearer token or in the `__session` cookie.
pub struct TokenAuthenticator {
    tokens: HashMap<String, String>,
}

impl TokenAuthenticator {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    fn lookup(&self, token: &str) -> Option<Session> {
        self.tokens.get(token).map(|user_id| Session {
            user_id: user_id.clone(),
        })
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<Session> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if let Some(session) = bearer.and_then(|token| self.lookup(token.trim())) {
            return Some(session);
        }

        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == SESSION_COOKIE)
            .find_map(|(_, token)| self.lookup(token))
    }
}

/// Shared state for [`require_session`].
pub struct Guard {
    public_routes: RouteMatcher,
    sign_in_url: String,
    authenticator: Box<dyn Authenticator>,
}

impl Guard {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            public_routes: RouteMatcher::new(&config.public_routes)?,
            sign_in_url: config.sign_in_url.clone(),
            authenticator: Box::new(TokenAuthenticator::new(config.session_tokens.clone())),
        })
    }

    fn is_public(&self, path: &str) -> bool {
        !in_scope(path) || self.public_routes.is_match(path)
    }

    fn reject(&self, path: &str, return_to: &str) -> Response {
        if is_api_path(path) {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        let separator = if self.sign_in_url.contains('?') { '&' } else { '?' };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect_url", return_to)
            .finish();

        Redirect::temporary(&format!("{}{separator}{query}", self.sign_in_url)).into_response()
    }
}

/// Let public routes through and require a session everywhere else.
///
/// Pages get redirected to sign-in, API calls get a 401. Routes with extra
/// requirements beyond being signed in check those themselves.
pub async fn require_session(
    State(guard): State<Arc<Guard>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    if guard.is_public(&path) {
        return next.run(req).await;
    }

    match guard.authenticator.authenticate(req.headers()) {
        Some(session) => {
            debug!(path = %path, user_id = %session.user_id, "Session accepted");
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => {
            info!(path = %path, "Rejecting request without a session");
            let return_to = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or(&path);
            guard.reject(&path, return_to)
        }
    }
}
