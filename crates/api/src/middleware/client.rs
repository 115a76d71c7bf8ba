//! Caller metadata recorded alongside audit entries and sessions.

use std::convert::Infallible;

use atelier_core::audit::client_ip;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Longest user agent string kept; longer values are truncated.
const MAX_USER_AGENT_LEN: usize = 500;

/// Client IP (from `X-Forwarded-For` / `X-Real-IP`) and user agent.
///
/// Never rejects; missing headers yield `None`.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());

        let ip_address = client_ip(header("x-forwarded-for"), header("x-real-ip"));
        let user_agent = header("user-agent")
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect::<String>())
            .filter(|ua| !ua.is_empty());

        Ok(ClientInfo {
            ip_address,
            user_agent,
        })
    }
}
