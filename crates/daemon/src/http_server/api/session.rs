use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use http::request::Parts;

use common::auth::SESSION_COOKIE_NAME;

use super::ApiError;
use crate::ServiceState;

/// Extractor that admits the request only with a live `session_id` cookie.
///
/// Passes everything through when authentication is disabled.
#[derive(Debug, Clone, Copy)]
pub struct RequireSession;

#[async_trait]
impl FromRequestParts<ServiceState> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE_NAME).map(|c| c.value());
        state.auth().require_session(cookie, Utc::now())?;
        Ok(RequireSession)
    }
}
