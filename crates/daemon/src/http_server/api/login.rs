use axum::extract::{Query, State};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use serde::Deserialize;

use common::auth::SESSION_COOKIE_NAME;

use super::{ApiError, Envelope};
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    pub password: String,
}

/// Answers with the unix second the session was issued at. The front-end
/// combines it with the secret to rebuild the download token.
pub async fn handler(
    State(state): State<ServiceState>,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
) -> Result<(CookieJar, Envelope<i64>), ApiError> {
    let now = Utc::now();

    let jar = match state.auth().login(&params.password, now)? {
        Some(session) => {
            let cookie = Cookie::build((SESSION_COOKIE_NAME, session.token))
                .path("/")
                .http_only(true);
            jar.add(cookie)
        }
        None => jar,
    };

    Ok((jar, Envelope::ok(now.timestamp())))
}
