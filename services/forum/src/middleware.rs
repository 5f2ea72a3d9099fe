//! Session cookie authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::{AppState, cookies, error::ForumError};

/// Validate the session cookie and expose the resulting
/// [`SessionContext`](crate::session::SessionContext) to handlers
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = cookies::session_token(&jar) else {
        info!("Rejected request to {} without a session", req.uri().path());
        return ForumError::Auth("Missing session".to_string()).into_response();
    };

    let session = match state
        .service
        .authenticate(&token, cookies::cached_user(&jar))
        .await
    {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}
