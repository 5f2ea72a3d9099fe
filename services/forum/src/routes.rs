//! Forum service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::{
    AppState, aggregator,
    cookies,
    error::{ForumError, ForumResult},
    middleware::require_session,
    models::{LoginCredentials, NewComment, NewUser},
    service::SessionGrant,
    session::SessionContext,
};

/// Query string for the movie listing
#[derive(Debug, Default, Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    pub tagged_only: bool,
}

/// Create the router for the forum service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/comment", post(post_comment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/movies", get(list_movies))
        .route("/movies/:id/comments", get(list_comments))
        .route("/genres", get(list_genres))
        .route("/session", get(current_session))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match common::database::health_check(state.service.pool()).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "service": "forum" })),
        ),
        Ok(false) | Err(_) => {
            error!("Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable", "service": "forum" })),
            )
        }
    }
}

fn with_session_cookies(
    state: &AppState,
    jar: CookieJar,
    grant: &SessionGrant,
) -> ForumResult<CookieJar> {
    state
        .cookies
        .attach(jar, &grant.token, &grant.user, OffsetDateTime::now_utc())
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<NewUser>,
) -> ForumResult<impl IntoResponse> {
    info!("Registration attempt for user: {}", payload.username);

    let grant = state.service.register(&payload).await?;
    let jar = with_session_cookies(&state, jar, &grant)?;

    Ok((StatusCode::CREATED, jar, Json(grant.user)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginCredentials>,
) -> ForumResult<impl IntoResponse> {
    info!("Login attempt for: {}", payload.email);

    let grant = state.service.login(&payload).await?;
    let jar = with_session_cookies(&state, jar, &grant)?;

    Ok((StatusCode::OK, jar, Json(grant.user)))
}

/// Comment creation endpoint; requires a session
pub async fn post_comment(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(payload): Json<NewComment>,
) -> ForumResult<impl IntoResponse> {
    let comment = state.service.post_comment_as(&session, &payload).await?;
    info!(
        "User {} commented on movie {}",
        session.user_id, comment.movie_id
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MoviesQuery>,
) -> ForumResult<impl IntoResponse> {
    let movies = state.service.list_movies_with_genres().await?;
    let movies = if query.tagged_only {
        aggregator::tagged_only(movies)
    } else {
        movies
    };

    Ok(Json(movies))
}

pub async fn list_genres(State(state): State<AppState>) -> ForumResult<impl IntoResponse> {
    Ok(Json(state.service.list_genres_with_movies().await?))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> ForumResult<impl IntoResponse> {
    Ok(Json(state.service.list_comments(movie_id).await?))
}

/// Display snapshot from the user cookie; no store read
pub async fn current_session(jar: CookieJar) -> ForumResult<impl IntoResponse> {
    cookies::cached_user(&jar)
        .map(Json)
        .ok_or_else(|| ForumError::Auth("No cached user".to_string()))
}
