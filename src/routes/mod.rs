use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::{AppError, Result},
};

pub mod audio;
pub mod quotes;

/// Header set by the authentication layer in front of this service.
pub const USER_HEADER: &str = "x-user-id";

/// Shared by all handlers; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}

/// Id of the authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(quotes::home)
                .post(quotes::toggle_favorite)
                .delete(quotes::remove_favorite),
        )
        .route("/favorite_quotes", get(quotes::favorite_quotes))
        .route("/audio/settings", get(audio::audio_settings).post(audio::save_settings))
        .route("/audio/start", get(audio::start_audio))
        .with_state(state)
}

fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

/// HTML forms send checkboxes as `on`; accept the usual spellings.
pub fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(AppError::InvalidForm(format!("{field}: '{other}' is not a boolean"))),
    }
}

#[cfg(test)]
pub async fn test_state(sounds_path: &std::path::Path) -> AppState {
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        sounds_path: sounds_path.to_path_buf(),
        quotes_path: None,
        bind_addr: ([127, 0, 0, 1], 0).into(),
    };

    AppState {
        pool: crate::db::test_pool().await,
        config: Arc::new(config),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> std::result::Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();

        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_current_user_from_header() {
        assert_eq!(extract(Some("7")).await.unwrap(), CurrentUser(7));
        assert!(matches!(extract(Some("seven")).await, Err(AppError::Unauthorized)));
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("music_on", "on").unwrap());
        assert!(parse_flag("music_on", "TRUE").unwrap());
        assert!(!parse_flag("music_on", "false").unwrap());
        assert!(!parse_flag("music_on", "0").unwrap());
        assert!(matches!(parse_flag("music_on", "maybe"), Err(AppError::InvalidForm(_))));
    }

    #[test]
    fn test_redirect_home() {
        let response = redirect_home();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
