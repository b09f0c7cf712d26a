use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Response},
    Form,
};
use chrono::Local;
use serde::Deserialize;

use super::{parse_flag, redirect_home, AppState, CurrentUser};
use crate::{error::Result, quotes, views};

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub quote: String,
    #[serde(default)]
    pub author: Option<String>,
    pub to_save: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub quote: String,
}

pub async fn home(State(state): State<AppState>, CurrentUser(user_id): CurrentUser) -> Result<Html<String>> {
    let today = Local::now().date_naive();
    let mut conn = state.pool.acquire().await?;

    let quote = quotes::get_quote_of_day(&mut conn, today).await?;
    let is_favorite = match &quote {
        Some(quote) => quotes::is_favorite(&mut conn, user_id, quote.id).await?,
        None => false,
    };

    Ok(Html(views::home(quote.as_ref(), is_favorite)))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Form(form): Form<FavoriteForm>,
) -> Result<Response> {
    let mut conn = state.pool.acquire().await?;

    if parse_flag("to_save", &form.to_save)? {
        let quote = quotes::save_quote(&mut conn, user_id, &form.quote).await?;
        tracing::debug!(user_id, quote_id = quote.id, author = ?form.author, "saved favorite quote");
    } else {
        quotes::delete_quote(&mut conn, user_id, &form.quote).await?;
    }

    Ok(redirect_home())
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Form(form): Form<RemoveForm>,
) -> Result<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    quotes::delete_quote(&mut conn, user_id, &form.quote).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn favorite_quotes(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Html<String>> {
    let mut conn = state.pool.acquire().await?;
    let favorites = quotes::get_quotes(&mut conn, user_id).await?;

    Ok(Html(views::favorite_quotes(&favorites)))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{error::AppError, quotes::seed_quotes, routes::test_state};

    const QUOTE1: &str = "You have to believe in yourself.";

    async fn seeded_state(dir: &TempDir) -> AppState {
        let state = test_state(dir.path()).await;
        let mut conn = state.pool.acquire().await.unwrap();
        seed_quotes(&mut conn).await;
        drop(conn);

        state
    }

    fn favorite(to_save: &str) -> Form<FavoriteForm> {
        Form(FavoriteForm {
            quote: QUOTE1.to_string(),
            author: Some("Sun Tzu".to_string()),
            to_save: to_save.to_string(),
        })
    }

    async fn favorites_of(state: &AppState, user_id: i64) -> Vec<quotes::Quote> {
        let mut conn = state.pool.acquire().await.unwrap();
        quotes::get_quotes(&mut conn, user_id).await.unwrap()
    }

    #[tokio::test]
    async fn test_home_shows_a_quote() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;

        let Html(page) = home(State(state), CurrentUser(1)).await.unwrap();
        assert!(page.contains("<blockquote>"));
    }

    #[tokio::test]
    async fn test_save_quote() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;

        let response = toggle_favorite(State(state.clone()), CurrentUser(1), favorite("true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(favorites_of(&state, 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_quote() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;
        toggle_favorite(State(state.clone()), CurrentUser(1), favorite("true"))
            .await
            .unwrap();

        let removal = Form(RemoveForm {
            quote: QUOTE1.to_string(),
        });
        let status = remove_favorite(State(state.clone()), CurrentUser(1), removal).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(favorites_of(&state, 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_unsave_through_post() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;
        toggle_favorite(State(state.clone()), CurrentUser(1), favorite("true"))
            .await
            .unwrap();
        toggle_favorite(State(state.clone()), CurrentUser(1), favorite("false"))
            .await
            .unwrap();

        assert!(favorites_of(&state, 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_save_unknown_quote_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;
        let form = Form(FavoriteForm {
            quote: "never said".to_string(),
            author: None,
            to_save: "true".to_string(),
        });

        let Err(err) = toggle_favorite(State(state), CurrentUser(1), form).await else {
            panic!("unknown quote was saved");
        };
        assert!(matches!(err, AppError::UnknownQuote(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_favorite_quotes() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;
        toggle_favorite(State(state.clone()), CurrentUser(1), favorite("true"))
            .await
            .unwrap();

        let Html(page) = favorite_quotes(State(state), CurrentUser(1)).await.unwrap();
        assert!(page.contains("Favorite Quotes"));
        assert!(page.contains(QUOTE1));
    }
}
