use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqliteConnection;

use crate::error::{AppError, Result};

pub use crate::models::quote_model::QuoteModel as Quote;

/// A quote as it appears in the quotes file, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewQuote {
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
}

pub fn get_quote(fields: Value) -> Result<NewQuote> {
    let quote = serde_json::from_value(fields)?;

    Ok(quote)
}

/// Inserts the quote unless the same text is already stored. Returns whether it was new.
pub async fn add_quote(conn: &mut SqliteConnection, quote: &NewQuote) -> Result<bool> {
    let res = sqlx::query(
        r#"
            INSERT OR IGNORE INTO quotes
            (text, author)
            VALUES
            ($1, $2)
        "#,
    )
    .bind(&quote.text)
    .bind(&quote.author)
    .execute(&mut *conn)
    .await?;

    Ok(res.rows_affected() == 1)
}

/// Loads a JSON array of `{"text": .., "author": ..}` objects into the quotes table.
pub async fn load_quotes(conn: &mut SqliteConnection, path: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path).await?;
    let entries: Vec<Value> = serde_json::from_str(&raw)?;

    let mut inserted = 0;
    for entry in entries {
        let quote = get_quote(entry)?;
        if add_quote(conn, &quote).await? {
            inserted += 1;
        }
    }

    tracing::info!(path = %path.display(), inserted, "loaded quotes");

    Ok(inserted)
}

/// Walks through the quotes in id order, one per day of the year.
pub async fn get_quote_of_day(conn: &mut SqliteConnection, date: NaiveDate) -> Result<Option<Quote>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
        .fetch_one(&mut *conn)
        .await?;

    if count == 0 {
        return Ok(None);
    }

    let offset = i64::from(date.ordinal0()) % count;
    let quote = sqlx::query_as::<_, Quote>(
        r#"
            SELECT id, text, author FROM quotes ORDER BY id LIMIT 1 OFFSET $1
        "#,
    )
    .bind(offset)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quote)
}

pub async fn find_quote(conn: &mut SqliteConnection, text: &str) -> Result<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
            SELECT id, text, author FROM quotes WHERE text = $1
        "#,
    )
    .bind(text)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quote)
}

pub async fn save_quote(conn: &mut SqliteConnection, user_id: i64, text: &str) -> Result<Quote> {
    let quote = find_quote(conn, text)
        .await?
        .ok_or_else(|| AppError::UnknownQuote(text.to_string()))?;

    sqlx::query(
        r#"
            INSERT OR IGNORE INTO user_quotes
            (user_id, quote_id)
            VALUES
            ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(quote.id)
    .execute(&mut *conn)
    .await?;

    Ok(quote)
}

pub async fn delete_quote(conn: &mut SqliteConnection, user_id: i64, text: &str) -> Result<()> {
    sqlx::query(
        r#"
            DELETE FROM user_quotes
            WHERE user_id = $1
            AND quote_id IN (SELECT id FROM quotes WHERE text = $2)
        "#,
    )
    .bind(user_id)
    .bind(text)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn get_quotes(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Quote>> {
    let quotes = sqlx::query_as::<_, Quote>(
        r#"
            SELECT q.id, q.text, q.author
            FROM user_quotes u
            JOIN quotes q ON q.id = u.quote_id
            WHERE u.user_id = $1
            ORDER BY u.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(quotes)
}

pub async fn is_favorite(conn: &mut SqliteConnection, user_id: i64, quote_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
            SELECT EXISTS(SELECT 1 FROM user_quotes WHERE user_id = $1 AND quote_id = $2)
        "#,
    )
    .bind(user_id)
    .bind(quote_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

#[cfg(test)]
pub async fn seed_quotes(conn: &mut SqliteConnection) {
    for (text, author) in [
        ("You have to believe in yourself.", "Sun Tzu"),
        ("Wisdom begins in wonder.", "Socrates"),
    ] {
        let quote = NewQuote {
            text: text.to_string(),
            author: Some(author.to_string()),
        };
        add_quote(conn, &quote).await.unwrap();
    }
}
