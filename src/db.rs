use std::{collections::HashSet, str::FromStr};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqliteConnection, SqlitePool,
};
use uuid::Uuid;

use crate::{
    error::Result,
    models::track_model::TrackModel,
    track::{Sound, SoundKind, Track},
};

const MIGRATIONS: [&str; 5] = [
    include_str!("../migrations/20250124082845_track_init.up.sql"),
    include_str!("../migrations/20250124084234_user_settings_init.up.sql"),
    include_str!("../migrations/20250124090112_user_audio_tracks_init.up.sql"),
    include_str!("../migrations/20250125101530_quotes_init.up.sql"),
    include_str!("../migrations/20250125101812_user_quotes_init.up.sql"),
];

pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    Ok(pool)
}

pub async fn init(pool: &SqlitePool) -> Result<()> {
    for migration in MIGRATIONS {
        sqlx::query(migration).execute(pool).await?;
    }

    Ok(())
}

/// Makes sure every sound found on disk has a catalog row.
///
/// Returns the sounds that can actually be selected: one per title, and only
/// when the catalog row for that title has the same kind as the file.
pub async fn update_track_state(conn: &mut SqliteConnection, sounds: &[Sound]) -> Result<Vec<Sound>> {
    let mut available: Vec<Sound> = vec![];
    let mut seen = HashSet::new();

    for sound in sounds {
        let existing = sqlx::query_as::<_, TrackModel>(
            r#"
                SELECT id, title, kind FROM audio_tracks WHERE title = $1
            "#,
        )
        .bind(&sound.name)
        .fetch_optional(&mut *conn)
        .await?;

        let track = match existing {
            Some(track) => track,
            None => {
                let id = Uuid::new_v4().to_string();
                let track = sqlx::query_as::<_, TrackModel>(
                    r#"
                        INSERT INTO audio_tracks
                        (id, title, kind)
                        VALUES
                        ($1, $2, $3)
                        RETURNING id, title, kind
                    "#,
                )
                .bind(id)
                .bind(&sound.name)
                .bind(sound.kind.as_str())
                .fetch_one(&mut *conn)
                .await?;

                tracing::info!(title = %track.title, kind = %track.kind, "added track to catalog");
                track
            }
        };

        if track.kind != sound.kind.as_str() {
            tracing::warn!(
                title = %track.title,
                catalog_kind = %track.kind,
                path = %sound.path.display(),
                "title already used by another kind of sound, skipping file"
            );
            continue;
        }

        if seen.insert(sound.name.clone()) {
            available.push(sound.clone());
        } else {
            tracing::debug!(path = %sound.path.display(), "duplicate title, skipping file");
        }
    }

    Ok(available)
}

pub async fn find_track(conn: &mut SqliteConnection, title: &str, kind: SoundKind) -> Result<Option<Track>> {
    let track = sqlx::query_as::<_, TrackModel>(
        r#"
            SELECT id, title, kind FROM audio_tracks WHERE title = $1 AND kind = $2
        "#,
    )
    .bind(title)
    .bind(kind.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    track.map(Track::try_from).transpose()
}

/// Single-connection in-memory database with the schema applied.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    init(&pool).await.unwrap();

    pool
}

#[cfg(test)]
pub fn test_sound(kind: SoundKind, name: &str) -> Sound {
    Sound {
        kind,
        name: name.to_string(),
        path: format!("{name}.{}", kind.extension()).into(),
        duration_str: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = test_pool().await;
        init(&pool).await.unwrap();
    }

    async fn catalog_size(conn: &mut SqliteConnection) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM audio_tracks")
            .fetch_one(&mut *conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_track_state_is_idempotent() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let sounds = vec![
            test_sound(SoundKind::Song, "GASTRONOMICA"),
            test_sound(SoundKind::Song, "calm"),
            test_sound(SoundKind::Sfx, "click_1"),
        ];

        assert_eq!(update_track_state(&mut conn, &sounds).await.unwrap().len(), 3);
        assert_eq!(update_track_state(&mut conn, &sounds).await.unwrap().len(), 3);
        assert_eq!(catalog_size(&mut conn).await, 3);
    }

    #[tokio::test]
    async fn test_title_collision_keeps_catalog_kind() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let sounds = vec![
            test_sound(SoundKind::Song, "A"),
            test_sound(SoundKind::Song, "click"),
            test_sound(SoundKind::Sfx, "click"),
        ];

        let available = update_track_state(&mut conn, &sounds).await.unwrap();
        let offered: Vec<(SoundKind, &str)> = available.iter().map(|s| (s.kind, s.name.as_str())).collect();
        assert_eq!(offered, vec![(SoundKind::Song, "A"), (SoundKind::Song, "click")]);
        assert_eq!(catalog_size(&mut conn).await, 2);
        assert!(find_track(&mut conn, "click", SoundKind::Sfx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_title_in_two_folders_is_offered_once() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut nested = test_sound(SoundKind::Song, "calm");
        nested.path = "nested/calm.mp3".into();
        let sounds = vec![test_sound(SoundKind::Song, "calm"), nested];

        let available = update_track_state(&mut conn, &sounds).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(catalog_size(&mut conn).await, 1);
    }

    #[tokio::test]
    async fn test_find_track_checks_kind() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        update_track_state(&mut conn, &[test_sound(SoundKind::Sfx, "click_1")])
            .await
            .unwrap();

        assert!(find_track(&mut conn, "click_1", SoundKind::Sfx).await.unwrap().is_some());
        assert!(find_track(&mut conn, "click_1", SoundKind::Song).await.unwrap().is_none());
        assert!(find_track(&mut conn, "missing", SoundKind::Sfx).await.unwrap().is_none());
    }
}
