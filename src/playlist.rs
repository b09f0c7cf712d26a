use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{
    db,
    error::{AppError, Result},
    models::{settings_model::SettingsModel, track_model::TrackModel},
    track::{SoundKind, Track},
    utils::strip_extension,
};

pub const DEFAULT_MUSIC: [&str; 1] = ["GASTRONOMICA.mp3"];
pub const DEFAULT_MUSIC_VOL: f64 = 0.5;
pub const DEFAULT_SFX: &str = "click_1.wav";
pub const DEFAULT_SFX_VOL: f64 = 0.5;

pub const MAX_VOL: i64 = 100;

/// Flags and raw 0-100 volumes as submitted by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioChoices {
    pub music_on: bool,
    pub music_vol: Option<i64>,
    pub sfx_on: bool,
    pub sfx_vol: Option<i64>,
}

impl AudioChoices {
    pub fn validate(&self) -> Result<()> {
        for (field, vol) in [("music_vol", self.music_vol), ("sfx_vol", self.sfx_vol)] {
            if let Some(vol) = vol {
                if !(0..=MAX_VOL).contains(&vol) {
                    return Err(AppError::InvalidForm(format!(
                        "{field} must be between 0 and {MAX_VOL}, got {vol}"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// What is stored for a user. Flags and volumes are `None` when the user never saved settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioSettings {
    pub music_on: Option<bool>,
    pub playlist: Vec<String>,
    pub music_vol: Option<i64>,
    pub sfx_on: Option<bool>,
    pub sfx_choice: Option<String>,
    pub sfx_vol: Option<i64>,
}

/// Playlist (music file names, in selection order) and sound effect file name of a user.
///
/// Only one sound effect is ever written per user, but if several exist the
/// alphabetically first title wins.
pub async fn get_tracks(conn: &mut SqliteConnection, user_id: i64) -> Result<(Vec<String>, Option<String>)> {
    let rows = sqlx::query_as::<_, TrackModel>(
        r#"
            SELECT t.id, t.title, t.kind
            FROM user_audio_tracks u
            JOIN audio_tracks t ON t.id = u.track_id
            WHERE u.user_id = $1
            ORDER BY u.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let tracks = rows.into_iter().map(Track::try_from).collect::<Result<Vec<_>>>()?;

    let playlist = tracks
        .iter()
        .filter(|t| t.kind == SoundKind::Song)
        .map(Track::file_name)
        .collect();

    let sfx_choice = tracks
        .iter()
        .filter(|t| t.kind == SoundKind::Sfx)
        .min_by(|a, b| a.title.cmp(&b.title))
        .map(Track::file_name);

    Ok((playlist, sfx_choice))
}

pub async fn get_settings_row(conn: &mut SqliteConnection, user_id: i64) -> Result<Option<SettingsModel>> {
    let settings = sqlx::query_as::<_, SettingsModel>(
        r#"
            SELECT music_on, music_vol, sfx_on, sfx_vol FROM user_settings WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(settings)
}

pub async fn get_audio_settings(conn: &mut SqliteConnection, user_id: i64) -> Result<AudioSettings> {
    let (playlist, sfx_choice) = get_tracks(conn, user_id).await?;
    let row = get_settings_row(conn, user_id).await?;

    let mut settings = AudioSettings {
        playlist,
        sfx_choice,
        ..Default::default()
    };

    if let Some(row) = row {
        settings.music_on = Some(row.music_on);
        settings.music_vol = row.music_vol;
        settings.sfx_on = Some(row.sfx_on);
        settings.sfx_vol = row.sfx_vol;
    }

    Ok(settings)
}

/// Stores the user's flags, volumes and track selection.
///
/// Runs every statement on `conn`; the caller owns the transaction and decides
/// whether to commit, so a failed lookup leaves nothing behind.
pub async fn save_audio_settings(
    conn: &mut SqliteConnection,
    user_id: i64,
    music_choices: &[String],
    sfx_choice: Option<&str>,
    choices: &AudioChoices,
) -> Result<()> {
    choices.validate()?;

    handle_audio_settings(conn, user_id, choices).await?;
    handle_user_audio_tracks(conn, user_id, music_choices, sfx_choice).await?;

    tracing::info!(user_id, tracks = music_choices.len(), sfx = ?sfx_choice, "saved audio settings");

    Ok(())
}

async fn handle_audio_settings(
    conn: &mut SqliteConnection,
    user_id: i64,
    choices: &AudioChoices,
) -> Result<()> {
    sqlx::query(
        r#"
            INSERT INTO user_settings
            (user_id, music_on, music_vol, sfx_on, sfx_vol)
            VALUES
            ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET
                music_on = excluded.music_on,
                music_vol = excluded.music_vol,
                sfx_on = excluded.sfx_on,
                sfx_vol = excluded.sfx_vol
        "#,
    )
    .bind(user_id)
    .bind(choices.music_on)
    .bind(choices.music_vol)
    .bind(choices.sfx_on)
    .bind(choices.sfx_vol)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn handle_user_audio_tracks(
    conn: &mut SqliteConnection,
    user_id: i64,
    music_choices: &[String],
    sfx_choice: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
            DELETE FROM user_audio_tracks WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    for title in music_choices {
        create_user_audio_record(conn, user_id, title, SoundKind::Song).await?;
    }

    if let Some(title) = sfx_choice {
        create_user_audio_record(conn, user_id, title, SoundKind::Sfx).await?;
    }

    Ok(())
}

async fn create_user_audio_record(
    conn: &mut SqliteConnection,
    user_id: i64,
    choice: &str,
    kind: SoundKind,
) -> Result<()> {
    let title = strip_extension(choice);
    let track = db::find_track(conn, title, kind)
        .await?
        .ok_or_else(|| AppError::UnknownTrack(format!("no {kind} named '{title}'")))?;

    sqlx::query(
        r#"
            INSERT OR IGNORE INTO user_audio_tracks
            (user_id, track_id)
            VALUES
            ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(track.id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Turns a 0-100 volume into a 0.0-1.0 fraction when the sound is on.
pub fn handle_vol(is_audio_on: bool, vol: Option<i64>) -> Option<f64> {
    vol.map(|vol| if is_audio_on { vol as f64 / 100.0 } else { vol as f64 })
}

/// Everything the front end needs to start playing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStart {
    pub music_on: Option<bool>,
    pub playlist: Vec<String>,
    pub music_vol: Option<f64>,
    pub sfx_on: Option<bool>,
    pub sfx_choice: String,
    pub sfx_vol: Option<f64>,
}

impl From<AudioSettings> for AudioStart {
    fn from(value: AudioSettings) -> Self {
        let mut music_vol = value.music_vol.map(|v| v as f64);
        let mut sfx_vol = value.sfx_vol.map(|v| v as f64);
        if let Some(music_on) = value.music_on {
            music_vol = handle_vol(music_on, value.music_vol);
            sfx_vol = handle_vol(value.sfx_on.unwrap_or(false), value.sfx_vol);
        }

        let mut playlist = value.playlist;
        if playlist.is_empty() {
            playlist = DEFAULT_MUSIC.iter().map(|s| s.to_string()).collect();
            music_vol = Some(DEFAULT_MUSIC_VOL);
        }

        let (sfx_choice, sfx_vol) = match value.sfx_choice {
            Some(choice) => (choice, sfx_vol),
            None => (DEFAULT_SFX.to_string(), Some(DEFAULT_SFX_VOL)),
        };

        Self {
            music_on: value.music_on,
            playlist,
            music_vol,
            sfx_on: value.sfx_on,
            sfx_choice,
            sfx_vol,
        }
    }
}
