use axum::{
    extract::State,
    response::{Html, Response},
    Form, Json,
};

use super::{parse_flag, redirect_home, AppState, CurrentUser};
use crate::{
    db,
    error::{AppError, Result},
    playlist::{self, AudioChoices, AudioStart},
    track::{scan_sounds, Sound, SoundKind},
    views,
};

/// The settings form. `music_choices` may repeat, so the raw pairs are folded by hand.
#[derive(Debug, Default, PartialEq)]
pub struct SettingsForm {
    pub music_choices: Vec<String>,
    pub sfx_choice: Option<String>,
    pub choices: AudioChoices,
}

impl SettingsForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut form = SettingsForm::default();
        let (mut music_on, mut sfx_on) = (None, None);

        for (key, value) in pairs {
            match key.as_str() {
                "music_on" => music_on = Some(parse_flag(&key, &value)?),
                "sfx_on" => sfx_on = Some(parse_flag(&key, &value)?),
                "music_choices" if !value.is_empty() => form.music_choices.push(value),
                "sfx_choice" if !value.is_empty() => form.sfx_choice = Some(value),
                "music_vol" => form.choices.music_vol = parse_vol(&key, &value)?,
                "sfx_vol" => form.choices.sfx_vol = parse_vol(&key, &value)?,
                _ => {}
            }
        }

        form.choices.music_on = music_on.ok_or_else(|| AppError::InvalidForm("music_on is required".into()))?;
        form.choices.sfx_on = sfx_on.ok_or_else(|| AppError::InvalidForm("sfx_on is required".into()))?;

        Ok(form)
    }
}

fn parse_vol(field: &str, value: &str) -> Result<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::InvalidForm(format!("{field}: '{value}' is not a number")))
}

pub async fn audio_settings(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Result<Html<String>> {
    let dir = state.config.sounds_path.clone();
    let sounds = tokio::task::spawn_blocking(move || scan_sounds(&dir)).await??;

    let mut tx = state.pool.begin().await?;
    let available = db::update_track_state(&mut tx, &sounds).await?;
    tx.commit().await?;

    let (songs, sound_effects): (Vec<Sound>, Vec<Sound>) =
        available.into_iter().partition(|sound| sound.kind == SoundKind::Song);

    Ok(Html(views::audio_settings(&songs, &sound_effects)))
}

pub async fn save_settings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = SettingsForm::from_pairs(pairs)?;

    let mut tx = state.pool.begin().await?;
    playlist::save_audio_settings(
        &mut tx,
        user_id,
        &form.music_choices,
        form.sfx_choice.as_deref(),
        &form.choices,
    )
    .await?;
    tx.commit().await?;

    Ok(redirect_home())
}

pub async fn start_audio(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<AudioStart>> {
    let mut conn = state.pool.acquire().await?;
    let settings = playlist::get_audio_settings(&mut conn, user_id).await?;

    Ok(Json(AudioStart::from(settings)))
}
