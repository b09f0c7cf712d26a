#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct SettingsModel {
    pub music_on: bool,
    pub music_vol: Option<i64>,
    pub sfx_on: bool,
    pub sfx_vol: Option<i64>,
}
