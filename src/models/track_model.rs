#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TrackModel {
    pub id: String, // into Uuid
    pub title: String,
    pub kind: String, // into SoundKind
}
