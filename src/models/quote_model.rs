#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct QuoteModel {
    pub id: i64,
    pub text: String,
    pub author: Option<String>,
}
