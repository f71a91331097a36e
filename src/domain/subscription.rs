use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Subscription {
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
