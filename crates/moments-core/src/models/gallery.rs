use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Gallery entity: the parent grouping for an event's uploaded media.
///
/// `total_assets` is a best-effort counter cache; it may drift from the true
/// row count when an increment fails after records were created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Gallery {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub expiry_at: Option<DateTime<Utc>>,
    pub total_assets: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gallery {
    /// Whether the gallery's expiry timestamp is in the past.
    pub fn is_expired(&self) -> bool {
        self.expiry_at.is_some_and(|t| t < Utc::now())
    }
}

/// Fields for creating a gallery.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewGallery {
    pub name: String,
    pub description: Option<String>,
    pub expiry_at: Option<DateTime<Utc>>,
}
