//! Moderation bans

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ban issued by an admin against a user
///
/// Bans are immutable once created. `expiration_date = None` is a permanent ban.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ban {
    pub id: i64,
    /// Banned account
    pub user_id: i64,
    /// Admin who issued the ban
    pub admin_id: i64,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl Ban {
    pub fn new(
        id: i64,
        user_id: i64,
        admin_id: i64,
        expiration_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            admin_id,
            expiration_date,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.expiration_date.is_none()
    }

    /// Whether the ban still restricts the user at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiration_date {
            None => true,
            Some(expires) => expires > now,
        }
    }
}
