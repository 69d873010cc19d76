//! User and admin accounts
//!
//! Admins are not a separate record type: an account carries a [`Role`] tag
//! and authorization inspects the tag. Promotion changes the tag in place, so
//! ban history is carried over untouched.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::ban::Ban;
use crate::{Error, Result};

/// Account privilege level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(Error::Internal(format!("Unknown account role: {}", other))),
        }
    }
}

/// A user account with its accumulated bans
///
/// Serializes as `{ "id": .., "admin": bool, "bans": [..] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    #[serde(rename = "admin", serialize_with = "serialize_admin_flag")]
    pub role: Role,
    pub bans: Vec<Ban>,
}

fn serialize_admin_flag<S: Serializer>(role: &Role, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_bool(*role == Role::Admin)
}

impl Account {
    /// New regular account with no bans
    pub fn new_user(id: i64) -> Self {
        Self {
            id,
            role: Role::User,
            bans: Vec::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Same account with admin privilege, bans preserved
    pub fn promote(self) -> Self {
        Self {
            role: Role::Admin,
            ..self
        }
    }

    /// First ban still in force at `now`, if any
    pub fn active_ban(&self, now: DateTime<Utc>) -> Option<&Ban> {
        self.bans.iter().find(|ban| ban.is_active_at(now))
    }
}
