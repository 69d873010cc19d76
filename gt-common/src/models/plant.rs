//! Plant catalogue records

use serde::{Deserialize, Serialize};

/// A catalogued plant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: i64,
    /// Set at creation, never updated
    pub name: String,
    pub bio: String,
}

impl Plant {
    pub fn new(id: i64, name: String, bio: String) -> Self {
        Self { id, name, bio }
    }

    pub fn set_bio(&mut self, bio: String) {
        self.bio = bio;
    }
}

/// Plant fields supplied at creation (id assigned by storage)
#[derive(Debug, Clone)]
pub struct NewPlant {
    pub name: String,
    pub bio: String,
}
