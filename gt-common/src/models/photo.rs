//! User-submitted plant photos and their votes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A photo of a plant with its up/down vote sets
///
/// A user id appears in at most one of the two vote sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub plant_id: i64,
    /// Uploader
    pub user_id: i64,
    pub image: String,
    pub upload_date: DateTime<Utc>,
    pub upvote_ids: Vec<i64>,
    pub downvote_ids: Vec<i64>,
}

impl Photo {
    /// Upvotes minus downvotes
    pub fn rating(&self) -> i64 {
        self.upvote_ids.len() as i64 - self.downvote_ids.len() as i64
    }

}

/// Photo fields supplied at upload (id and date assigned by storage)
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub plant_id: i64,
    pub user_id: i64,
    pub image: String,
}

/// A vote cast on a photo
///
/// Wire values: `1` upvote, `-1` downvote, `0` withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
    Clear,
}

impl Vote {
    /// Stored direction, `None` when the vote is withdrawn
    pub fn direction(&self) -> Option<i64> {
        match self {
            Vote::Up => Some(1),
            Vote::Down => Some(-1),
            Vote::Clear => None,
        }
    }
}

impl TryFrom<i64> for Vote {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Vote::Up),
            -1 => Ok(Vote::Down),
            0 => Ok(Vote::Clear),
            _ => Err(Error::InvalidInput("Parameter 'vote' is invalid.".to_string())),
        }
    }
}
