//! User reports against photos and their moderation outcome
//!
//! Lifecycle: `Unhandled --handle(action)--> Handled`. Storage handles a
//! report at most once; a handled report is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Admin disposition of a report
///
/// Wire values: `0` dismiss, `1` remove the photo, `2` remove the photo and
/// ban its uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ReportAction {
    Dismiss,
    RemovePhoto,
    RemovePhotoAndBan,
}

impl ReportAction {
    pub fn removes_photo(&self) -> bool {
        matches!(self, ReportAction::RemovePhoto | ReportAction::RemovePhotoAndBan)
    }

    pub fn bans_uploader(&self) -> bool {
        matches!(self, ReportAction::RemovePhotoAndBan)
    }
}

impl TryFrom<i64> for ReportAction {
    type Error = Error;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ReportAction::Dismiss),
            1 => Ok(ReportAction::RemovePhoto),
            2 => Ok(ReportAction::RemovePhotoAndBan),
            _ => Err(Error::InvalidInput(
                "Parameter 'adminAction' is invalid.".to_string(),
            )),
        }
    }
}

impl From<ReportAction> for i64 {
    fn from(action: ReportAction) -> Self {
        match action {
            ReportAction::Dismiss => 0,
            ReportAction::RemovePhoto => 1,
            ReportAction::RemovePhotoAndBan => 2,
        }
    }
}

/// A user's flag on a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoReport {
    pub id: i64,
    pub photo_id: i64,
    /// Reporter
    pub user_id: i64,
    pub report_text: String,
    pub report_date: DateTime<Utc>,
    pub admin_action: Option<ReportAction>,
    pub admin_id: Option<i64>,
    pub handle_date: Option<DateTime<Utc>>,
}

impl PhotoReport {
    pub fn is_handled(&self) -> bool {
        self.admin_action.is_some()
    }

}

/// Report fields supplied by the reporter (id and date assigned by storage)
#[derive(Debug, Clone)]
pub struct NewPhotoReport {
    pub photo_id: i64,
    pub user_id: i64,
    pub report_text: String,
}
