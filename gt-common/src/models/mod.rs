//! Domain records
//!
//! Every record serializes to the camelCase JSON projection returned by the
//! HTTP API. Nested records (bans inside accounts) serialize as their own
//! projections; vote sets serialize as plain id arrays.

pub mod account;
pub mod ban;
pub mod photo;
pub mod photo_report;
pub mod plant;

pub use account::{Account, Role};
pub use ban::Ban;
pub use photo::{NewPhoto, Photo, Vote};
pub use photo_report::{NewPhotoReport, PhotoReport, ReportAction};
pub use plant::{NewPlant, Plant};
