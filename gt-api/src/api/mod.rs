//! HTTP API handlers for gt-api
//!
//! Every route is a `POST` with a JSON body, except `GET /health`. Handlers
//! parse the body into a raw request with optional fields, validate it into an
//! immutable request value, run the admin/ban checks, call the [`Store`] and
//! shape the response.
//!
//! [`Store`]: crate::db::Store

mod auth;
mod extract;
mod validation;

pub mod health;
pub mod ml;
pub mod photo_reports;
pub mod photos;
pub mod plants;
pub mod users;

pub use extract::ApiJson;
pub use health::health_routes;
pub use ml::ml_routes;
pub use photo_reports::photo_report_routes;
pub use photos::photo_routes;
pub use plants::plant_routes;
pub use users::user_routes;
