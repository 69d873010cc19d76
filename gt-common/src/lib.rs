//! # GreenThumb Common Library
//!
//! Shared code for the GreenThumb services:
//! - Domain records (accounts, bans, photos, photo reports, plants)
//! - Database initialization and schema
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
