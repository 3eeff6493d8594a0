//! # Lotus Common Library
//!
//! Shared code for the Lotus site services:
//! - Data models for contact, subscriber and meditation records
//! - Storage trait and its SQLite implementation
//! - Configuration loading
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
