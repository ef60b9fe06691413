//! Bookmark Library & Bookstore Management System
//!
//! A Rust REST JSON API server managing a book catalog, role-gated user
//! accounts, the loan lifecycle (reserve, issue, return with fines) and a
//! peer-to-peer book marketplace.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
