//! Sales Visits server
//!
//! REST JSON backend for the commercial visits dashboard: salespeople log
//! client visits, calls and WhatsApp contacts; admins see every visit,
//! salespeople only their own.

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
