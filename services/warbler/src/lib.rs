//! Warbler, a small social feed
//!
//! Users sign up, post short messages, follow each other and like messages.
//! Pages are server-rendered HTML backed by PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
pub mod views;

pub use state::AppState;
