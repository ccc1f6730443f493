//! Cycle tracking backend: a pure cycle-phase calculator plus an axum API
//! for profiles, symptom and mood logs, calendars and recommendations.

pub mod calendar;
pub mod config;
pub mod cycle;
pub mod error;
pub mod insights;
pub mod models;
pub mod recommendation;
pub mod routes;
pub mod stats;
pub mod store;

pub use routes::{app, AppState};
