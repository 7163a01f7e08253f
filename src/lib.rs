//! Kollektiv
//!
//! Household coordination: a shared calendar, inventory sliders with
//! debounced saves, a chore leaderboard and photo proofs.
//!
//! Layered architecture:
//! - domain: Core entities, normalization and seed data
//! - repository: Backend gateway trait and implementations
//! - store / scheduler / alert: In-memory state, debounced saves, notifications
//! - commands: Handlers invoked by the UI or the CLI
//! - views: Pure projections of state for display

pub mod alert;
pub mod app;
pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;
pub mod scheduler;
pub mod store;
pub mod views;

pub use app::{connect, App};
pub use config::AppConfig;
pub use domain::{DomainError, DomainResult};
