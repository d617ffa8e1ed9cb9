//! PostgreSQL persistence for skill and habit plans.
//!
//! Stores generated plans, per-day completion events, and the statistics
//! derived from them. Migrations are embedded and applied with
//! [`pool::run_migrations`].

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
