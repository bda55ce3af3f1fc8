//! Multi-tenant project and task tracker.
//!
//! Projects are visible to their owner and members only; tasks inherit the
//! visibility of their project. Anything a caller may not see is reported
//! as not found.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod policy;
pub mod services;
pub mod state;
