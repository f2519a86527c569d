//! Terminal client for the Stay Hungry Gym management API.
//!
//! The session lives in local storage and gates which screens (commands) a
//! user may open; a usage tracker follows the session in the background.

pub mod api;
pub mod commands;
pub mod config;
pub mod context;
pub mod export;
pub mod models;
pub mod router;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod ui;
pub mod validation;
