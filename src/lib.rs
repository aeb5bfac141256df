//! Recipe search bot: TheMealDB lookups, a per-chat view-state controller and
//! favorites persisted in SQLite.

pub mod action;
pub mod api;
pub mod bot;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod favorites;
pub mod flow;
pub mod recipe;
pub mod render;
pub mod session;
