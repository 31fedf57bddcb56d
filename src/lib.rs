pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod guard;
pub mod review;
pub mod ui;
