//! JSON fixtures describing users, teams and events to preload.

pub mod loader;
pub mod models;
pub mod validator;

pub const FORMAT_VERSION: &str = "1.0.0";
