pub mod catch;
pub mod common;
pub mod event;
pub mod participation;
pub mod ratings;
pub mod results;
pub mod team;
pub mod user;
