pub mod admin;
pub mod events;
pub mod participation;
pub mod ratings;
pub mod results;
pub mod teams;
pub mod users;
